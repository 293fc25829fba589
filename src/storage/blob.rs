//!  Blob access.
//!
//! Blobs are the raw bytes of one file at one point in history. Consumers
//! of this crate want text for a diff view; invalid UTF-8 decodes to
//! replacement characters rather than an error.

use git2::{ObjectType, Oid, Repository};

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::BlobId;

/// read a blob's content from the repository
///
/// a missing blob is store corruption, reported as `MissingObject`
pub fn read_blob(repo: &Repository, blob_id: BlobId) -> StorageResult<Vec<u8>> {
    let blob = repo
        .find_blob(blob_id.raw())
        .map_err(|e| StorageError::lookup("blob", blob_id, e))?;
    Ok(blob.content().to_vec())
}

/// decode blob bytes as UTF-8, replacing invalid sequences
pub fn decode_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// compute the blob id git would assign to `bytes`, without writing it
pub fn hash_bytes(bytes: &[u8]) -> StorageResult<BlobId> {
    let oid = Oid::hash_object(ObjectType::Blob, bytes)?;
    Ok(BlobId::new(oid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::init_repo;

    #[test]
    fn test_read_blob_roundtrip() {
        let (_dir, repo) = init_repo();
        let oid = repo.blob(b"hello\nworld\n").unwrap();

        let bytes = read_blob(&repo, BlobId::new(oid)).unwrap();
        assert_eq!(bytes, b"hello\nworld\n");
    }

    #[test]
    fn test_missing_blob_is_corruption() {
        let (_dir, repo) = init_repo();
        let absent = hash_bytes(b"never written").unwrap();

        let result = read_blob(&repo, absent);
        assert!(matches!(result, Err(StorageError::MissingObject { kind: "blob", .. })));
    }

    #[test]
    fn test_hash_matches_stored_blob() {
        let (_dir, repo) = init_repo();
        let oid = repo.blob(b"content").unwrap();
        assert_eq!(hash_bytes(b"content").unwrap(), BlobId::new(oid));
    }

    #[test]
    fn test_decode_text_lossy() {
        assert_eq!(decode_text(b"plain"), "plain");
        assert_eq!(decode_text(b""), "");
        assert_eq!(decode_text(&[b'a', 0xff, b'b']), "a\u{fffd}b");
    }
}
