//! gitscope - command-line front end.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use gitscope::access::{AccessPolicy, Gateway, Role};
use gitscope::inspect::{FileVersions, HistoryEntry, Inspector, InspectorConfig, DEFAULT_CONTEXT_RADIUS};

#[derive(Parser)]
#[command(name = "gitscope")]
#[command(about = "Inspect file history in a git repository", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository working directory
    #[arg(short = 'C', long, default_value = ".")]
    repo: PathBuf,
    /// Role the request is made as
    #[arg(long, default_value = "anonymous")]
    role: Role,
    /// Lines of context around each change
    #[arg(long, default_value_t = DEFAULT_CONTEXT_RADIUS)]
    context: usize,
    /// Leave untracked files out of the working state
    #[arg(long)]
    no_untracked: bool,
    /// Follow only first parents in history
    #[arg(long)]
    first_parent: bool,
    /// Print results as JSON
    #[arg(long)]
    json: bool,
    /// Log debug output to stderr
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a file as it was at a version
    Show {
        /// Revision, or "unstaged" for the working state
        token: String,
        path: String,
    },
    /// Print the changed region of a file next to its previous version
    Versions { token: String, path: String },
    /// List files changed by a version
    Changed {
        #[arg(default_value = "unstaged")]
        token: String,
        /// Prefix each path with A, D or M
        #[arg(short, long)]
        status: bool,
    },
    /// List the working state and the commits reachable from HEAD
    Log {
        /// Show at most this many entries
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Replace a working file with the contents of stdin
    Write { path: String },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "gitscope=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("GITSCOPE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = InspectorConfig::new(&cli.repo)
        .context_radius(cli.context)
        .include_untracked(!cli.no_untracked)
        .first_parent_history(cli.first_parent);
    let gateway = Gateway::new(Inspector::open_with_config(config)?, AccessPolicy::default());
    let role = cli.role;

    match cli.command {
        Commands::Show { token, path } => {
            let content = gateway.get_file_content(role, &token, &path)?;
            if cli.json {
                print_json(&content)?;
            } else {
                print!("{}", content);
            }
        }
        Commands::Versions { token, path } => {
            let versions = gateway.get_file_versions(role, &token, &path)?;
            if cli.json {
                print_json(&versions)?;
            } else {
                print_versions(&versions);
            }
        }
        Commands::Changed { token, status } => {
            if status {
                let changes = gateway.get_changes(role, &token)?;
                if cli.json {
                    print_json(&changes)?;
                } else {
                    for change in &changes {
                        println!("{} {}", change.status, change.path);
                    }
                }
            } else {
                let paths = gateway.get_changed_files(role, &token)?;
                if cli.json {
                    print_json(&paths)?;
                } else {
                    for path in &paths {
                        println!("{}", path);
                    }
                }
            }
        }
        Commands::Log { limit } => {
            let mut entries = gateway.list_history(role)?;
            if let Some(limit) = limit {
                entries.truncate(limit);
            }
            if cli.json {
                print_json(&entries)?;
            } else {
                for entry in &entries {
                    print_entry(entry);
                }
            }
        }
        Commands::Write { path } => {
            let mut content = String::new();
            std::io::stdin().read_to_string(&mut content)?;
            gateway.write_working_file(role, &path, &content)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_versions(versions: &FileVersions) {
    println!("--- original");
    for line in versions.original.lines() {
        println!("-{}", line);
    }
    println!("+++ modified");
    for line in versions.modified.lines() {
        println!("+{}", line);
    }
}

fn print_entry(entry: &HistoryEntry) {
    let short: String = entry.token.chars().take(10).collect();
    let files = match &entry.files {
        Some(files) => format!("  ({} files)", files.len()),
        None => String::new(),
    };
    println!(
        "{:<10}  {}  {}{}",
        short,
        entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
        entry.label,
        files
    );
}
