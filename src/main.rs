use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use codegraph::indexing::DefinitionQuery;
use codegraph::{CodeGraphIndexer, Settings};

#[derive(Parser)]
#[command(name = "codegraph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Cross-file code graph indexing and definition queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default settings file
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },

    /// Index a workspace directory
    Index {
        /// Workspace root
        path: PathBuf,
    },

    /// Query definitions reachable from a line range
    Query {
        /// Workspace root
        workspace: PathBuf,

        /// Source file inside the workspace
        #[arg(long)]
        file: PathBuf,

        /// First line, 1-based inclusive
        #[arg(long)]
        start_line: u32,

        /// Last line, 1-based inclusive (defaults to start_line)
        #[arg(long)]
        end_line: Option<u32>,
    },

    /// Show indexing summary for a workspace
    Summary {
        /// Workspace root
        path: PathBuf,
    },

    /// Remove all persisted indexes of a workspace
    Remove {
        /// Workspace root
        path: PathBuf,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Arc::new(Settings::load().context("failed to load settings")?);
    codegraph::logging::init_with_config(&settings.logging);

    match cli.command {
        Commands::Init { force } => {
            let cwd = std::env::current_dir()?;
            let path = Settings::init_file(&cwd, force)?;
            println!("wrote {}", path.display());
        }
        Commands::Index { path } => {
            let indexer = CodeGraphIndexer::open(settings)?;
            let metrics = indexer.index_workspace(&path)?;
            println!(
                "indexed {} files ({} failed) in {} ms",
                metrics.total_files, metrics.total_failed_files, metrics.duration_ms
            );
        }
        Commands::Query {
            workspace,
            file,
            start_line,
            end_line,
        } => {
            let indexer = CodeGraphIndexer::open(settings)?;
            let definitions = indexer.query_definitions(&DefinitionQuery {
                workspace,
                file_path: file,
                start_line,
                end_line: end_line.unwrap_or(start_line),
            })?;
            if definitions.is_empty() {
                println!("no definitions found");
            }
            for d in definitions {
                println!(
                    "{}  {}:{}  ({})",
                    d.name,
                    d.path,
                    d.range.start_row + 1,
                    d.kind
                );
            }
        }
        Commands::Summary { path } => {
            let indexer = CodeGraphIndexer::open(settings)?;
            match indexer.get_summary(&path)? {
                Some(summary) => {
                    println!(
                        "files: {} (failed: {})",
                        summary.total_files, summary.total_failed_files
                    );
                    match summary.last_indexed_at_rfc3339 {
                        Some(at) => println!("last indexed: {at}"),
                        None => println!("never indexed"),
                    }
                }
                None => println!("workspace is not registered"),
            }
        }
        Commands::Remove { path } => {
            let indexer = CodeGraphIndexer::open(settings)?;
            indexer.remove_all_indexes(&path)?;
            println!("removed all indexes for {}", path.display());
        }
        Commands::Config => {
            println!("{}", render_settings(&settings)?);
        }
    }
    Ok(())
}

fn render_settings(settings: &Settings) -> Result<String> {
    serde_json::to_string_pretty(settings).context("failed to render settings")
}
