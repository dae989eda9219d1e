//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

use crate::ingest::IngestMode;
use crate::ingest::DEFAULT_BATCH_SIZE;

#[derive(Parser)]
#[command(name = "supportrag")]
#[command(about = "Documentation support assistant: HTTP service, one-shot questions and corpus ingestion")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file (default: config.toml, then config.example.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (default: from config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind to (default: from config or $PORT)
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable CORS even if disabled in config
        #[arg(long)]
        cors: bool,
    },
    /// Ask a single question and print the answer
    Ask {
        /// The question
        question: String,
        /// Number of documentation snippets to retrieve
        #[arg(short = 'n', long)]
        max_results: Option<usize>,
        /// Print the HTTP response body instead of formatted text
        #[arg(long)]
        json: bool,
    },
    /// Load documentation chunks into the vector store
    Ingest {
        /// JSON file with an array of content chunks
        file: PathBuf,
        /// Replace the collection or write into it
        #[arg(short, long, value_enum, default_value = "rebuild")]
        mode: ModeArg,
        /// Chunks embedded and written per request
        #[arg(short, long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: usize,
    },
    /// Show vector index availability and document count
    Health,
    /// Show current configuration
    Config,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    /// Delete and recreate the collection
    Rebuild,
    /// Insert or replace by id in the existing collection
    Upsert,
}

impl From<ModeArg> for IngestMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Rebuild => Self::Rebuild,
            ModeArg::Upsert => Self::Upsert,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_ask() {
        let cli = Cli::parse_from(["supportrag", "ask", "How do I mint?", "-n", "3", "--json"]);
        match cli.command {
            Commands::Ask {
                question,
                max_results,
                json,
            } => {
                assert_eq!(question, "How do I mint?");
                assert_eq!(max_results, Some(3));
                assert!(json);
            }
            _ => panic!("expected ask"),
        }
    }

    #[test]
    fn test_parse_ingest_defaults() {
        let cli = Cli::parse_from(["supportrag", "--verbose", "ingest", "chunks.json"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Ingest {
                mode, batch_size, ..
            } => {
                assert_eq!(IngestMode::from(mode), IngestMode::Rebuild);
                assert_eq!(batch_size, 50);
            }
            _ => panic!("expected ingest"),
        }
    }
}
