use clap::Parser;
use supportrag::cli::handle_ask;
use supportrag::cli::handle_config_command;
use supportrag::cli::handle_health_command;
use supportrag::cli::handle_ingest;
use supportrag::cli::handle_serve;
use supportrag::cli::print_error;
use supportrag::cli::Cli;
use supportrag::cli::Commands;
use supportrag::config::AppConfig;
use supportrag::Result;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path),
        None => AppConfig::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            supportrag::logging::init_simple_logging()?;
            print_error(&format!("Failed to load configuration: {e}"));
            return Err(e);
        }
    };

    // Initialize logging
    supportrag::logging::init_logging_with_config(Some(&config), cli.verbose)?;
    info!("Configuration loaded successfully");

    // Execute the requested command
    match cli.command {
        Commands::Serve { host, port, cors } => handle_serve(&config, host, port, cors).await,
        Commands::Ask {
            question,
            max_results,
            json,
        } => handle_ask(&config, &question, max_results, json).await,
        Commands::Ingest {
            file,
            mode,
            batch_size,
        } => handle_ingest(&config, &file, mode.into(), batch_size).await,
        Commands::Health => handle_health_command(&config).await,
        Commands::Config => {
            handle_config_command(&config);
            Ok(())
        }
    }
}
