mod cli;
mod commands;
mod config;
mod data;
mod error;
mod logging;
mod utils;

use crate::cli::{Cli, Commands};
use crate::data::ModelStore;
use crate::error::{CliError, Result};
use clap::Parser;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run_app().await {
        eprintln!("\n❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_app() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose, cli.quiet, cli.log_file.clone())?;

    let (panic_hook, eyre_hook) = color_eyre::config::HookBuilder::default().into_hooks();
    eyre_hook.install().map_err(|e| CliError::Other(e.into()))?;
    std::panic::set_hook(Box::new(move |pi| {
        error!("{}", panic_hook.panic_report(pi));
    }));

    info!("aimnet CLI v{} starting up.", env!("CARGO_PKG_VERSION"));
    debug!("Full CLI arguments parsed: {:?}", &cli);

    if let Some(num_threads) = cli.threads {
        info!(
            "Setting Rayon global thread pool to {} threads.",
            num_threads
        );
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .map_err(|e| {
                CliError::Other(anyhow::anyhow!("Failed to build global thread pool: {}", e))
            })?;
    }

    let show_progress = !cli.quiet;
    let result = match cli.command {
        Commands::Energy(args) => {
            info!("Dispatching to 'energy' command.");
            let store = ModelStore::new(cli.models_dir)?;
            commands::energy::run(args, &store).await
        }
        Commands::Forces(args) => {
            info!("Dispatching to 'forces' command.");
            let store = ModelStore::new(cli.models_dir)?;
            commands::forces::run(args, &store).await
        }
        Commands::Optimize(args) => {
            info!("Dispatching to 'optimize' command.");
            let store = ModelStore::new(cli.models_dir)?;
            commands::optimize::run(args, &store, show_progress).await
        }
        Commands::Models(args) => {
            info!("Dispatching to 'models' command.");
            commands::models::run(args, cli.models_dir).await
        }
    };

    match &result {
        Ok(_) => info!("Command completed successfully."),
        Err(e) => error!("Command failed: {}", e),
    }
    result
}
