use super::load_inputs;
use crate::cli::OptimizeArgs;
use crate::config::PartialOptimizeConfig;
use crate::data::ModelStore;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use aimnet2rs::engine::optimizer::OptimizerStatus;
use aimnet2rs::engine::progress::ProgressReporter;
use aimnet2rs::workflows::relax;
use tracing::{info, warn};

pub async fn run(args: OptimizeArgs, store: &ModelStore, show_progress: bool) -> Result<()> {
    let partial_config = match &args.config {
        Some(path) => PartialOptimizeConfig::from_file(path)?,
        None => PartialOptimizeConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    let calc = &args.calculation;
    let (structure, registry) = load_inputs(calc, store)?;

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!("Starting geometry optimization...");
    let optimized = tokio::task::block_in_place(|| {
        relax::optimize_geometry(
            &registry,
            &structure,
            calc.charge,
            &calc.model,
            &config,
            &reporter,
        )
    })?;

    let outcome = &optimized.outcome;
    match outcome.status {
        OptimizerStatus::Converged => println!(
            "✓ Converged in {} step(s): E = {:.8} eV, fmax = {:.5} eV/Å",
            outcome.steps,
            outcome.energy,
            outcome.fmax()
        ),
        _ => {
            warn!(
                "Optimizer stopped after {} steps without converging.",
                outcome.steps
            );
            println!(
                "Warning: not converged after {} step(s): E = {:.8} eV, fmax = {:.5} eV/Å",
                outcome.steps,
                outcome.energy,
                outcome.fmax()
            );
        }
    }

    std::fs::write(&args.output, &optimized.xyz).map_err(|e| CliError::FileParsing {
        path: args.output.clone(),
        source: e.into(),
    })?;
    println!("Relaxed structure written to: {}", args.output.display());
    Ok(())
}
