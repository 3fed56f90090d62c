pub mod energy;
pub mod forces;
pub mod models;
pub mod optimize;

use crate::cli::CalculationArgs;
use crate::data::ModelStore;
use crate::error::{CliError, Result};
use aimnet2rs::ModelRegistry;
use tracing::info;

/// Reads the input structure text and builds a registry over the model store.
pub(crate) fn load_inputs(
    args: &CalculationArgs,
    store: &ModelStore,
) -> Result<(String, ModelRegistry)> {
    info!("Loading input structure from {:?}", &args.input);
    let structure = std::fs::read_to_string(&args.input).map_err(|e| CliError::FileParsing {
        path: args.input.clone(),
        source: e.into(),
    })?;
    let registry = ModelRegistry::new(store.models_dir());
    Ok((structure, registry))
}
