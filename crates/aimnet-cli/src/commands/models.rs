use crate::cli::{ModelsArgs, ModelsCommands};
use crate::data::ModelStore;
use crate::error::{CliError, Result};
use aimnet2rs::ModelRegistry;
use aimnet2rs::engine::registry::DEFAULT_MODEL;
use std::path::PathBuf;
use tracing::info;

pub async fn run(args: ModelsArgs, models_dir_override: Option<PathBuf>) -> Result<()> {
    match args.command {
        ModelsCommands::List => handle_list(models_dir_override),
        ModelsCommands::Path => handle_path(models_dir_override),
        ModelsCommands::SetPath { path } => handle_set_path(path),
        ModelsCommands::ResetPath => handle_reset_path(),
    }
}

fn handle_list(models_dir_override: Option<PathBuf>) -> Result<()> {
    let store = ModelStore::new(models_dir_override)?;
    let registry = ModelRegistry::new(store.models_dir());

    println!("Models directory: {}", store.models_dir().display());
    for entry in registry.available_models() {
        let marker = if entry.installed { "✓" } else { "✗" };
        let default = if entry.alias == DEFAULT_MODEL {
            " (default)"
        } else {
            ""
        };
        println!(
            "  {} {:<10} {}{}",
            marker, entry.alias, entry.file_name, default
        );
    }
    Ok(())
}

fn handle_path(models_dir_override: Option<PathBuf>) -> Result<()> {
    let store = ModelStore::new(models_dir_override)?;
    let path = store.models_dir();
    println!("{}", path.display());
    if !path.exists() {
        println!("(Note: This directory does not exist yet.)");
    }
    Ok(())
}

fn handle_set_path(path: PathBuf) -> Result<()> {
    if !path.is_absolute() {
        return Err(CliError::Argument(format!(
            "Model path must be absolute: {}",
            path.display()
        )));
    }
    info!("Setting custom model path to {:?}", &path);
    ModelStore::set_custom_path(&path)?;
    println!("✓ Model path set to: {}", path.display());
    Ok(())
}

fn handle_reset_path() -> Result<()> {
    ModelStore::reset_path()?;
    println!("✓ Model path reset to the default location.");
    Ok(())
}
