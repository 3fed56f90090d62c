use crate::error::{CliError, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "aimnet";
const APPLICATION: &str = "aimnet2rs";

/// Locates the directory that model artifacts are resolved against.
///
/// Precedence: explicit override (`--models-dir`), then the path stored in
/// `path.conf` by `models set-path`, then the OS-specific data directory.
#[derive(Debug)]
pub struct ModelStore {
    base_path: PathBuf,
}

impl ModelStore {
    pub fn new(override_path: Option<PathBuf>) -> Result<Self> {
        let path = match override_path {
            Some(path) => path,
            None => Self::determine_models_path()?,
        };
        debug!("ModelStore initialized with path: {:?}", &path);
        Ok(Self { base_path: path })
    }

    pub fn models_dir(&self) -> &Path {
        &self.base_path
    }

    pub fn set_custom_path(path: &Path) -> Result<()> {
        let path_str = path.to_str().ok_or_else(|| {
            CliError::Argument(format!("Model path is not valid UTF-8: {:?}", path))
        })?;
        let config_path = Self::path_config_file()?;
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(config_path, path_str).map_err(CliError::from)
    }

    pub fn reset_path() -> Result<()> {
        if let Ok(config_path) = Self::path_config_file() {
            if config_path.exists() {
                fs::remove_file(config_path)?;
            }
        }
        Ok(())
    }

    fn determine_models_path() -> Result<PathBuf> {
        match Self::path_config_file() {
            Ok(config_path) if config_path.exists() => {
                match Self::read_path_config(&config_path)? {
                    Some(path) => Ok(path),
                    None => {
                        warn!("Custom path config file is empty, falling back to default path.");
                        Self::default_models_path()
                    }
                }
            }
            _ => Self::default_models_path(),
        }
    }

    fn read_path_config(config_path: &Path) -> Result<Option<PathBuf>> {
        let content = fs::read_to_string(config_path)?;
        let trimmed = content.trim();
        Ok((!trimmed.is_empty()).then(|| PathBuf::from(trimmed)))
    }

    fn path_config_file() -> Result<PathBuf> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.config_dir().join("path.conf"))
            .ok_or_else(|| {
                CliError::Models("Could not determine config directory path.".to_string())
            })
    }

    fn default_models_path() -> Result<PathBuf> {
        ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .map(|dirs| dirs.data_dir().join("models"))
            .ok_or_else(|| {
                CliError::Models("Could not determine default data directory path.".to_string())
            })
    }
}
