use super::error::ModelError;
use super::validation::SupportDomain;
use crate::core::potential::loader::{FormatLoader, ModelLoader};
use crate::core::potential::model::ModelHandle;
use phf::{Map, phf_map};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, info, instrument};

/// Short model names and the artifact file each one refers to.
static MODEL_ALIASES: Map<&'static str, &'static str> = phf_map! {
    "b973c" => "aimnet2_b973c_ens.jpt",
    "wb97m-d3" => "aimnet2_wb97m-d3_ens.jpt",
};

pub const DEFAULT_MODEL: &str = "b973c";

/// One row of [`ModelRegistry::available_models`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub alias: &'static str,
    pub file_name: &'static str,
    pub path: PathBuf,
    pub installed: bool,
}

/// Resolves model identifiers to loaded potentials and caches them by path.
///
/// Construct one per process (or per test) and pass it by reference; the
/// registry owns every handle it hands out for its whole lifetime.
pub struct ModelRegistry {
    models_dir: PathBuf,
    loader: Box<dyn ModelLoader>,
    cache: RwLock<HashMap<PathBuf, ModelHandle>>,
    load_lock: Mutex<()>,
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("models_dir", &self.models_dir)
            .field("cached", &self.cached_count())
            .finish()
    }
}

fn known_aliases() -> Vec<String> {
    let mut aliases: Vec<String> = MODEL_ALIASES.keys().map(|k| k.to_string()).collect();
    aliases.sort();
    aliases
}

fn is_canonical_name(name: &str) -> bool {
    MODEL_ALIASES.values().any(|file| *file == name)
}

/// A bare name has neither a path separator nor an extension.
fn is_bare_name(identifier: &str) -> bool {
    let path = Path::new(identifier);
    path.components().count() == 1 && path.extension().is_none()
}

impl ModelRegistry {
    /// A registry that loads by file extension, declaring the AIMNet2
    /// elements for TorchScript modules.
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self::with_loader(
            models_dir,
            Box::new(FormatLoader::new(SupportDomain::aimnet2().elements())),
        )
    }

    pub fn with_loader(models_dir: impl Into<PathBuf>, loader: Box<dyn ModelLoader>) -> Self {
        Self {
            models_dir: models_dir.into(),
            loader,
            cache: RwLock::new(HashMap::new()),
            load_lock: Mutex::new(()),
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    pub fn cached_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Lists the known aliases together with where their artifacts are
    /// expected and whether they are present.
    pub fn available_models(&self) -> Vec<ModelEntry> {
        let mut entries: Vec<ModelEntry> = MODEL_ALIASES
            .entries()
            .map(|(&alias, &file_name)| {
                let path = self.models_dir.join(file_name);
                ModelEntry {
                    alias,
                    file_name,
                    installed: path.is_file(),
                    path,
                }
            })
            .collect();
        entries.sort_by_key(|e| e.alias);
        entries
    }

    /// Maps an identifier to the file it names, without touching the cache.
    fn locate(&self, identifier: &str) -> Result<PathBuf, ModelError> {
        let candidate = if let Some(file_name) = MODEL_ALIASES.get(identifier) {
            self.models_dir.join(file_name)
        } else if is_canonical_name(identifier) {
            self.models_dir.join(identifier)
        } else {
            let path = PathBuf::from(identifier);
            if !path.exists() && is_bare_name(identifier) {
                return Err(ModelError::AliasNotFound {
                    name: identifier.to_string(),
                    known: known_aliases(),
                });
            }
            path
        };

        if !candidate.is_file() {
            return Err(ModelError::ModelNotFound { path: candidate });
        }
        candidate
            .canonicalize()
            .map_err(|_| ModelError::ModelNotFound { path: candidate })
    }

    /// Resolves an alias, canonical artifact name, or filesystem path to a
    /// loaded model.
    ///
    /// Each distinct canonical path is loaded at most once; later calls return
    /// the same handle. Failed loads are not cached.
    ///
    /// # Errors
    ///
    /// - [`ModelError::AliasNotFound`] for an unknown bare name
    /// - [`ModelError::ModelNotFound`] if the file does not exist
    /// - [`ModelError::ModelLoadError`] if the artifact cannot be loaded
    #[instrument(skip(self), name = "resolve_model")]
    pub fn resolve(&self, identifier: &str) -> Result<ModelHandle, ModelError> {
        let path = self.locate(identifier)?;

        if let Some(handle) = self.cached(&path) {
            debug!(path = %path.display(), "Model cache hit.");
            return Ok(handle);
        }

        let _guard = self.load_lock.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = self.cached(&path) {
            return Ok(handle);
        }

        let handle = self
            .loader
            .load(&path)
            .map_err(|e| ModelError::ModelLoadError {
                path: path.clone(),
                reason: e.to_string(),
            })?;
        info!(path = %path.display(), model = handle.name(), "Model loaded and cached.");
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path, Arc::clone(&handle));
        Ok(handle)
    }

    fn cached(&self, path: &Path) -> Option<ModelHandle> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .cloned()
    }
}
