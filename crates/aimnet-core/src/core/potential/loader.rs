use super::artifact::{ArtifactError, ModelArtifact};
use super::model::ModelHandle;
use crate::core::models::element::Element;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Turns a model artifact on disk into an evaluable potential.
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<ModelHandle, ArtifactError>;
}

/// Loads TOML network ensembles (see [`ModelArtifact`]).
#[derive(Debug, Default, Clone, Copy)]
pub struct ArtifactLoader;

impl ModelLoader for ArtifactLoader {
    fn load(&self, path: &Path) -> Result<ModelHandle, ArtifactError> {
        let artifact = ModelArtifact::from_path(path)?;
        let potential = artifact.build()?;
        info!(
            path = %path.display(),
            ensemble = potential.ensemble_size(),
            cutoff = potential.cutoff(),
            "Loaded neural network potential."
        );
        Ok(Arc::new(potential))
    }
}

/// Picks a backend from the artifact's file extension.
///
/// `.toml` goes to [`ArtifactLoader`]; `.jpt` and `.pt` are TorchScript
/// modules, which need the `torch` feature. TorchScript modules carry no
/// element list of their own, so the loader is given the elements to declare.
#[derive(Debug, Clone)]
pub struct FormatLoader {
    #[cfg_attr(not(feature = "torch"), allow(dead_code))]
    torch_elements: Vec<Element>,
}

impl FormatLoader {
    pub fn new(torch_elements: Vec<Element>) -> Self {
        Self { torch_elements }
    }

    #[cfg(feature = "torch")]
    fn load_torchscript(&self, path: &Path) -> Result<ModelHandle, ArtifactError> {
        super::torchscript::TorchScriptLoader::new(self.torch_elements.clone()).load(path)
    }

    #[cfg(not(feature = "torch"))]
    fn load_torchscript(&self, path: &Path) -> Result<ModelHandle, ArtifactError> {
        Err(ArtifactError::UnsupportedFormat {
            path: path.display().to_string(),
            reason: "TorchScript models need a build with the `torch` feature".to_string(),
        })
    }
}

impl ModelLoader for FormatLoader {
    fn load(&self, path: &Path) -> Result<ModelHandle, ArtifactError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("toml") => ArtifactLoader.load(path),
            Some("jpt" | "pt") => self.load_torchscript(path),
            other => Err(ArtifactError::UnsupportedFormat {
                path: path.display().to_string(),
                reason: match other {
                    Some(ext) => format!("unrecognized extension '.{}'", ext),
                    None => "no file extension".to_string(),
                },
            }),
        }
    }
}
