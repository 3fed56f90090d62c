//! TorchScript AIMNet2 ensembles (`*.jpt`) evaluated through libtorch.
//!
//! The compiled module takes a dictionary with `coord` (`[1, N, 3]`, Å),
//! `numbers` (`[1, N]`) and `charge` (`[1]`) and returns a dictionary whose
//! `energy` entry is in eV. Forces come from back-propagating the energy to
//! `coord`.

use super::artifact::ArtifactError;
use super::loader::ModelLoader;
use super::model::{EvalError, ModelHandle, NetCharge, PotentialModel, Prediction};
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::element::Element;
use nalgebra::Vector3;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tch::{CModule, Device, IValue, Kind, Tensor};
use tracing::{debug, info};

pub struct TorchScriptModel {
    name: String,
    module: Mutex<CModule>,
    elements: Vec<Element>,
}

impl std::fmt::Debug for TorchScriptModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TorchScriptModel")
            .field("name", &self.name)
            .field("elements", &self.elements)
            .finish_non_exhaustive()
    }
}

impl TorchScriptModel {
    /// Loads a compiled module onto the CPU in inference mode.
    pub fn load(path: &Path, elements: Vec<Element>) -> Result<Self, ArtifactError> {
        let mut module =
            CModule::load_on_device(path, Device::Cpu).map_err(|e| ArtifactError::Torch {
                path: path.display().to_string(),
                source: e,
            })?;
        module.set_eval();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self {
            name,
            module: Mutex::new(module),
            elements,
        })
    }

    fn mismatch(&self, reason: impl Into<String>) -> EvalError {
        EvalError::ModelMismatch {
            model: self.name.clone(),
            reason: reason.into(),
        }
    }

    fn run(
        &self,
        configuration: &AtomicConfiguration,
        charge: NetCharge,
    ) -> Result<Prediction, tch::TchError> {
        let n = configuration.len() as i64;
        let coords: Vec<f32> = configuration
            .positions()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect();
        let numbers: Vec<i64> = configuration
            .elements()
            .map(|e| i64::from(e.atomic_number()))
            .collect();

        let coord = Tensor::from_slice(&coords)
            .reshape([1, n, 3])
            .set_requires_grad(true);
        let input = IValue::GenericDict(vec![
            (
                IValue::String("coord".to_string()),
                IValue::Tensor(coord.shallow_clone()),
            ),
            (
                IValue::String("numbers".to_string()),
                IValue::Tensor(Tensor::from_slice(&numbers).reshape([1, n])),
            ),
            (
                IValue::String("charge".to_string()),
                IValue::Tensor(Tensor::from_slice(&[charge as f32])),
            ),
        ]);

        let output = {
            let module = self.module.lock().unwrap_or_else(PoisonError::into_inner);
            module.forward_is(&[input])?
        };
        let energy = energy_entry(output)?.sum(Kind::Double);
        energy.backward();

        let gradient = coord.grad().to_kind(Kind::Double).reshape([-1]);
        let gradient = Vec::<f64>::try_from(&gradient)?;
        let forces = gradient
            .chunks_exact(3)
            .map(|g| -Vector3::new(g[0], g[1], g[2]))
            .collect();
        Ok(Prediction {
            energy: energy.double_value(&[]),
            forces,
        })
    }
}

fn energy_entry(output: IValue) -> Result<Tensor, tch::TchError> {
    let IValue::GenericDict(entries) = output else {
        return Err(tch::TchError::Kind(
            "module output is not a dictionary".to_string(),
        ));
    };
    entries
        .into_iter()
        .find_map(|(key, value)| match (key, value) {
            (IValue::String(k), IValue::Tensor(t)) if k == "energy" => Some(t),
            _ => None,
        })
        .ok_or_else(|| tch::TchError::Kind("module output has no 'energy' tensor".to_string()))
}

impl PotentialModel for TorchScriptModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_elements(&self) -> &[Element] {
        &self.elements
    }

    fn evaluate(
        &self,
        configuration: &AtomicConfiguration,
        charge: NetCharge,
    ) -> Result<Prediction, EvalError> {
        let prediction = self
            .run(configuration, charge)
            .map_err(|e| self.mismatch(e.to_string()))?;
        debug!(
            model = %self.name,
            atoms = configuration.len(),
            energy = prediction.energy,
            "TorchScript potential evaluated."
        );
        Ok(prediction)
    }
}

/// Loads TorchScript ensembles, declaring the given elements as supported.
#[derive(Debug, Clone)]
pub struct TorchScriptLoader {
    elements: Vec<Element>,
}

impl TorchScriptLoader {
    pub fn new(elements: Vec<Element>) -> Self {
        Self { elements }
    }
}

impl ModelLoader for TorchScriptLoader {
    fn load(&self, path: &Path) -> Result<ModelHandle, ArtifactError> {
        let model = TorchScriptModel::load(path, self.elements.clone())?;
        info!(path = %path.display(), model = %model.name, "Loaded TorchScript potential.");
        Ok(Arc::new(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn garbage_module_is_a_torch_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aimnet2_b973c_ens.jpt");
        fs::write(&path, b"not a torchscript archive").unwrap();

        let err = TorchScriptLoader::new(vec![Element::H]).load(&path).unwrap_err();
        assert!(matches!(err, ArtifactError::Torch { .. }));
    }

    #[test]
    fn non_dictionary_output_is_rejected() {
        let err = energy_entry(IValue::Double(1.0)).unwrap_err();
        assert!(err.to_string().contains("not a dictionary"));
    }

    #[test]
    fn energy_tensor_is_found_by_key() {
        let output = IValue::GenericDict(vec![
            (
                IValue::String("charges".to_string()),
                IValue::Tensor(Tensor::from_slice(&[0.1f32, -0.1])),
            ),
            (
                IValue::String("energy".to_string()),
                IValue::Tensor(Tensor::from_slice(&[-2.5f64])),
            ),
        ]);
        let energy = energy_entry(output).unwrap();
        assert_eq!(energy.double_value(&[0]), -2.5);
    }

    #[test]
    fn missing_energy_entry_is_rejected() {
        let output = IValue::GenericDict(vec![(
            IValue::String("forces".to_string()),
            IValue::Tensor(Tensor::zeros([1, 3], (Kind::Float, Device::Cpu))),
        )]);
        let err = energy_entry(output).unwrap_err();
        assert!(err.to_string().contains("'energy'"));
    }
}
