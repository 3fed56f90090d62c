use super::descriptor::RadialDescriptor;
use super::network::{Activation, AtomicNetwork, DenseLayer};
use super::neural::{EnsembleMember, NeuralPotential};
use crate::core::models::element::Element;
use nalgebra::{DMatrix, DVector};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Invalid model artifact: {0}")]
    Invalid(String),
    #[error("Unsupported model format for '{path}': {reason}")]
    UnsupportedFormat { path: String, reason: String },
    #[cfg(feature = "torch")]
    #[error("TorchScript error for '{path}': {source}")]
    Torch {
        path: String,
        source: tch::TchError,
    },
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum ActivationSpec {
    #[default]
    Linear,
    Tanh,
    Celu { alpha: f64 },
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct LayerSpec {
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
    #[serde(default)]
    activation: ActivationSpec,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct NetworkSpec {
    #[serde(default)]
    self_energy: f64,
    layers: Vec<LayerSpec>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct MemberSpec {
    networks: HashMap<String, NetworkSpec>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
struct DescriptorSpec {
    etas: Vec<f64>,
    shifts: Vec<f64>,
}

/// On-disk layout of a neural network potential ensemble (TOML).
#[derive(Debug, Deserialize, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct ModelArtifact {
    name: String,
    #[serde(default)]
    description: Option<String>,
    cutoff: f64,
    elements: Vec<String>,
    #[serde(default)]
    max_atoms: Option<usize>,
    descriptor: DescriptorSpec,
    members: Vec<MemberSpec>,
}

fn invalid(msg: impl Into<String>) -> ArtifactError {
    ArtifactError::Invalid(msg.into())
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

impl ModelArtifact {
    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let content = std::fs::read_to_string(path).map_err(|e| ArtifactError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ArtifactError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ArtifactError> {
        toml::from_str(content).map_err(|e| ArtifactError::Toml {
            path: "<memory>".to_string(),
            source: e,
        })
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Validates the artifact and assembles the evaluable potential.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::Invalid`] when shapes do not chain, parameters
    /// are non-finite, or the element list and per-element networks disagree.
    pub fn build(self) -> Result<NeuralPotential, ArtifactError> {
        if !(self.cutoff.is_finite() && self.cutoff > 0.0) {
            return Err(invalid(format!("cutoff must be positive, got {}", self.cutoff)));
        }

        let mut elements = Vec::with_capacity(self.elements.len());
        let mut seen = HashSet::new();
        for symbol in &self.elements {
            let element = Element::from_symbol(symbol)
                .map_err(|e| invalid(format!("element list: {}", e)))?;
            if !seen.insert(element) {
                return Err(invalid(format!("element '{}' listed twice", symbol)));
            }
            elements.push(element);
        }
        if elements.is_empty() {
            return Err(invalid("model declares no elements"));
        }

        let DescriptorSpec { etas, shifts } = self.descriptor;
        if etas.is_empty() || etas.len() != shifts.len() {
            return Err(invalid(format!(
                "descriptor needs matching non-empty etas/shifts, got {} and {}",
                etas.len(),
                shifts.len()
            )));
        }
        if !all_finite(&etas) || !all_finite(&shifts) || etas.iter().any(|&e| e <= 0.0) {
            return Err(invalid("descriptor etas must be positive and shifts finite"));
        }
        let descriptor = RadialDescriptor::new(self.cutoff, etas, shifts, elements.len());
        let input_dim = descriptor.len() + 1;

        if self.members.is_empty() {
            return Err(invalid("ensemble has no members"));
        }
        let mut members = Vec::with_capacity(self.members.len());
        for (member_idx, mut member) in self.members.into_iter().enumerate() {
            let mut networks = Vec::with_capacity(elements.len());
            for element in &elements {
                let spec = member.networks.remove(element.symbol()).ok_or_else(|| {
                    invalid(format!(
                        "member {} has no network for element {}",
                        member_idx, element
                    ))
                })?;
                networks.push(build_network(spec, input_dim).map_err(|msg| {
                    invalid(format!("member {} network {}: {}", member_idx, element, msg))
                })?);
            }
            if let Some(extra) = member.networks.keys().next() {
                return Err(invalid(format!(
                    "member {} has a network for undeclared element '{}'",
                    member_idx, extra
                )));
            }
            members.push(EnsembleMember { networks });
        }

        Ok(NeuralPotential::new(
            self.name,
            elements,
            descriptor,
            members,
            self.max_atoms,
        ))
    }
}

fn build_network(spec: NetworkSpec, input_dim: usize) -> Result<AtomicNetwork, String> {
    if !spec.self_energy.is_finite() {
        return Err("self-energy is not finite".to_string());
    }
    if spec.layers.is_empty() {
        return Err("network has no layers".to_string());
    }

    let mut expected_in = input_dim;
    let mut layers = Vec::with_capacity(spec.layers.len());
    for (idx, layer) in spec.layers.into_iter().enumerate() {
        let rows = layer.weights.len();
        if rows == 0 || layer.biases.len() != rows {
            return Err(format!(
                "layer {} has {} weight rows and {} biases",
                idx,
                rows,
                layer.biases.len()
            ));
        }
        if let Some(bad) = layer.weights.iter().find(|row| row.len() != expected_in) {
            return Err(format!(
                "layer {} expects input width {}, found a row of width {}",
                idx,
                expected_in,
                bad.len()
            ));
        }
        let flat: Vec<f64> = layer.weights.into_iter().flatten().collect();
        if !all_finite(&flat) || !all_finite(&layer.biases) {
            return Err(format!("layer {} has non-finite parameters", idx));
        }
        let activation = match layer.activation {
            ActivationSpec::Linear => Activation::Linear,
            ActivationSpec::Tanh => Activation::Tanh,
            ActivationSpec::Celu { alpha } if alpha.is_finite() && alpha > 0.0 => {
                Activation::Celu { alpha }
            }
            ActivationSpec::Celu { alpha } => {
                return Err(format!("layer {} has invalid celu alpha {}", idx, alpha));
            }
        };
        layers.push(DenseLayer {
            weights: DMatrix::from_row_slice(rows, expected_in, &flat),
            biases: DVector::from_vec(layer.biases),
            activation,
        });
        expected_in = rows;
    }

    if expected_in != 1 {
        return Err(format!("final layer must output 1 value, outputs {}", expected_in));
    }
    Ok(AtomicNetwork {
        layers,
        self_energy: spec.self_energy,
    })
}
