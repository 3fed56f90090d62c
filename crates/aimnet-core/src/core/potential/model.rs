use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::element::Element;
use nalgebra::Vector3;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Net molecular charge in units of the elementary charge.
pub type NetCharge = i32;

/// Shared, immutable handle to a loaded potential.
pub type ModelHandle = Arc<dyn PotentialModel>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvalError {
    #[error("Degenerate geometry: {reason}")]
    GeometryDegenerate { reason: String },
    #[error("Model '{model}' cannot score this configuration: {reason}")]
    ModelMismatch { model: String, reason: String },
}

/// The result of one energy/force evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// Total potential energy in eV.
    pub energy: f64,
    /// Forces in eV/Å, one per atom, in configuration order.
    pub forces: Vec<Vector3<f64>>,
}

impl Prediction {
    /// The largest per-atom force magnitude.
    pub fn max_force(&self) -> f64 {
        self.forces.iter().map(|f| f.norm()).fold(0.0, f64::max)
    }
}

/// A differentiable potential energy surface.
///
/// Implementations are immutable once constructed and must be safe to share
/// between threads; every evaluation is a pure function of its inputs.
pub trait PotentialModel: Send + Sync + fmt::Debug {
    /// A human-readable identifier of the loaded model.
    fn name(&self) -> &str;

    /// The elements this model has parameters for.
    fn supported_elements(&self) -> &[Element];

    /// The largest configuration the model accepts, if bounded.
    fn max_atoms(&self) -> Option<usize> {
        None
    }

    /// Computes the energy and the forces (negative energy gradient) of a
    /// configuration at the given net charge.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError`] if the geometry is degenerate or the configuration
    /// contains something the model cannot score.
    fn evaluate(
        &self,
        configuration: &AtomicConfiguration,
        charge: NetCharge,
    ) -> Result<Prediction, EvalError>;
}
