use super::error::EvalError;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::potential::model::{ModelHandle, NetCharge, Prediction};
use std::collections::BTreeSet;
use tracing::{instrument, trace};

/// A loaded model bound to a fixed net charge.
#[derive(Debug, Clone)]
pub struct Calculator {
    model: ModelHandle,
    charge: NetCharge,
}

impl Calculator {
    pub fn new(model: ModelHandle, charge: NetCharge) -> Self {
        Self { model, charge }
    }

    pub fn model(&self) -> &ModelHandle {
        &self.model
    }

    pub fn charge(&self) -> NetCharge {
        self.charge
    }

    /// Energy (eV) and forces (eV/Å) of a configuration.
    ///
    /// # Errors
    ///
    /// - [`EvalError::GeometryDegenerate`] for non-finite coordinates or model output
    /// - [`EvalError::ModelMismatch`] if the model cannot score the atom count or elements
    #[instrument(skip_all, fields(atoms = configuration.len(), charge = self.charge))]
    pub fn evaluate(&self, configuration: &AtomicConfiguration) -> Result<Prediction, EvalError> {
        if !configuration.is_finite() {
            return Err(EvalError::GeometryDegenerate {
                reason: "configuration contains non-finite coordinates".to_string(),
            });
        }
        self.check_compatibility(configuration)?;

        let prediction = self.model.evaluate(configuration, self.charge)?;
        if prediction.forces.len() != configuration.len() {
            return Err(EvalError::ModelMismatch {
                model: self.model.name().to_string(),
                reason: format!(
                    "returned {} force vectors for {} atoms",
                    prediction.forces.len(),
                    configuration.len()
                ),
            });
        }
        let finite = prediction.energy.is_finite()
            && prediction
                .forces
                .iter()
                .all(|f| f.iter().all(|c| c.is_finite()));
        if !finite {
            return Err(EvalError::GeometryDegenerate {
                reason: "model returned non-finite energy or forces".to_string(),
            });
        }

        trace!(energy = prediction.energy, fmax = prediction.max_force());
        Ok(prediction)
    }

    fn check_compatibility(&self, configuration: &AtomicConfiguration) -> Result<(), EvalError> {
        if let Some(limit) = self.model.max_atoms() {
            if configuration.len() > limit {
                return Err(EvalError::ModelMismatch {
                    model: self.model.name().to_string(),
                    reason: format!(
                        "{} atoms exceeds the model limit of {}",
                        configuration.len(),
                        limit
                    ),
                });
            }
        }

        let supported = self.model.supported_elements();
        let missing: BTreeSet<_> = configuration
            .elements()
            .filter(|e| !supported.contains(e))
            .collect();
        if !missing.is_empty() {
            let symbols: Vec<_> = missing.iter().map(|e| e.symbol()).collect();
            return Err(EvalError::ModelMismatch {
                model: self.model.name().to_string(),
                reason: format!("no parameters for element(s) {}", symbols.join(", ")),
            });
        }
        Ok(())
    }
}
