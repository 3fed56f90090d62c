use super::prepare;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::potential::model::{NetCharge, Prediction};
use crate::engine::error::EngineError;
use crate::engine::registry::ModelRegistry;
use nalgebra::Vector3;
use tracing::{info, instrument};

/// A decoded structure together with its evaluated energy and forces.
#[derive(Debug, Clone, PartialEq)]
pub struct SinglePoint {
    pub configuration: AtomicConfiguration,
    pub prediction: Prediction,
}

/// Decodes and evaluates a structure, keeping the configuration the forces refer to.
#[instrument(skip(registry, structure), name = "single_point_workflow")]
pub fn run_single_point(
    registry: &ModelRegistry,
    structure: &str,
    charge: NetCharge,
    model: &str,
) -> Result<SinglePoint, EngineError> {
    let request = prepare(registry, structure, charge, model)?;
    let prediction = request.calculator.evaluate(&request.configuration)?;
    info!(
        energy = prediction.energy,
        fmax = prediction.max_force(),
        "Single-point evaluation complete."
    );
    Ok(SinglePoint {
        configuration: request.configuration,
        prediction,
    })
}

/// Energy and forces of a structure in one evaluation.
pub fn get_prediction(
    registry: &ModelRegistry,
    structure: &str,
    charge: NetCharge,
    model: &str,
) -> Result<Prediction, EngineError> {
    run_single_point(registry, structure, charge, model).map(|sp| sp.prediction)
}

/// Potential energy of a structure in eV.
pub fn get_energy(
    registry: &ModelRegistry,
    structure: &str,
    charge: NetCharge,
    model: &str,
) -> Result<f64, EngineError> {
    get_prediction(registry, structure, charge, model).map(|p| p.energy)
}

/// Per-atom forces in eV/Å, in input atom order.
pub fn get_forces(
    registry: &ModelRegistry,
    structure: &str,
    charge: NetCharge,
    model: &str,
) -> Result<Vec<Vector3<f64>>, EngineError> {
    get_prediction(registry, structure, charge, model).map(|p| p.forces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::xyz::XyzError;
    use crate::engine::error::{ModelError, ValidationError};
    use crate::workflows::testing::{WATER_XYZ, water_registry};

    #[test]
    fn triatomic_energy_is_finite_and_forces_match_atom_count() {
        let (_dir, registry) = water_registry();
        let energy = get_energy(&registry, WATER_XYZ, 0, "b973c").unwrap();
        assert!(energy.is_finite());

        let forces = get_forces(&registry, WATER_XYZ, 0, "b973c").unwrap();
        assert_eq!(forces.len(), 3);
        assert!(forces.iter().all(|f| f.iter().all(|c| c.is_finite())));
        assert_eq!(registry.cached_count(), 1);
    }

    #[test]
    fn single_point_keeps_input_element_order() {
        let (_dir, registry) = water_registry();
        let result = run_single_point(&registry, WATER_XYZ, 0, "b973c").unwrap();
        let symbols: Vec<_> = result.configuration.elements().map(|e| e.symbol()).collect();
        assert_eq!(symbols, vec!["O", "H", "H"]);
        assert_eq!(result.prediction.forces.len(), result.configuration.len());
        assert_eq!(
            result.prediction,
            get_prediction(&registry, WATER_XYZ, 0, "b973c").unwrap()
        );
    }

    #[test]
    fn out_of_range_charge_fails_without_loading() {
        let (_dir, registry) = water_registry();
        let err = get_energy(&registry, WATER_XYZ, 5, "b973c").unwrap_err();
        assert!(matches!(
            err,
            EngineError::Validation(ValidationError::UnsupportedCharge { charge: 5, .. })
        ));
        assert_eq!(registry.cached_count(), 0);
    }

    #[test]
    fn unsupported_element_fails_without_loading() {
        let (_dir, registry) = water_registry();
        let structure = "2\n\nNa 0 0 0\nCl 0 0 2.4\n";
        let err = get_energy(&registry, structure, 0, "b973c").unwrap_err();
        match err {
            EngineError::Validation(ValidationError::UnsupportedElement { elements, .. }) => {
                let symbols: Vec<_> = elements.iter().map(|e| e.symbol()).collect();
                assert_eq!(symbols, vec!["Na"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(registry.cached_count(), 0);
    }

    #[test]
    fn nonexistent_model_path_is_model_not_found() {
        let (dir, registry) = water_registry();
        let missing = dir.path().join("nope").join("model.toml");
        let err = get_energy(&registry, WATER_XYZ, 0, missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(
            err,
            EngineError::Model(ModelError::ModelNotFound { .. })
        ));
        assert_eq!(registry.cached_count(), 0);
    }

    #[test]
    fn in_domain_element_without_network_is_model_mismatch() {
        let (_dir, registry) = water_registry();
        let structure = "2\n\nC 0 0 0\nO 0 0 1.2\n";
        let err = get_energy(&registry, structure, 0, "b973c").unwrap_err();
        assert!(matches!(err, EngineError::Evaluation(_)));
    }

    #[test]
    fn malformed_structure_is_reported_before_validation() {
        let (_dir, registry) = water_registry();
        let err = get_energy(&registry, "2\n\nH 0 0 0\n", 9, "b973c").unwrap_err();
        assert!(matches!(err, EngineError::Structure(XyzError::MissingAtoms { .. })));
    }
}
