use super::prepare;
use crate::core::io::traits::StructureFile;
use crate::core::io::xyz::{XyzFile, XyzMetadata};
use crate::core::potential::model::NetCharge;
use crate::engine::config::OptimizerConfig;
use crate::engine::error::EngineError;
use crate::engine::optimizer::{Bfgs, OptimizationResult};
use crate::engine::progress::ProgressReporter;
use crate::engine::registry::ModelRegistry;
use tracing::{info, instrument};

#[derive(Debug, Clone)]
pub struct OptimizedGeometry {
    /// The relaxed structure as XYZ text, with the final energy in the comment.
    pub xyz: String,
    pub outcome: OptimizationResult,
}

/// Relaxes a structure with BFGS and returns the final geometry.
///
/// Reaching the step limit is not an error; inspect
/// [`OptimizationResult::status`] to tell it apart from convergence.
#[instrument(skip(registry, structure, config, reporter), name = "optimize_workflow")]
pub fn optimize_geometry(
    registry: &ModelRegistry,
    structure: &str,
    charge: NetCharge,
    model: &str,
    config: &OptimizerConfig,
    reporter: &ProgressReporter,
) -> Result<OptimizedGeometry, EngineError> {
    let request = prepare(registry, structure, charge, model)?;
    let outcome = Bfgs::new(&request.calculator, config).run(request.configuration, reporter)?;
    info!(
        steps = outcome.steps,
        status = ?outcome.status,
        energy = outcome.energy,
        "Optimization workflow finished."
    );

    let metadata = XyzMetadata::with_energy(outcome.energy);
    let xyz = XyzFile::write_to_string(&outcome.configuration, &metadata)?;
    Ok(OptimizedGeometry { xyz, outcome })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::optimizer::OptimizerStatus;
    use crate::workflows::single_point::get_forces;
    use crate::workflows::testing::{WATER_XYZ, water_registry};

    #[test]
    fn triatomic_relaxes_below_force_threshold() {
        let (_dir, registry) = water_registry();
        let config = OptimizerConfig::default();
        let result = optimize_geometry(
            &registry,
            WATER_XYZ,
            0,
            "b973c",
            &config,
            &ProgressReporter::new(),
        )
        .unwrap();

        assert_eq!(result.outcome.status, OptimizerStatus::Converged);
        let (relaxed, metadata) = XyzFile::read_from_str(&result.xyz).unwrap();
        let (original, _) = XyzFile::read_from_str(WATER_XYZ).unwrap();
        assert_eq!(relaxed.len(), original.len());
        assert_eq!(
            relaxed.elements().collect::<Vec<_>>(),
            original.elements().collect::<Vec<_>>()
        );
        assert!(metadata.comment.contains("energy="));

        let forces = get_forces(&registry, &result.xyz, 0, "b973c").unwrap();
        let fmax = forces.iter().map(|f| f.norm()).fold(0.0, f64::max);
        assert!(fmax <= config.fmax + 1e-6, "fmax after relaxation: {}", fmax);
    }

    #[test]
    fn relaxation_lowers_the_energy() {
        let (_dir, registry) = water_registry();
        let start = "3\n\nO 0.0 0.0 0.0\nH 0.0 1.3 0.0\nH 1.2 -0.2 0.0\n";
        let initial = crate::workflows::single_point::get_energy(&registry, start, 0, "b973c").unwrap();
        let result = optimize_geometry(
            &registry,
            start,
            0,
            "b973c",
            &OptimizerConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap();
        assert!(result.outcome.energy < initial);
    }

    #[test]
    fn invalid_charge_fails_before_optimizing() {
        let (_dir, registry) = water_registry();
        let err = optimize_geometry(
            &registry,
            WATER_XYZ,
            -3,
            "b973c",
            &OptimizerConfig::default(),
            &ProgressReporter::new(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(registry.cached_count(), 0);
    }
}
