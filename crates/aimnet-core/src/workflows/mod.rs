//! # Workflows Module
//!
//! The public entry points of the library. Each operation takes XYZ text, a net
//! charge, and a model identifier, and runs the full pipeline:
//! decode → domain validation → model resolution → evaluation.
//!
//! - **Single-point** ([`single_point`]) - [`get_energy`](single_point::get_energy) and
//!   [`get_forces`](single_point::get_forces)
//! - **Relaxation** ([`relax`]) - [`optimize_geometry`](relax::optimize_geometry)
//!
//! Validation failures abort before any model is loaded.

pub mod relax;
pub mod single_point;

use crate::core::io::traits::StructureFile;
use crate::core::io::xyz::XyzFile;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::potential::model::NetCharge;
use crate::engine::calculator::Calculator;
use crate::engine::error::EngineError;
use crate::engine::registry::ModelRegistry;
use crate::engine::validation::SupportDomain;
use tracing::debug;

/// A decoded, validated request ready for evaluation.
pub(crate) struct PreparedRequest {
    pub configuration: AtomicConfiguration,
    pub calculator: Calculator,
}

pub(crate) fn prepare(
    registry: &ModelRegistry,
    structure: &str,
    charge: NetCharge,
    model: &str,
) -> Result<PreparedRequest, EngineError> {
    let (configuration, _) = XyzFile::read_from_str(structure)?;
    SupportDomain::aimnet2().validate(configuration.elements(), charge)?;
    let handle = registry.resolve(model)?;
    debug!(
        atoms = configuration.len(),
        charge,
        model = handle.name(),
        "Request prepared."
    );
    Ok(PreparedRequest {
        configuration,
        calculator: Calculator::new(handle, charge),
    })
}
