//! # aimnet2rs Core Library
//!
//! Energy, force, and geometry-relaxation engine for AIMNet2-style machine-learned
//! interatomic potentials.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`AtomicConfiguration`,
//!   `Element`), the XYZ codec, and the potential engine: the `PotentialModel` trait
//!   and a neural network ensemble with analytic forces.
//!
//! - **[`engine`]: The Logic Core.** Domain validation, the caching `ModelRegistry`,
//!   the charge-bound `Calculator`, and the BFGS geometry optimizer, together with
//!   their configuration, progress reporting, and error types.
//!
//! - **[`workflows`]: The Public API.** `get_energy`, `get_forces`, and
//!   `optimize_geometry`, each taking XYZ text, a net charge, and a model identifier.

pub mod core;
pub mod engine;
pub mod workflows;

pub use crate::engine::config::OptimizerConfig;
pub use crate::engine::error::EngineError;
pub use crate::engine::registry::ModelRegistry;
pub use crate::workflows::relax::{OptimizedGeometry, optimize_geometry};
pub use crate::workflows::single_point::{get_energy, get_forces};
