//! # Engine Module
//!
//! The stateful layer between raw potentials and the public workflows: it decides
//! whether a request is in scope, owns loaded models, turns configurations into
//! energies and forces, and relaxes geometries.
//!
//! ## Architecture
//!
//! - **Domain Validation** ([`validation`]) - Element and net-charge pre-flight checks
//! - **Model Registry** ([`registry`]) - Identifier resolution and the per-path model cache
//! - **Calculator** ([`calculator`]) - A model bound to a net charge, with runtime checks
//! - **Geometry Optimizer** ([`optimizer`]) - BFGS relaxation to a force threshold
//! - **Configuration** ([`config`]) - Optimizer parameters and their defaults
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Per-layer error types and the aggregate [`error::EngineError`]

pub mod calculator;
pub mod config;
pub mod error;
pub mod optimizer;
pub mod progress;
pub mod registry;
pub mod validation;
