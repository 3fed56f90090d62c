//! # Core Module
//!
//! Fundamental building blocks shared by the engine and workflows.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Elements, atoms, and ordered atomic configurations
//! - **File I/O** ([`io`]) - The structure-file trait and the XYZ format
//! - **Potentials** ([`potential`]) - The potential-model trait and the neural network ensemble
//!
//! Everything here is free of shared mutable state; evaluation of a loaded
//! potential is a pure function of the configuration and net charge.

pub mod io;
pub mod models;
pub mod potential;
