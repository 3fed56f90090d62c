//! # Core Models Module
//!
//! Data structures describing the molecules that potentials are evaluated on.
//!
//! ## Key Components
//!
//! - [`element`] - Chemical elements with periodic-table symbol lookup
//! - [`atom`] - A single atom: element plus Cartesian position
//! - [`configuration`] - An ordered, non-empty list of atoms (`AtomicConfiguration`)
//!
//! ## Usage
//!
//! ```ignore
//! use aimnet2rs::core::models::{configuration::AtomicConfiguration, element::Element};
//! use nalgebra::Point3;
//!
//! let water = AtomicConfiguration::from_parts(
//!     &[Element::O, Element::H, Element::H],
//!     &[Point3::origin(), Point3::new(0.96, 0.0, 0.0), Point3::new(-0.24, 0.93, 0.0)],
//! )?;
//! ```

pub mod atom;
pub mod configuration;
pub mod element;
