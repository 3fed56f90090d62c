//! Provides input/output functionality for textual structure formats.
//!
//! Structures enter and leave the library as text. This module defines the
//! [`traits::StructureFile`] interface and the XYZ implementation used by the
//! public workflows.

pub mod traits;
pub mod xyz;
