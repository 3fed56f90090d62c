use super::atom::Atom;
use super::element::Element;
use nalgebra::{DVector, Point3};
use std::collections::BTreeSet;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigurationError {
    #[error("An atomic configuration must contain at least one atom")]
    Empty,
    #[error("Length mismatch: {elements} elements but {positions} positions")]
    LengthMismatch { elements: usize, positions: usize },
    #[error("Flat coordinate vector has length {actual}, expected {expected}")]
    FlatLengthMismatch { expected: usize, actual: usize },
}

/// An ordered, non-empty set of atoms with Cartesian positions.
///
/// The order of atoms is significant: every per-atom quantity derived from a
/// configuration (forces, relaxed positions) is reported in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicConfiguration {
    atoms: Vec<Atom>,
}

impl AtomicConfiguration {
    /// Builds a configuration from a list of atoms.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::Empty`] if `atoms` is empty.
    pub fn new(atoms: Vec<Atom>) -> Result<Self, ConfigurationError> {
        if atoms.is_empty() {
            return Err(ConfigurationError::Empty);
        }
        Ok(Self { atoms })
    }

    /// Builds a configuration from parallel element and position slices.
    pub fn from_parts(
        elements: &[Element],
        positions: &[Point3<f64>],
    ) -> Result<Self, ConfigurationError> {
        if elements.len() != positions.len() {
            return Err(ConfigurationError::LengthMismatch {
                elements: elements.len(),
                positions: positions.len(),
            });
        }
        Self::new(
            elements
                .iter()
                .zip(positions)
                .map(|(&element, &position)| Atom::new(element, position))
                .collect(),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    pub fn elements(&self) -> impl Iterator<Item = Element> + '_ {
        self.atoms.iter().map(|a| a.element)
    }

    pub fn positions(&self) -> impl Iterator<Item = &Point3<f64>> + '_ {
        self.atoms.iter().map(|a| &a.position)
    }

    /// The distinct elements present, ordered by atomic number.
    pub fn unique_elements(&self) -> BTreeSet<Element> {
        self.elements().collect()
    }

    /// Returns `true` when every coordinate of every atom is finite.
    pub fn is_finite(&self) -> bool {
        self.atoms.iter().all(Atom::has_finite_position)
    }

    /// Positions flattened to `[x0, y0, z0, x1, ...]`.
    pub fn flat_positions(&self) -> DVector<f64> {
        DVector::from_iterator(
            self.atoms.len() * 3,
            self.atoms.iter().flat_map(|a| a.position.iter().copied()),
        )
    }

    /// Overwrites all positions from a flattened `[x0, y0, z0, ...]` vector.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::FlatLengthMismatch`] if the vector is not
    /// exactly three times the atom count long; positions are left untouched.
    pub fn set_flat_positions(&mut self, flat: &DVector<f64>) -> Result<(), ConfigurationError> {
        let expected = self.atoms.len() * 3;
        if flat.len() != expected {
            return Err(ConfigurationError::FlatLengthMismatch {
                expected,
                actual: flat.len(),
            });
        }
        for (atom, chunk) in self.atoms.iter_mut().zip(flat.as_slice().chunks_exact(3)) {
            atom.position = Point3::new(chunk[0], chunk[1], chunk[2]);
        }
        Ok(())
    }
}
