use super::element::Element;
use nalgebra::Point3;

/// A single atom of an [`AtomicConfiguration`](super::configuration::AtomicConfiguration).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Atom {
    /// The chemical identity of the atom.
    pub element: Element,
    /// Cartesian coordinates in Angstroms.
    pub position: Point3<f64>,
}

impl Atom {
    pub fn new(element: Element, position: Point3<f64>) -> Self {
        Self { element, position }
    }

    /// Returns `true` when every coordinate is a finite number.
    #[inline]
    pub fn has_finite_position(&self) -> bool {
        self.position.iter().all(|c| c.is_finite())
    }
}
