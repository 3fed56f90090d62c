use nalgebra::{DVector, Point3, Vector3};
use std::f64::consts::PI;

/// Below this separation two atoms are considered to coincide.
pub const MIN_SEPARATION: f64 = 1e-8;

/// One neighbor of a central atom inside the cutoff sphere.
#[derive(Debug, Clone, Copy)]
pub struct Neighbor {
    pub index: usize,
    /// Species index of the neighbor within the model's element list.
    pub species: usize,
    pub distance: f64,
    /// Unit vector pointing from the neighbor to the central atom.
    pub direction: Vector3<f64>,
}

/// Radial atomic environment descriptor.
///
/// For every neighbor species `s` and every radial channel `k`:
/// `G[s, k] = Σ_j exp(-η_k (r_ij - R_k)²) · f_c(r_ij)` with the cosine cutoff
/// `f_c(r) = ½ cos(π r / r_c) + ½`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialDescriptor {
    cutoff: f64,
    etas: Vec<f64>,
    shifts: Vec<f64>,
    num_species: usize,
}

impl RadialDescriptor {
    pub fn new(cutoff: f64, etas: Vec<f64>, shifts: Vec<f64>, num_species: usize) -> Self {
        debug_assert_eq!(etas.len(), shifts.len());
        Self {
            cutoff,
            etas,
            shifts,
            num_species,
        }
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    pub fn num_channels(&self) -> usize {
        self.etas.len()
    }

    /// Descriptor length, excluding the trailing charge feature.
    pub fn len(&self) -> usize {
        self.num_species * self.etas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn cutoff_fn(&self, r: f64) -> (f64, f64) {
        let arg = PI * r / self.cutoff;
        (0.5 * arg.cos() + 0.5, -0.5 * PI / self.cutoff * arg.sin())
    }

    /// Value and radial derivative of channel `k` at distance `r`.
    #[inline]
    pub fn channel(&self, k: usize, r: f64) -> (f64, f64) {
        let (fc, dfc) = self.cutoff_fn(r);
        let dr = r - self.shifts[k];
        let gauss = (-self.etas[k] * dr * dr).exp();
        let dgauss = -2.0 * self.etas[k] * dr * gauss;
        (gauss * fc, dgauss * fc + gauss * dfc)
    }

    /// Collects the neighbors of atom `center` within the cutoff.
    ///
    /// Returns `Err((center, j))` for the first neighbor that coincides with
    /// the central atom.
    pub fn neighbors(
        &self,
        center: usize,
        positions: &[Point3<f64>],
        species: &[usize],
    ) -> Result<Vec<Neighbor>, (usize, usize)> {
        let origin = positions[center];
        let mut neighbors = Vec::new();
        for (j, position) in positions.iter().enumerate() {
            if j == center {
                continue;
            }
            let delta = origin - position;
            let distance = delta.norm();
            if distance < MIN_SEPARATION {
                return Err((center, j));
            }
            if distance < self.cutoff {
                neighbors.push(Neighbor {
                    index: j,
                    species: species[j],
                    distance,
                    direction: delta / distance,
                });
            }
        }
        Ok(neighbors)
    }

    /// Computes the descriptor of an atom from its neighbor list.
    pub fn features(&self, neighbors: &[Neighbor]) -> DVector<f64> {
        let channels = self.num_channels();
        let mut features = DVector::zeros(self.len());
        for neighbor in neighbors {
            for k in 0..channels {
                features[neighbor.species * channels + k] += self.channel(k, neighbor.distance).0;
            }
        }
        features
    }

    /// Chain rule from `dE/dG` of the central atom to `dE/dr` of each neighbor pair.
    pub fn pair_derivative(&self, grad_features: &DVector<f64>, neighbor: &Neighbor) -> f64 {
        let channels = self.num_channels();
        (0..channels)
            .map(|k| grad_features[neighbor.species * channels + k] * self.channel(k, neighbor.distance).1)
            .sum()
    }
}
