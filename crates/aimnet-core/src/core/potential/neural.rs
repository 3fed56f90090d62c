use super::descriptor::{Neighbor, RadialDescriptor};
use super::model::{EvalError, NetCharge, PotentialModel, Prediction};
use super::network::AtomicNetwork;
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::models::element::Element;
use nalgebra::{DVector, Vector3};
use rayon::prelude::*;
use tracing::debug;

/// One member of the ensemble: a network per supported element, in the
/// order of the model's element list.
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleMember {
    pub(crate) networks: Vec<AtomicNetwork>,
}

/// An ensemble of element-resolved atomic neural networks over a shared
/// radial descriptor.
///
/// The total energy of a member is the sum of atomic energies; the model
/// energy and forces are the ensemble means.
#[derive(Debug, Clone, PartialEq)]
pub struct NeuralPotential {
    name: String,
    elements: Vec<Element>,
    descriptor: RadialDescriptor,
    members: Vec<EnsembleMember>,
    max_atoms: Option<usize>,
}

/// Per-atom result of one member pass: atomic energy and the gradient
/// contributions this atom's energy makes to itself and its neighbors.
struct AtomContribution {
    energy: f64,
    gradients: Vec<(usize, Vector3<f64>)>,
}

impl NeuralPotential {
    pub(crate) fn new(
        name: String,
        elements: Vec<Element>,
        descriptor: RadialDescriptor,
        members: Vec<EnsembleMember>,
        max_atoms: Option<usize>,
    ) -> Self {
        Self {
            name,
            elements,
            descriptor,
            members,
            max_atoms,
        }
    }

    pub fn ensemble_size(&self) -> usize {
        self.members.len()
    }

    pub fn cutoff(&self) -> f64 {
        self.descriptor.cutoff()
    }

    fn species_indices(&self, configuration: &AtomicConfiguration) -> Result<Vec<usize>, EvalError> {
        configuration
            .elements()
            .map(|element| {
                self.elements
                    .iter()
                    .position(|e| *e == element)
                    .ok_or_else(|| EvalError::ModelMismatch {
                        model: self.name.clone(),
                        reason: format!("element {} has no network", element),
                    })
            })
            .collect()
    }

    fn member_pass(
        &self,
        member: &EnsembleMember,
        species: &[usize],
        inputs: &[DVector<f64>],
        neighbor_lists: &[Vec<Neighbor>],
    ) -> (f64, Vec<Vector3<f64>>) {
        let contributions: Vec<AtomContribution> = (0..species.len())
            .into_par_iter()
            .map(|i| {
                let network = &member.networks[species[i]];
                let (energy, grad_input) = network.energy_and_gradient(&inputs[i]);
                let mut gradients = Vec::with_capacity(neighbor_lists[i].len() + 1);
                let mut own = Vector3::zeros();
                for neighbor in &neighbor_lists[i] {
                    let d_energy_d_r = self.descriptor.pair_derivative(&grad_input, neighbor);
                    let pair_gradient = neighbor.direction * d_energy_d_r;
                    own += pair_gradient;
                    gradients.push((neighbor.index, -pair_gradient));
                }
                gradients.push((i, own));
                AtomContribution { energy, gradients }
            })
            .collect();

        let mut energy = 0.0;
        let mut gradient = vec![Vector3::zeros(); species.len()];
        for contribution in contributions {
            energy += contribution.energy;
            for (index, g) in contribution.gradients {
                gradient[index] += g;
            }
        }
        (energy, gradient)
    }
}

impl PotentialModel for NeuralPotential {
    fn name(&self) -> &str {
        &self.name
    }

    fn supported_elements(&self) -> &[Element] {
        &self.elements
    }

    fn max_atoms(&self) -> Option<usize> {
        self.max_atoms
    }

    fn evaluate(
        &self,
        configuration: &AtomicConfiguration,
        charge: NetCharge,
    ) -> Result<Prediction, EvalError> {
        let species = self.species_indices(configuration)?;
        let positions: Vec<_> = configuration.positions().copied().collect();

        let neighbor_lists = (0..positions.len())
            .into_par_iter()
            .map(|i| self.descriptor.neighbors(i, &positions, &species))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|(i, j)| EvalError::GeometryDegenerate {
                reason: format!("atoms {} and {} coincide", i + 1, j + 1),
            })?;

        let charge_feature = f64::from(charge);
        let inputs: Vec<DVector<f64>> = neighbor_lists
            .par_iter()
            .map(|neighbors| {
                let features = self.descriptor.features(neighbors);
                let mut input = features.resize_vertically(self.descriptor.len() + 1, 0.0);
                input[self.descriptor.len()] = charge_feature;
                input
            })
            .collect();

        let mut energy = 0.0;
        let mut gradient = vec![Vector3::zeros(); positions.len()];
        for member in &self.members {
            let (member_energy, member_gradient) =
                self.member_pass(member, &species, &inputs, &neighbor_lists);
            energy += member_energy;
            for (total, g) in gradient.iter_mut().zip(member_gradient) {
                *total += g;
            }
        }

        let scale = 1.0 / self.members.len() as f64;
        let energy = energy * scale;
        let forces: Vec<Vector3<f64>> = gradient.into_iter().map(|g| -g * scale).collect();

        debug!(
            model = %self.name,
            atoms = positions.len(),
            energy,
            "Neural potential evaluated."
        );
        Ok(Prediction { energy, forces })
    }
}
