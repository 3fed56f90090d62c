//! # Potential Module
//!
//! Machine-learned interatomic potentials: the [`PotentialModel`](model::PotentialModel)
//! abstraction the engine evaluates, and a concrete ensemble of element-resolved
//! atomic neural networks.
//!
//! ## Key Components
//!
//! - [`model`] - The model trait, predictions, and evaluation errors
//! - [`descriptor`] - Radial atomic environment descriptors with analytic derivatives
//! - [`network`] - Dense per-element networks with back-propagation to the input
//! - [`neural`] - The ensemble potential (energy and forces)
//! - [`artifact`] - The TOML artifact format and its validation
//! - [`loader`] - Loading artifacts from disk behind the [`ModelLoader`](loader::ModelLoader) seam
//! - `torchscript` - Compiled AIMNet2 `.jpt` ensembles through libtorch (`torch` feature)

pub mod artifact;
pub mod descriptor;
pub mod loader;
pub mod model;
pub mod network;
pub mod neural;
#[cfg(feature = "torch")]
pub mod torchscript;

#[cfg(test)]
pub(crate) mod testing {
    /// A two-member linear water model over H and O.
    ///
    /// Descriptor layout is `[H:ch0, H:ch1, O:ch0, O:ch1, charge]`.
    pub fn water_model_toml() -> String {
        r#"name = "test-water"
description = "Linear two-member water model"
cutoff = 5.0
elements = ["H", "O"]
max-atoms = 64

[descriptor]
etas = [4.0, 4.0]
shifts = [0.96, 1.5]

[[members]]
[members.networks.H]
self-energy = -0.5
[[members.networks.H.layers]]
weights = [[0.0, -1.0, -2.0, 0.0, 0.1]]
biases = [0.0]

[members.networks.O]
self-energy = -2.0
[[members.networks.O.layers]]
weights = [[-2.0, 0.0, 0.0, 0.0, 0.1]]
biases = [0.0]

[[members]]
[members.networks.H]
self-energy = -0.5
[[members.networks.H.layers]]
weights = [[0.0, -1.0, -2.0, 0.0, 0.1]]
biases = [0.0]

[members.networks.O]
self-energy = -2.0
[[members.networks.O.layers]]
weights = [[-1.5, 0.0, 0.0, 0.0, 0.1]]
biases = [0.0]
"#
        .to_string()
    }

    /// A single-member model with a non-linear hidden layer per element.
    pub fn hidden_layer_model_toml() -> String {
        r#"name = "test-hidden"
cutoff = 4.5
elements = ["H", "O"]

[descriptor]
etas = [2.0, 6.0]
shifts = [1.0, 1.6]

[[members]]
[members.networks.H]
self-energy = -0.4
[[members.networks.H.layers]]
weights = [[0.3, -0.8, -1.2, 0.4, 0.05], [-0.5, 0.2, 0.9, -0.3, 0.0]]
biases = [0.1, -0.2]
activation = { kind = "tanh" }
[[members.networks.H.layers]]
weights = [[1.1, -0.7]]
biases = [0.02]

[members.networks.O]
self-energy = -1.9
[[members.networks.O.layers]]
weights = [[-1.4, 0.6, 0.1, 0.0, 0.05], [0.7, -0.9, 0.0, 0.2, 0.0]]
biases = [-0.1, 0.3]
activation = { kind = "celu", alpha = 0.5 }
[[members.networks.O.layers]]
weights = [[0.9, 0.6]]
biases = [0.0]
"#
        .to_string()
    }
}
