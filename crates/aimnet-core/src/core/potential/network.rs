use nalgebra::{DMatrix, DVector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Activation {
    Linear,
    Tanh,
    /// Continuously differentiable ELU, `max(0, x) + min(0, α (exp(x/α) - 1))`.
    Celu { alpha: f64 },
}

impl Activation {
    #[inline]
    fn apply(self, x: f64) -> f64 {
        match self {
            Activation::Linear => x,
            Activation::Tanh => x.tanh(),
            Activation::Celu { alpha } => {
                if x > 0.0 {
                    x
                } else {
                    alpha * ((x / alpha).exp() - 1.0)
                }
            }
        }
    }

    #[inline]
    fn derivative(self, x: f64) -> f64 {
        match self {
            Activation::Linear => 1.0,
            Activation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
            Activation::Celu { alpha } => {
                if x > 0.0 {
                    1.0
                } else {
                    (x / alpha).exp()
                }
            }
        }
    }
}

/// A fully connected layer `a = act(W x + b)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DenseLayer {
    pub weights: DMatrix<f64>,
    pub biases: DVector<f64>,
    pub activation: Activation,
}

impl DenseLayer {
    pub fn input_dim(&self) -> usize {
        self.weights.ncols()
    }

    pub fn output_dim(&self) -> usize {
        self.weights.nrows()
    }
}

/// Per-element network mapping an atomic descriptor to an atomic energy.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicNetwork {
    pub layers: Vec<DenseLayer>,
    /// Constant atomic reference energy added to the network output (eV).
    pub self_energy: f64,
}

impl AtomicNetwork {
    pub fn input_dim(&self) -> usize {
        self.layers.first().map_or(0, DenseLayer::input_dim)
    }

    /// Forward pass followed by back-propagation to the input.
    ///
    /// Returns the atomic energy and `dE/dinput`.
    pub fn energy_and_gradient(&self, input: &DVector<f64>) -> (f64, DVector<f64>) {
        let mut pre_activations = Vec::with_capacity(self.layers.len());
        let mut activation = input.clone();
        for layer in &self.layers {
            let z = &layer.weights * &activation + &layer.biases;
            activation = z.map(|v| layer.activation.apply(v));
            pre_activations.push(z);
        }
        let energy = activation[0] + self.self_energy;

        let mut upstream = DVector::from_element(1, 1.0);
        for (layer, z) in self.layers.iter().zip(&pre_activations).rev() {
            let delta = upstream.component_mul(&z.map(|v| layer.activation.derivative(v)));
            upstream = layer.weights.tr_mul(&delta);
        }
        (energy, upstream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer(rows: usize, cols: usize, values: &[f64], biases: &[f64], act: Activation) -> DenseLayer {
        DenseLayer {
            weights: DMatrix::from_row_slice(rows, cols, values),
            biases: DVector::from_column_slice(biases),
            activation: act,
        }
    }

    fn two_layer_network(hidden: Activation) -> AtomicNetwork {
        AtomicNetwork {
            layers: vec![
                layer(
                    3,
                    2,
                    &[0.5, -1.0, 0.3, 0.8, -0.7, 0.2],
                    &[0.1, -0.2, 0.05],
                    hidden,
                ),
                layer(1, 3, &[1.5, -0.5, 0.75], &[0.3], Activation::Linear),
            ],
            self_energy: -2.0,
        }
    }

    #[test]
    fn linear_network_computes_affine_map() {
        let net = AtomicNetwork {
            layers: vec![layer(1, 2, &[2.0, -1.0], &[0.5], Activation::Linear)],
            self_energy: 1.0,
        };
        let (energy, grad) = net.energy_and_gradient(&DVector::from_column_slice(&[1.0, 3.0]));
        assert!((energy - (2.0 - 3.0 + 0.5 + 1.0)).abs() < 1e-12);
        assert_eq!(grad, DVector::from_column_slice(&[2.0, -1.0]));
        assert_eq!(net.input_dim(), 2);
    }

    #[test]
    fn celu_is_continuous_at_zero() {
        let act = Activation::Celu { alpha: 0.1 };
        assert!(act.apply(-1e-12).abs() < 1e-10);
        assert_eq!(act.apply(2.0), 2.0);
        assert!((act.apply(-10.0) + 0.1).abs() < 1e-10);
        assert!((act.derivative(-1e-12) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gradient_matches_finite_difference_for_each_activation() {
        let h = 1e-6;
        for act in [
            Activation::Linear,
            Activation::Tanh,
            Activation::Celu { alpha: 0.5 },
        ] {
            let net = two_layer_network(act);
            let x = DVector::from_column_slice(&[0.4, -0.3]);
            let (_, grad) = net.energy_and_gradient(&x);
            for i in 0..2 {
                let mut xp = x.clone();
                let mut xm = x.clone();
                xp[i] += h;
                xm[i] -= h;
                let numeric = (net.energy_and_gradient(&xp).0 - net.energy_and_gradient(&xm).0)
                    / (2.0 * h);
                assert!(
                    (numeric - grad[i]).abs() < 1e-6,
                    "{:?} component {}: {} vs {}",
                    act,
                    i,
                    numeric,
                    grad[i]
                );
            }
        }
    }
}
