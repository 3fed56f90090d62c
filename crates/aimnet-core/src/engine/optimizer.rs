use super::calculator::Calculator;
use super::config::OptimizerConfig;
use super::error::{EvalError, OptimizerError};
use super::progress::{Progress, ProgressReporter};
use crate::core::models::configuration::AtomicConfiguration;
use crate::core::potential::model::Prediction;
use nalgebra::{DMatrix, DVector, Vector3};
use tracing::{debug, info, instrument, warn};

/// Lifecycle of one optimizer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizerStatus {
    Initialized,
    Iterating,
    Converged,
    MaxStepsReached,
    Failed,
}

impl OptimizerStatus {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            OptimizerStatus::Converged | OptimizerStatus::MaxStepsReached | OptimizerStatus::Failed
        )
    }
}

/// Working state of a BFGS run. Positions and forces are flattened `3N` vectors.
#[derive(Debug, Clone)]
pub struct OptimizerState {
    pub positions: DVector<f64>,
    pub energy: f64,
    pub forces: DVector<f64>,
    pub inverse_hessian: DMatrix<f64>,
    pub step: usize,
    pub status: OptimizerStatus,
}

impl OptimizerState {
    fn new(positions: DVector<f64>, prediction: &Prediction, initial_curvature: f64) -> Self {
        let n = positions.len();
        Self {
            positions,
            energy: prediction.energy,
            forces: flatten(&prediction.forces),
            inverse_hessian: DMatrix::identity(n, n) / initial_curvature,
            step: 0,
            status: OptimizerStatus::Initialized,
        }
    }

    /// Largest per-atom force magnitude.
    pub fn fmax(&self) -> f64 {
        max_atom_norm(&self.forces)
    }
}

/// Outcome of a successful run (converged or out of steps).
#[derive(Debug, Clone)]
pub struct OptimizationResult {
    pub configuration: AtomicConfiguration,
    pub energy: f64,
    pub forces: Vec<Vector3<f64>>,
    pub steps: usize,
    pub status: OptimizerStatus,
}

impl OptimizationResult {
    pub fn converged(&self) -> bool {
        self.status == OptimizerStatus::Converged
    }

    pub fn fmax(&self) -> f64 {
        self.forces.iter().map(|f| f.norm()).fold(0.0, f64::max)
    }
}

fn flatten(forces: &[Vector3<f64>]) -> DVector<f64> {
    DVector::from_iterator(forces.len() * 3, forces.iter().flat_map(|f| f.iter().copied()))
}

fn max_atom_norm(flat: &DVector<f64>) -> f64 {
    flat.as_slice()
        .chunks_exact(3)
        .map(|c| (c[0] * c[0] + c[1] * c[1] + c[2] * c[2]).sqrt())
        .fold(0.0, f64::max)
}

/// Quasi-Newton relaxation with an inverse-Hessian BFGS update.
///
/// Every candidate step is accepted; there is no line search.
pub struct Bfgs<'a> {
    calculator: &'a Calculator,
    config: &'a OptimizerConfig,
}

impl<'a> Bfgs<'a> {
    pub fn new(calculator: &'a Calculator, config: &'a OptimizerConfig) -> Self {
        Self { calculator, config }
    }

    /// Relaxes `configuration` until `fmax` drops below the threshold or the
    /// step budget is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`OptimizerError::Evaluation`] with the failing step (0 for the
    /// initial evaluation) if the calculator fails, and
    /// [`OptimizerError::InvalidConfig`] for unusable parameters. No partial
    /// geometry is returned on failure.
    #[instrument(skip_all, name = "bfgs", fields(atoms = configuration.len()))]
    pub fn run(
        &self,
        mut configuration: AtomicConfiguration,
        reporter: &ProgressReporter,
    ) -> Result<OptimizationResult, OptimizerError> {
        self.config.validate()?;

        reporter.report(Progress::PhaseStart {
            name: "Geometry Optimization",
        });
        let prediction = self
            .calculator
            .evaluate(&configuration)
            .map_err(|source| OptimizerError::Evaluation { step: 0, source })?;
        let mut state = OptimizerState::new(
            configuration.flat_positions(),
            &prediction,
            self.config.initial_curvature,
        );
        info!(
            energy = state.energy,
            fmax = state.fmax(),
            "Starting BFGS relaxation."
        );

        reporter.report(Progress::TaskStart {
            total_steps: self.config.max_steps as u64,
        });
        let outcome = self.iterate(&mut configuration, &mut state, reporter);
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        if let Err(err) = outcome {
            state.status = OptimizerStatus::Failed;
            warn!(step = state.step + 1, error = %err, "BFGS relaxation failed.");
            return Err(err);
        }

        info!(
            steps = state.step,
            energy = state.energy,
            fmax = state.fmax(),
            status = ?state.status,
            "BFGS relaxation finished."
        );
        Ok(OptimizationResult {
            configuration,
            energy: state.energy,
            forces: state
                .forces
                .as_slice()
                .chunks_exact(3)
                .map(Vector3::from_column_slice)
                .collect(),
            steps: state.step,
            status: state.status,
        })
    }

    fn iterate(
        &self,
        configuration: &mut AtomicConfiguration,
        state: &mut OptimizerState,
        reporter: &ProgressReporter,
    ) -> Result<(), OptimizerError> {
        loop {
            if state.fmax() <= self.config.fmax {
                state.status = OptimizerStatus::Converged;
                return Ok(());
            }
            if state.step >= self.config.max_steps {
                state.status = OptimizerStatus::MaxStepsReached;
                return Ok(());
            }
            state.status = OptimizerStatus::Iterating;
            self.step(configuration, state)?;
            reporter.report(Progress::TaskIncrement);
            reporter.report(Progress::OptimizerStep {
                step: state.step,
                energy: state.energy,
                fmax: state.fmax(),
            });
        }
    }

    fn step(
        &self,
        configuration: &mut AtomicConfiguration,
        state: &mut OptimizerState,
    ) -> Result<(), OptimizerError> {
        let next_step = state.step + 1;

        let mut displacement = &state.inverse_hessian * &state.forces;
        let longest = max_atom_norm(&displacement);
        if longest > self.config.max_step {
            displacement *= self.config.max_step / longest;
        }

        let candidate = &state.positions + &displacement;
        let to_eval_error = |source| OptimizerError::Evaluation {
            step: next_step,
            source,
        };
        configuration.set_flat_positions(&candidate).map_err(|e| {
            to_eval_error(EvalError::GeometryDegenerate {
                reason: e.to_string(),
            })
        })?;
        let prediction = self.calculator.evaluate(configuration).map_err(to_eval_error)?;
        let new_forces = flatten(&prediction.forces);

        let y = &state.forces - &new_forces;
        self.update_inverse_hessian(&mut state.inverse_hessian, &displacement, &y);

        state.positions = candidate;
        state.forces = new_forces;
        state.energy = prediction.energy;
        state.step = next_step;
        debug!(
            step = state.step,
            energy = state.energy,
            fmax = state.fmax(),
            "BFGS step."
        );
        Ok(())
    }

    /// `H ← (I − ρ s yᵀ) H (I − ρ y sᵀ) + ρ s sᵀ` with `ρ = 1 / sᵀy`.
    ///
    /// Skipped when the curvature condition fails or the result is not finite.
    fn update_inverse_hessian(&self, h: &mut DMatrix<f64>, s: &DVector<f64>, y: &DVector<f64>) {
        let sy = s.dot(y);
        if !(sy > self.config.update_epsilon) {
            debug!(sy, "Skipping BFGS update: curvature condition not met.");
            return;
        }
        let rho = 1.0 / sy;
        let n = s.len();
        let identity = DMatrix::<f64>::identity(n, n);
        let left = &identity - (s * y.transpose()) * rho;
        let right = &identity - (y * s.transpose()) * rho;
        let updated = &left * &*h * &right + (s * s.transpose()) * rho;
        if updated.iter().all(|v| v.is_finite()) {
            *h = updated;
        } else {
            debug!("Skipping BFGS update: non-finite inverse Hessian.");
        }
    }
}
