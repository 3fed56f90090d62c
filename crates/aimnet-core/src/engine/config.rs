use thiserror::Error;

pub const DEFAULT_FMAX: f64 = 0.05;
pub const DEFAULT_MAX_STEP: f64 = 0.2;
pub const DEFAULT_MAX_STEPS: usize = 500;
pub const DEFAULT_INITIAL_CURVATURE: f64 = 70.0;
pub const DEFAULT_UPDATE_EPSILON: f64 = 1e-10;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Parameters of a BFGS geometry relaxation.
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizerConfig {
    /// Convergence threshold on the largest per-atom force (eV/Å).
    pub fmax: f64,
    /// Largest displacement of any single atom in one step (Å).
    pub max_step: f64,
    pub max_steps: usize,
    /// The starting inverse Hessian is `I / initial_curvature` (eV/Å²).
    pub initial_curvature: f64,
    /// Curvature updates are skipped when `sᵀy` does not exceed this.
    pub update_epsilon: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            fmax: DEFAULT_FMAX,
            max_step: DEFAULT_MAX_STEP,
            max_steps: DEFAULT_MAX_STEPS,
            initial_curvature: DEFAULT_INITIAL_CURVATURE,
            update_epsilon: DEFAULT_UPDATE_EPSILON,
        }
    }
}

impl OptimizerConfig {
    pub fn builder() -> OptimizerConfigBuilder {
        OptimizerConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("fmax", self.fmax)?;
        positive("max_step", self.max_step)?;
        positive("initial_curvature", self.initial_curvature)?;
        if !(self.update_epsilon.is_finite() && self.update_epsilon >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "update_epsilon",
                reason: format!("must be finite and non-negative, got {}", self.update_epsilon),
            });
        }
        Ok(())
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be finite and positive, got {}", value),
        })
    }
}

#[derive(Default)]
pub struct OptimizerConfigBuilder {
    fmax: Option<f64>,
    max_step: Option<f64>,
    max_steps: Option<usize>,
    initial_curvature: Option<f64>,
    update_epsilon: Option<f64>,
}

impl OptimizerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fmax(mut self, fmax: f64) -> Self {
        self.fmax = Some(fmax);
        self
    }
    pub fn max_step(mut self, max_step: f64) -> Self {
        self.max_step = Some(max_step);
        self
    }
    pub fn max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }
    pub fn initial_curvature(mut self, curvature: f64) -> Self {
        self.initial_curvature = Some(curvature);
        self
    }
    pub fn update_epsilon(mut self, epsilon: f64) -> Self {
        self.update_epsilon = Some(epsilon);
        self
    }

    pub fn build(self) -> Result<OptimizerConfig, ConfigError> {
        let config = OptimizerConfig {
            fmax: self.fmax.unwrap_or(DEFAULT_FMAX),
            max_step: self.max_step.unwrap_or(DEFAULT_MAX_STEP),
            max_steps: self.max_steps.unwrap_or(DEFAULT_MAX_STEPS),
            initial_curvature: self.initial_curvature.unwrap_or(DEFAULT_INITIAL_CURVATURE),
            update_epsilon: self.update_epsilon.unwrap_or(DEFAULT_UPDATE_EPSILON),
        };
        config.validate()?;
        Ok(config)
    }
}
