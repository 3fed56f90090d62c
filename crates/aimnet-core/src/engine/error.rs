use thiserror::Error;

use super::config::ConfigError;
use crate::core::io::xyz::XyzError;
use crate::core::models::element::Element;
use crate::core::potential::model::NetCharge;
use std::collections::BTreeSet;
use std::path::PathBuf;

pub use crate::core::potential::model::EvalError;

fn join_symbols(elements: &BTreeSet<Element>) -> String {
    elements
        .iter()
        .map(|e| e.symbol())
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unsupported element(s) for model family '{domain}': {}", join_symbols(elements))]
    UnsupportedElement {
        domain: &'static str,
        elements: BTreeSet<Element>,
    },

    #[error("Unsupported net charge {charge} for model family '{domain}' (allowed: {allowed:?})")]
    UnsupportedCharge {
        domain: &'static str,
        charge: NetCharge,
        allowed: Vec<NetCharge>,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown model alias '{name}' (known aliases: {})", known.join(", "))]
    AliasNotFound { name: String, known: Vec<String> },

    #[error("Model file not found: {}", path.display())]
    ModelNotFound { path: PathBuf },

    #[error("Failed to load model from '{}': {reason}", path.display())]
    ModelLoadError { path: PathBuf, reason: String },
}

#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("Evaluation failed at optimization step {step}: {source}")]
    Evaluation {
        step: usize,
        #[source]
        source: EvalError,
    },

    #[error("Invalid optimizer configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

impl OptimizerError {
    /// The evaluator error that stopped the run, if any.
    pub fn eval_error(&self) -> Option<&EvalError> {
        match self {
            OptimizerError::Evaluation { source, .. } => Some(source),
            OptimizerError::InvalidConfig(_) => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Structure error: {0}")]
    Structure(#[from] XyzError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Evaluation failed: {0}")]
    Evaluation(#[from] EvalError),

    #[error("Optimization failed: {0}")]
    Optimizer(#[from] OptimizerError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_element_message_lists_symbols_in_order() {
        let err = ValidationError::UnsupportedElement {
            domain: "aimnet2",
            elements: [Element::from_symbol("Fe").unwrap(), Element::from_symbol("Na").unwrap()]
                .into_iter()
                .collect(),
        };
        assert_eq!(
            err.to_string(),
            "Unsupported element(s) for model family 'aimnet2': Na, Fe"
        );
    }

    #[test]
    fn optimizer_error_exposes_wrapped_eval_error() {
        let source = EvalError::GeometryDegenerate {
            reason: "atoms 1 and 2 coincide".to_string(),
        };
        let err = OptimizerError::Evaluation {
            step: 3,
            source: source.clone(),
        };
        assert_eq!(err.eval_error(), Some(&source));
        assert!(err.to_string().contains("step 3"));
    }
}
