use crate::cli::OptimizeArgs;
use crate::error::{CliError, Result};
use aimnet2rs::engine::config::OptimizerConfig;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialOptimizerSection {
    fmax: Option<f64>,
    max_step: Option<f64>,
    max_steps: Option<usize>,
    initial_curvature: Option<f64>,
}

/// Optimizer settings as read from a TOML file, before CLI overrides.
///
/// ```toml
/// [optimizer]
/// fmax = 0.01
/// max-step = 0.2
/// max-steps = 1000
/// initial-curvature = 70.0
/// ```
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct PartialOptimizeConfig {
    optimizer: Option<PartialOptimizerSection>,
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value))
    })
}

impl PartialOptimizeConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    fn from_toml_str(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies file values, then `--set` values, then dedicated flags, over
    /// the library defaults.
    pub fn merge_with_cli(mut self, args: &OptimizeArgs) -> Result<OptimizerConfig> {
        self.apply_set_values(&args.set_values)?;
        let section = self.optimizer.take().unwrap_or_default();

        let mut builder = OptimizerConfig::builder();
        if let Some(fmax) = args.fmax.or(section.fmax) {
            builder = builder.fmax(fmax);
        }
        if let Some(max_step) = args.max_step.or(section.max_step) {
            builder = builder.max_step(max_step);
        }
        if let Some(max_steps) = args.max_steps.or(section.max_steps) {
            builder = builder.max_steps(max_steps);
        }
        if let Some(curvature) = section.initial_curvature {
            builder = builder.initial_curvature(curvature);
        }
        builder
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let section = self.optimizer.get_or_insert_with(Default::default);
            match key {
                "optimizer.fmax" => section.fmax = Some(parse_value(key, value_str, "float")?),
                "optimizer.max-step" => {
                    section.max_step = Some(parse_value(key, value_str, "float")?)
                }
                "optimizer.max-steps" => {
                    section.max_steps = Some(parse_value(key, value_str, "integer")?)
                }
                "optimizer.initial-curvature" => {
                    section.initial_curvature = Some(parse_value(key, value_str, "float")?)
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}
