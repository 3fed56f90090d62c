use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Mingi Kang",
    version,
    about = "aimnet - energies, forces and geometry optimization with AIMNet2-style machine-learned interatomic potentials.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,

    /// Directory holding model artifacts, overriding the configured location.
    #[arg(long, global = true, value_name = "PATH")]
    pub models_dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the potential energy (eV) of a structure.
    Energy(EnergyArgs),
    /// Compute per-atom forces (eV/Å) of a structure.
    Forces(ForcesArgs),
    /// Relax a structure to a force threshold with BFGS.
    Optimize(OptimizeArgs),
    /// Inspect and configure the local model directory.
    Models(ModelsArgs),
}

/// Inputs shared by every calculation.
#[derive(Args, Debug, Clone)]
pub struct CalculationArgs {
    /// Path to the input structure in XYZ format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Net molecular charge.
    #[arg(short, long, default_value_t = 0, allow_negative_numbers = true, value_name = "INT")]
    pub charge: i32,

    /// Model alias (e.g., 'b973c'), artifact file name, or path to an artifact.
    #[arg(short, long, default_value = "b973c", value_name = "NAME_OR_PATH")]
    pub model: String,
}

#[derive(Args, Debug)]
pub struct EnergyArgs {
    #[command(flatten)]
    pub calculation: CalculationArgs,
}

#[derive(Args, Debug)]
pub struct ForcesArgs {
    #[command(flatten)]
    pub calculation: CalculationArgs,

    /// Also write the forces as CSV (index, element, fx, fy, fz).
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct OptimizeArgs {
    #[command(flatten)]
    pub calculation: CalculationArgs,

    /// Path for the relaxed structure in XYZ format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Optimizer configuration file in TOML format.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the force convergence threshold (eV/Å).
    #[arg(long, value_name = "FLOAT")]
    pub fmax: Option<f64>,

    /// Override the largest per-atom displacement per step (Å).
    #[arg(long, value_name = "FLOAT")]
    pub max_step: Option<f64>,

    /// Override the maximum number of optimizer steps.
    #[arg(long, value_name = "INT")]
    pub max_steps: Option<usize>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S optimizer.fmax=0.01
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommands,
}

/// Available commands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommands {
    /// List known model aliases and whether their artifacts are installed.
    List,
    /// Show the absolute path to the local model directory.
    Path,
    /// Set a custom absolute path for the local model directory.
    SetPath {
        /// The new directory to look up model artifacts in.
        #[arg(required = true)]
        path: PathBuf,
    },
    /// Reset the model path to its default, OS-specific location.
    ResetPath,
}
