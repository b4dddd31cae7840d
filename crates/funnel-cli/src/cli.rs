use clap::{Args, Parser, Subcommand, ValueEnum};
use funnelmd::core::grid::GridBounds;
use funnelmd::engine::config::IntegratorKind;
use std::path::PathBuf;

use crate::utils::parser;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Funnel-MD Developers",
    version,
    about = "Funnel-MD CLI - Langevin sampling of a two-dimensional funnel energy landscape, with trajectory plots over the energy contour.",
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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sample the funnel landscape and plot every snapshot over the energy contour.
    Run(RunArgs),
    /// Plot only the energy contour of the funnel landscape.
    Surface(SurfaceArgs),
    /// Print the force-field expression and its symbolic derivatives.
    Expression(ExpressionArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegratorArg {
    Langevin,
    Brownian,
    Verlet,
}

impl From<IntegratorArg> for IntegratorKind {
    fn from(arg: IntegratorArg) -> Self {
        match arg {
            IntegratorArg::Langevin => IntegratorKind::Langevin,
            IntegratorArg::Brownian => IntegratorKind::Brownian,
            IntegratorArg::Verlet => IntegratorKind::Verlet,
        }
    }
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Ensemble Overrides ---
    /// Number of particles in the ensemble.
    #[arg(short = 'n', long, value_name = "INT")]
    pub particles: Option<usize>,

    /// Particle mass in amu.
    #[arg(long, value_name = "FLOAT")]
    pub mass: Option<f64>,

    /// Bath temperature in K.
    #[arg(short = 't', long, value_name = "FLOAT")]
    pub temperature: Option<f64>,

    /// Friction coefficient in 1/ps.
    #[arg(long, value_name = "FLOAT")]
    pub friction: Option<f64>,

    /// Integration timestep in fs.
    #[arg(long, value_name = "FLOAT")]
    pub timestep_fs: Option<f64>,

    /// Integrator steps between recorded snapshots.
    #[arg(short = 'k', long, value_name = "INT")]
    pub steps_per_sample: Option<u64>,

    /// Number of snapshots to record.
    #[arg(short = 's', long, value_name = "INT")]
    pub samples: Option<usize>,

    /// Seed for the random stream; omit for a non-reproducible run.
    #[arg(long, value_name = "U64")]
    pub seed: Option<u64>,

    /// Time integrator.
    #[arg(long, value_enum)]
    pub integrator: Option<IntegratorArg>,

    // --- Output Overrides ---
    /// Path of the SVG figure to write.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub plot: Option<PathBuf>,

    /// Skip the figure entirely.
    #[arg(long, conflicts_with = "plot")]
    pub no_plot: bool,

    /// Path of a CSV file receiving every snapshot.
    #[arg(long, value_name = "PATH")]
    pub trajectory: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S ensemble.temperature=300
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `surface` subcommand.
#[derive(Args, Debug)]
pub struct SurfaceArgs {
    /// Path of the SVG figure to write.
    #[arg(short = 'o', long, value_name = "PATH", default_value = "surface.svg")]
    pub plot: PathBuf,

    /// Grid samples along the longer side.
    #[arg(short, long, value_name = "INT")]
    pub resolution: Option<usize>,

    /// Number of filled contour bands.
    #[arg(short, long, value_name = "INT")]
    pub levels: Option<usize>,

    /// Plot window as MIN_X,MAX_X,MIN_Y,MAX_Y in nm.
    #[arg(long, value_name = "BOUNDS", value_parser = parser::parse_bounds)]
    pub bounds: Option<GridBounds>,
}

/// Arguments for the `expression` subcommand.
#[derive(Args, Debug)]
pub struct ExpressionArgs {
    /// Stiffness of the z restraint in kJ/mol/nm².
    #[arg(long, value_name = "FLOAT")]
    pub restraint_stiffness: Option<f64>,

    /// Also evaluate energy and force at X,Y,Z (nm).
    #[arg(long, value_name = "X,Y,Z", value_parser = parser::parse_point)]
    pub at: Option<[f64; 3]>,
}
