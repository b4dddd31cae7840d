use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::RunConfig;
use crate::cli::RunArgs;
use crate::error::{CliError, Result};
use funnelmd::core::forcefield::funnel::FunnelPotential;
use funnelmd::core::grid::GridBounds;
use funnelmd::engine::config::{EnsembleConfigBuilder, RadiusTolerance};
use funnelmd::render::MarkerStyle;
use funnelmd::workflows::sample::SampleOptions;
use funnelmd::workflows::surface::SurfacePlot;
use tracing::debug;

/// Merges the configuration layers for `run`.
///
/// Precedence, highest first: dedicated CLI flags, `--set` values, the
/// config file, [`DefaultsConfig`] and the library defaults.
pub fn build_run_config(
    mut file: FileConfig,
    args: &RunArgs,
    defaults: &DefaultsConfig,
) -> Result<RunConfig> {
    file.apply_set_values(&args.set_values)?;

    let ensemble = file.ensemble.take().unwrap_or_default();
    let init = file.initialization.take().unwrap_or_default();
    let potential = file.potential.take().unwrap_or_default();
    let output = file.output.take().unwrap_or_default();

    let mut builder = EnsembleConfigBuilder::new();
    if let Some(n) = args.particles.or(ensemble.particles) {
        builder = builder.particle_count(n);
    }
    if let Some(mass) = args.mass.or(ensemble.mass) {
        builder = builder.mass(mass);
    }
    if let Some(t) = args.temperature.or(ensemble.temperature) {
        builder = builder.temperature(t);
    }
    if let Some(gamma) = args.friction.or(ensemble.friction) {
        builder = builder.friction(gamma);
    }
    if let Some(fs) = args.timestep_fs.or(ensemble.timestep_fs) {
        builder = builder.timestep_fs(fs);
    }
    if let Some(k) = args.steps_per_sample.or(ensemble.steps_per_sample) {
        builder = builder.steps_per_sample(k);
    }
    if let Some(s) = args.samples.or(ensemble.samples) {
        builder = builder.num_samples(s);
    }
    if let Some(kind) = args.integrator.map(Into::into).or(ensemble.integrator) {
        builder = builder.integrator(kind);
    }
    if let Some(seed) = args.seed.or(ensemble.seed) {
        builder = builder.seed(seed);
    }
    if let Some(r) = init.radius {
        builder = builder.initial_radius(r);
    }
    if let Some(h) = init.box_half_width {
        builder = builder.box_half_width(h);
    }
    if init.relative_tolerance.is_some() || init.absolute_tolerance.is_some() {
        let base = RadiusTolerance::default();
        builder = builder.radius_tolerance(RadiusTolerance {
            relative: init.relative_tolerance.unwrap_or(base.relative),
            absolute: init.absolute_tolerance.unwrap_or(base.absolute),
        });
    }
    if let Some(rounds) = init.max_rounds {
        builder = builder.max_init_rounds(rounds);
    }
    let ensemble = builder.build()?;

    let stiffness = potential
        .restraint_stiffness
        .unwrap_or(FunnelPotential::default().restraint_stiffness);
    if !(stiffness > 0.0) || !stiffness.is_finite() {
        return Err(CliError::Config(format!(
            "`potential.restraint-stiffness` must be positive, got {}",
            stiffness
        )));
    }

    let half_width = output
        .surface_half_width
        .unwrap_or(defaults.surface_half_width);
    let surface = SurfacePlot {
        bounds: GridBounds::symmetric(half_width),
        resolution: output.resolution.unwrap_or(defaults.resolution),
        levels: output.levels.unwrap_or(defaults.levels),
        colorbar: true,
    };
    let marker = MarkerStyle {
        size: output.marker_size.unwrap_or(defaults.marker.size),
        alpha: output.marker_alpha.unwrap_or(defaults.marker.alpha),
        color: defaults.marker.color,
    };

    let plot = if args.no_plot {
        None
    } else {
        Some(
            args.plot
                .clone()
                .or(output.plot)
                .unwrap_or_else(|| defaults.plot.clone()),
        )
    };
    let trajectory = args.trajectory.clone().or(output.trajectory);

    let config = RunConfig {
        ensemble,
        potential: FunnelPotential::with_restraint_stiffness(stiffness),
        sample_options: SampleOptions {
            surface: plot.as_ref().map(|_| surface),
            marker,
            present_every: plot.as_ref().and(output.present_every),
        },
        plot,
        trajectory,
    };
    debug!("Resolved run configuration: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use funnelmd::engine::config::IntegratorKind;
    use std::path::PathBuf;

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut argv = vec!["funnel", "run"];
        argv.extend_from_slice(extra);
        match Cli::parse_from(argv).command {
            Commands::Run(args) => args,
            other => panic!("Expected 'run' subcommand, got {other:?}"),
        }
    }

    #[test]
    fn empty_layers_give_reference_defaults() {
        let config =
            build_run_config(FileConfig::default(), &run_args(&[]), &DefaultsConfig::default())
                .unwrap();
        assert_eq!(config.ensemble.particle_count, 10);
        assert_eq!(config.ensemble.num_samples, 1000);
        assert_eq!(config.potential, FunnelPotential::new());
        assert_eq!(config.plot, Some(PathBuf::from("funnel.svg")));
        assert_eq!(config.trajectory, None);
        let surface = config.sample_options.surface.unwrap();
        assert_eq!(surface.bounds, GridBounds::symmetric(12.0));
        assert_eq!(surface.levels, 8);
    }

    #[test]
    fn cli_flags_beat_set_values_which_beat_the_file() {
        let file = FileConfig::from_toml(
            "[ensemble]\nparticles = 3\ntemperature = 100.0\nfriction = 5.0\n",
        )
        .unwrap();
        let args = run_args(&[
            "-n",
            "7",
            "-S",
            "ensemble.particles=5",
            "-S",
            "ensemble.temperature=200",
        ]);
        let config = build_run_config(file, &args, &DefaultsConfig::default()).unwrap();
        assert_eq!(config.ensemble.particle_count, 7);
        assert_eq!(config.ensemble.temperature, 200.0);
        assert_eq!(config.ensemble.friction, 5.0);
    }

    #[test]
    fn tolerance_keys_merge_with_library_defaults() {
        let file =
            FileConfig::from_toml("[initialization]\nabsolute-tolerance = 1e-4\n").unwrap();
        let config =
            build_run_config(file, &run_args(&[]), &DefaultsConfig::default()).unwrap();
        assert_eq!(config.ensemble.radius_tolerance.absolute, 1e-4);
        assert_eq!(config.ensemble.radius_tolerance.relative, 1e-5);
    }

    #[test]
    fn no_plot_disables_surface_and_figure() {
        let args = run_args(&["--no-plot", "--trajectory", "traj.csv", "--integrator", "verlet"]);
        let config =
            build_run_config(FileConfig::default(), &args, &DefaultsConfig::default()).unwrap();
        assert_eq!(config.plot, None);
        assert!(config.sample_options.surface.is_none());
        assert_eq!(config.trajectory, Some(PathBuf::from("traj.csv")));
        assert_eq!(config.ensemble.integrator, IntegratorKind::Verlet);
    }

    #[test]
    fn present_cadence_follows_the_figure() {
        let args = run_args(&["-S", "output.present-every=25"]);
        let config =
            build_run_config(FileConfig::default(), &args, &DefaultsConfig::default()).unwrap();
        assert_eq!(config.sample_options.present_every, Some(25));

        let args = run_args(&["--no-plot", "-S", "output.present-every=25"]);
        let config =
            build_run_config(FileConfig::default(), &args, &DefaultsConfig::default()).unwrap();
        assert_eq!(config.sample_options.present_every, None);
    }

    #[test]
    fn invalid_ensemble_values_surface_as_config_errors() {
        let args = run_args(&["--temperature=-1"]);
        let err = build_run_config(FileConfig::default(), &args, &DefaultsConfig::default())
            .unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn non_positive_stiffness_is_rejected() {
        let file = FileConfig::from_toml("[potential]\nrestraint-stiffness = 0.0\n").unwrap();
        let err =
            build_run_config(file, &run_args(&[]), &DefaultsConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::Config(msg) if msg.contains("restraint-stiffness")));
    }
}
