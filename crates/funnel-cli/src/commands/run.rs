use crate::cli::RunArgs;
use crate::config::defaults::DefaultsConfig;
use crate::config::{FileConfig, RunConfig, build_run_config};
use crate::error::Result;
use crate::plot::PlotFile;
use crate::utils::progress::CliProgressHandler;
use funnelmd::core::io::trajectory::TrajectoryWriter;
use funnelmd::core::models::snapshot::Snapshot;
use funnelmd::engine::error::EngineError;
use funnelmd::engine::progress::ProgressReporter;
use funnelmd::render::Figure;
use funnelmd::workflows::sample::{self, SampleSummary};
use std::fs::File;
use tracing::info;

pub fn run(args: RunArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    info!("Merging configuration from file and CLI arguments...");
    let config = build_run_config(file, &args, &DefaultsConfig::default())?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Sampling {} particle(s) for {} step(s)...",
        config.ensemble.particle_count,
        config.ensemble.total_steps()
    );
    let summary = execute(&config, &reporter)?;

    println!(
        "✓ Recorded {} snapshot(s) with the {} integrator; final mean radius {:.3} nm.",
        summary.samples, summary.integrator, summary.mean_final_radius
    );
    if let Some(path) = &config.plot {
        println!("  Figure written to: {}", path.display());
    }
    if let Some(path) = &config.trajectory {
        println!("  Trajectory written to: {}", path.display());
    }
    Ok(())
}

/// Runs the sampling workflow onto the configured outputs.
pub fn execute(config: &RunConfig, reporter: &ProgressReporter) -> Result<SampleSummary> {
    // The figure path is checked before the trajectory file is truncated.
    let plot_file = config.plot.as_deref().map(PlotFile::create).transpose()?;
    let mut writer: Option<TrajectoryWriter<File>> = config
        .trajectory
        .as_deref()
        .map(TrajectoryWriter::<File>::create)
        .transpose()?;
    let on_snapshot = |snapshot: &Snapshot| -> std::result::Result<(), EngineError> {
        if let Some(w) = writer.as_mut() {
            w.write_snapshot(snapshot)?;
        }
        Ok(())
    };

    info!("Invoking the sampling workflow...");
    let summary = match plot_file {
        Some(mut sink) => sample::run(
            &config.ensemble,
            &config.potential,
            &config.sample_options,
            &mut sink,
            reporter,
            on_snapshot,
        )?,
        None => {
            let mut sink = Figure::new();
            sample::run(
                &config.ensemble,
                &config.potential,
                &config.sample_options,
                &mut sink,
                reporter,
                on_snapshot,
            )?
        }
    };

    if let Some(w) = writer.as_mut() {
        w.flush()?;
        info!(rows = w.rows_written(), "Trajectory flushed.");
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use funnelmd::core::io::trajectory::read_records;

    fn config_for(extra: &[&str]) -> RunConfig {
        let mut argv = vec!["funnel", "run", "-n", "3", "-s", "2", "-k", "20", "--seed", "4"];
        argv.extend_from_slice(extra);
        let Commands::Run(args) = Cli::parse_from(argv).command else {
            panic!("Expected 'run' subcommand");
        };
        build_run_config(FileConfig::default(), &args, &DefaultsConfig::default()).unwrap()
    }

    #[test]
    fn execute_writes_figure_and_trajectory() {
        let dir = tempfile::tempdir().unwrap();
        let plot = dir.path().join("run.svg");
        let trajectory = dir.path().join("run.csv");
        let mut config = config_for(&[
            "--plot",
            plot.to_str().unwrap(),
            "--trajectory",
            trajectory.to_str().unwrap(),
        ]);
        config.sample_options.surface = config.sample_options.surface.map(|mut s| {
            s.resolution = 16;
            s
        });

        let summary = execute(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.samples, 2);
        assert!(plot.exists());
        let records = read_records(&trajectory).unwrap();
        assert_eq!(records.len(), 6);
        assert_eq!(records[5].step, 40);
    }

    #[test]
    fn execute_without_outputs_only_samples() {
        let config = config_for(&["--no-plot"]);
        let summary = execute(&config, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.samples, 2);
        assert_eq!(summary.final_state.step, 40);
    }

    #[test]
    fn unsupported_figure_format_fails_before_sampling() {
        let config = config_for(&["--plot", "figure.png"]);
        assert!(execute(&config, &ProgressReporter::new()).is_err());
    }

    #[test]
    fn rejected_figure_leaves_existing_trajectory_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let trajectory = dir.path().join("keep.csv");
        std::fs::write(&trajectory, "sample,step\n0,250\n").unwrap();
        let config = config_for(&[
            "--plot",
            "figure.png",
            "--trajectory",
            trajectory.to_str().unwrap(),
        ]);
        assert!(execute(&config, &ProgressReporter::new()).is_err());
        assert_eq!(
            std::fs::read_to_string(&trajectory).unwrap(),
            "sample,step\n0,250\n"
        );
    }
}
