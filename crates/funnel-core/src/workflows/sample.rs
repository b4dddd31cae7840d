use tracing::{info, instrument, warn};

use super::surface::{self, SurfacePlot};
use crate::core::forcefield::ForceField;
use crate::core::models::snapshot::Snapshot;
use crate::engine::config::EnsembleConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::sampler::Sampler;
use crate::engine::simulation::Simulation;
use crate::engine::state::State;
use crate::render::{MarkerStyle, RenderSink, ScatterRequest};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleOptions {
    /// Surface drawn before any trajectory layer; `None` skips it.
    pub surface: Option<SurfacePlot>,
    pub marker: MarkerStyle,
    /// Present the sink after every `n`-th snapshot; `None` renders only
    /// once, at the final flush.
    pub present_every: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct SampleSummary {
    pub samples: usize,
    pub integrator: &'static str,
    /// Largest deviation of an initial in-plane radius from the target.
    pub initial_radius_error: f64,
    pub final_state: State,
    pub mean_final_radius: f64,
}

fn mean_radius(snapshot: &Snapshot) -> f64 {
    if snapshot.particle_count() == 0 {
        return 0.0;
    }
    let total: f64 = snapshot
        .xy
        .rows()
        .into_iter()
        .map(|row| row[0].hypot(row[1]))
        .sum();
    total / snapshot.particle_count() as f64
}

/// Runs a full sampling experiment: draws the energy surface, places the
/// ensemble on the initial ring, and adds one scatter layer per snapshot.
///
/// `on_snapshot` sees every snapshot after it is drawn, e.g. to stream a
/// trajectory file. The sink is flushed once all samples are in.
#[instrument(skip_all, name = "sample_workflow")]
pub fn run<S, F>(
    config: &EnsembleConfig,
    force_field: &dyn ForceField,
    options: &SampleOptions,
    sink: &mut S,
    reporter: &ProgressReporter,
    mut on_snapshot: F,
) -> Result<SampleSummary, EngineError>
where
    S: RenderSink + ?Sized,
    F: FnMut(&Snapshot) -> Result<(), EngineError>,
{
    // === Phase 1: Energy surface ===
    if let Some(surface_options) = &options.surface {
        reporter.report(Progress::PhaseStart { name: "Surface" });
        surface::draw(sink, surface_options)?;
        reporter.report(Progress::PhaseFinish);
    }

    // === Phase 2: Setup and initial conditions ===
    reporter.report(Progress::PhaseStart {
        name: "Initialization",
    });
    info!(
        particles = config.particle_count,
        temperature = config.temperature,
        friction = config.friction,
        timestep_ps = config.timestep,
        integrator = config.integrator.name(),
        "Setting up simulation."
    );
    if config.seed.is_none() && config.integrator.is_stochastic() {
        warn!("No seed given; this run will not be reproducible.");
    }
    let simulation = Simulation::builder(config.clone())
        .force_field(force_field)
        .build()?;
    let integrator = simulation.integrator_name();
    let mut sampler = Sampler::new(simulation);
    sampler.initialize()?;
    let initial_radius_error = sampler
        .simulation()
        .particles()
        .iter()
        .map(|p| (p.radius() - config.initial_radius).abs())
        .fold(0.0, f64::max);
    reporter.report(Progress::PhaseFinish);

    // === Phase 3: Sampling ===
    reporter.report(Progress::PhaseStart { name: "Sampling" });
    reporter.report(Progress::TaskStart {
        total: config.total_steps(),
    });
    let mut samples = 0usize;
    let mut mean_final_radius = 0.0;
    for snapshot in sampler.by_ref() {
        let snapshot = snapshot?;
        sink.scatter(&ScatterRequest::from_snapshot(&snapshot, options.marker))?;
        on_snapshot(&snapshot)?;

        mean_final_radius = mean_radius(&snapshot);
        samples += 1;
        if options.present_every.is_some_and(|n| n > 0 && samples % n == 0) {
            sink.present()?;
        }
        reporter.report(Progress::TaskIncrement {
            amount: config.steps_per_sample,
        });
        reporter.report(Progress::SampleRecorded {
            sample: snapshot.sample,
            mean_radius: mean_final_radius,
        });
    }
    reporter.report(Progress::TaskFinish);
    sink.flush()?;
    reporter.report(Progress::PhaseFinish);

    let final_state = sampler.simulation().state();
    info!(
        samples,
        steps = final_state.step,
        time_ps = final_state.time_ps,
        mean_final_radius,
        "Sampling finished."
    );

    Ok(SampleSummary {
        samples,
        integrator,
        initial_radius_error,
        final_state,
        mean_final_radius,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::funnel::FunnelPotential;
    use crate::engine::config::IntegratorKind;
    use crate::render::{Figure, Layer};
    use std::sync::Mutex;

    fn config() -> EnsembleConfig {
        EnsembleConfig::builder()
            .particle_count(5)
            .steps_per_sample(50)
            .num_samples(3)
            .seed(17)
            .build()
            .unwrap()
    }

    #[test]
    fn run_draws_surface_then_one_scatter_per_sample() {
        let mut figure = Figure::new();
        let options = SampleOptions {
            surface: Some(SurfacePlot {
                resolution: 30,
                ..SurfacePlot::default()
            }),
            ..SampleOptions::default()
        };
        let mut seen = Vec::new();
        let summary = run(
            &config(),
            &FunnelPotential::new(),
            &options,
            &mut figure,
            &ProgressReporter::new(),
            |snap| {
                seen.push(snap.sample);
                Ok(())
            },
        )
        .unwrap();

        assert_eq!(summary.samples, 3);
        assert_eq!(summary.integrator, "langevin");
        assert_eq!(summary.final_state.step, 150);
        assert!(summary.initial_radius_error < 1e-3);
        assert_eq!(seen, vec![0, 1, 2]);
        assert!(figure.is_flushed());
        assert_eq!(figure.layers().len(), 4);
        assert!(matches!(figure.layers()[0], Layer::Contour(_)));
        for (i, scatter) in figure.scatters().enumerate() {
            assert_eq!(scatter.sample, i);
            assert_eq!(scatter.points.dim(), (5, 2));
        }
    }

    #[test]
    fn sink_is_presented_at_the_requested_cadence() {
        let mut every_sample = Figure::new();
        let options = SampleOptions {
            present_every: Some(1),
            ..SampleOptions::default()
        };
        run(
            &config(),
            &FunnelPotential::new(),
            &options,
            &mut every_sample,
            &ProgressReporter::new(),
            |_| Ok(()),
        )
        .unwrap();
        assert_eq!(every_sample.presentations(), 3);
        assert!(every_sample.is_flushed());

        let mut final_only = Figure::new();
        run(
            &config(),
            &FunnelPotential::new(),
            &SampleOptions::default(),
            &mut final_only,
            &ProgressReporter::new(),
            |_| Ok(()),
        )
        .unwrap();
        assert_eq!(final_only.presentations(), 0);
    }

    #[test]
    fn progress_counts_every_step() {
        let steps = Mutex::new(0u64);
        let total = Mutex::new(0u64);
        let reporter = ProgressReporter::with_callback(Box::new(|event| match event {
            Progress::TaskStart { total: t } => *total.lock().unwrap() = t,
            Progress::TaskIncrement { amount } => *steps.lock().unwrap() += amount,
            _ => {}
        }));
        let mut figure = Figure::new();
        run(
            &config(),
            &FunnelPotential::new(),
            &SampleOptions::default(),
            &mut figure,
            &reporter,
            |_| Ok(()),
        )
        .unwrap();
        drop(reporter);
        assert_eq!(*total.lock().unwrap(), 150);
        assert_eq!(*steps.lock().unwrap(), 150);
        assert_eq!(figure.contours().count(), 0);
    }

    #[test]
    fn callback_error_aborts_the_run() {
        let mut figure = Figure::new();
        let err = run(
            &config(),
            &FunnelPotential::new(),
            &SampleOptions::default(),
            &mut figure,
            &ProgressReporter::new(),
            |snap| {
                if snap.sample == 1 {
                    Err(EngineError::Internal("stop".to_string()))
                } else {
                    Ok(())
                }
            },
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Internal(_)));
        assert!(!figure.is_flushed());
        assert_eq!(figure.scatters().count(), 2);
    }

    #[test]
    fn verlet_runs_are_identical_for_equal_seeds() {
        let run_once = || {
            let config = EnsembleConfig::builder()
                .particle_count(3)
                .steps_per_sample(20)
                .num_samples(2)
                .integrator(IntegratorKind::Verlet)
                .seed(5)
                .build()
                .unwrap();
            let mut figure = Figure::new();
            run(
                &config,
                &FunnelPotential::new(),
                &SampleOptions::default(),
                &mut figure,
                &ProgressReporter::new(),
                |_| Ok(()),
            )
            .unwrap();
            figure
        };
        assert_eq!(run_once(), run_once());
    }
}
