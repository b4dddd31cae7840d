use crate::cli::SurfaceArgs;
use crate::config::defaults::DefaultsConfig;
use crate::error::Result;
use crate::plot::PlotFile;
use funnelmd::core::grid::{Grid, GridBounds};
use funnelmd::render::RenderSink;
use funnelmd::workflows::surface;
use tracing::info;

pub fn run(args: SurfaceArgs) -> Result<()> {
    let grid = execute(&args)?;
    let (lo, hi) = grid.value_range().unwrap_or((f64::NAN, f64::NAN));
    println!(
        "✓ Energy surface ({}×{} grid, E in [{:.3}, {:.3}] kJ/mol) written to: {}",
        grid.xs.len(),
        grid.ys.len(),
        lo,
        hi,
        args.plot.display()
    );
    Ok(())
}

pub fn execute(args: &SurfaceArgs) -> Result<Grid> {
    let defaults = DefaultsConfig::default();
    let bounds = args
        .bounds
        .unwrap_or_else(|| GridBounds::symmetric(defaults.surface_half_width));
    let resolution = args.resolution.unwrap_or(defaults.resolution);
    let levels = args.levels.unwrap_or(defaults.levels);

    let mut sink = PlotFile::create(&args.plot)?;
    info!(?bounds, resolution, levels, "Plotting energy surface.");
    let grid = surface::plot(&mut sink, bounds, resolution, levels)?;
    sink.flush()?;
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn surface_command_writes_requested_grid() {
        let dir = tempfile::tempdir().unwrap();
        let plot = dir.path().join("surface.svg");
        let cli = Cli::parse_from([
            "funnel",
            "surface",
            "-o",
            plot.to_str().unwrap(),
            "-r",
            "24",
            "--bounds",
            "-11,11,-11,11",
        ]);
        let Commands::Surface(args) = cli.command else {
            panic!("Expected 'surface' subcommand");
        };
        let grid = execute(&args).unwrap();
        assert_eq!(grid.shape(), (24, 24));
        assert!(grid.is_finite());
        assert!(plot.exists());
    }

    #[test]
    fn zero_levels_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let plot = dir.path().join("surface.svg");
        let cli = Cli::parse_from(["funnel", "surface", "-o", plot.to_str().unwrap(), "-l", "0"]);
        let Commands::Surface(args) = cli.command else {
            panic!("Expected 'surface' subcommand");
        };
        assert!(execute(&args).is_err());
        assert!(!plot.exists());
    }
}
