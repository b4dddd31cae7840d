use anyhow::Context;
use funnelmd::render::{
    ContourRequest, Figure, Layer, RenderError, RenderSink, ScatterRequest,
};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const WIDTH: u32 = 900;
const HEIGHT: u32 = 760;
const COLORBAR_WIDTH: u32 = 110;

/// Viridis sampled at nine evenly spaced stops.
const VIRIDIS: [(u8, u8, u8); 9] = [
    (68, 1, 84),
    (71, 44, 122),
    (59, 81, 139),
    (44, 113, 142),
    (33, 144, 141),
    (39, 173, 129),
    (92, 200, 99),
    (170, 220, 50),
    (253, 231, 37),
];

/// Marker colours cycled across snapshot layers when no fixed colour is set.
const MARKER_CYCLE: [(u8, u8, u8); 6] = [
    (255, 255, 255),
    (255, 127, 14),
    (214, 39, 40),
    (23, 190, 207),
    (227, 119, 194),
    (188, 189, 34),
];

fn viridis(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0) * (VIRIDIS.len() - 1) as f64;
    let i = (t.floor() as usize).min(VIRIDIS.len() - 2);
    let f = t - i as f64;
    let (a, b) = (VIRIDIS[i], VIRIDIS[i + 1]);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

/// Colour of band `band` out of `bands`.
fn band_color(band: usize, bands: usize) -> RGBColor {
    if bands <= 1 {
        return viridis(0.5);
    }
    viridis(band as f64 / (bands - 1) as f64)
}

/// A [`RenderSink`] that collects layers in a [`Figure`] and writes them to
/// an SVG file on `flush`.
pub struct PlotFile {
    path: PathBuf,
    figure: Figure,
}

impl PlotFile {
    pub fn create(path: &Path) -> Result<Self, RenderError> {
        let is_svg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));
        if !is_svg {
            return Err(RenderError::InvalidRequest(format!(
                "unsupported figure format for '{}'; use a .svg path",
                path.display()
            )));
        }
        Ok(Self {
            path: path.to_path_buf(),
            figure: Figure::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn figure(&self) -> &Figure {
        &self.figure
    }

    fn write_svg(&self) -> Result<(), RenderError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| RenderError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let root = SVGBackend::new(&self.path, (WIDTH, HEIGHT)).into_drawing_area();
        draw_figure(&root, &self.figure)
            .and_then(|()| root.present().context("failed to write SVG"))
            .map_err(|e| RenderError::Backend(format!("{:#}", e)))
    }
}

impl RenderSink for PlotFile {
    fn contour_filled(&mut self, request: &ContourRequest) -> Result<(), RenderError> {
        self.figure.contour_filled(request)
    }

    fn scatter(&mut self, request: &ScatterRequest) -> Result<(), RenderError> {
        self.figure.scatter(request)
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.figure.present()?;
        self.write_svg()?;
        debug!(
            path = %self.path.display(),
            layers = self.figure.layers().len(),
            "Figure presented."
        );
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.figure.flush()?;
        self.write_svg()?;
        info!(
            path = %self.path.display(),
            layers = self.figure.layers().len(),
            "Figure written."
        );
        Ok(())
    }
}

fn draw_figure<DB>(root: &DrawingArea<DB, Shift>, figure: &Figure) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    root.fill(&WHITE)?;
    let Some((x0, x1, y0, y1)) = figure.extent() else {
        debug!("Empty figure; writing a blank canvas.");
        return Ok(());
    };
    let (x0, x1) = padded(x0, x1);
    let (y0, y1) = padded(y0, y1);

    let contour = figure.contours().last();
    let (plot_area, bar_area) = match contour {
        Some(c) if c.colorbar => {
            let (left, right) = root.split_horizontally((WIDTH - COLORBAR_WIDTH) as i32);
            (left, Some(right))
        }
        _ => (root.clone(), None),
    };

    let mut chart = ChartBuilder::on(&plot_area)
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(x0..x1, y0..y1)?;
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("x (nm)")
        .y_desc("y (nm)")
        .draw()?;

    let mut scatter_index = 0usize;
    for layer in figure.layers() {
        match layer {
            Layer::Contour(c) => {
                let bands = c.levels.bands();
                let step = c.grid.step;
                let cells = c.grid.values.indexed_iter().filter_map(|((j, i), &v)| {
                    let band = c.levels.band_of(v)?;
                    let (x, y) = (c.grid.xs[i], c.grid.ys[j]);
                    Some(Rectangle::new(
                        [(x, y), (x + step, y + step)],
                        band_color(band, bands).filled(),
                    ))
                });
                chart.draw_series(cells)?;
            }
            Layer::Scatter(s) => {
                let (r, g, b) = s
                    .style
                    .color
                    .map(|[r, g, b]| (r, g, b))
                    .unwrap_or(MARKER_CYCLE[scatter_index % MARKER_CYCLE.len()]);
                let color = RGBColor(r, g, b).mix(s.style.alpha);
                let size = s.style.size.round().max(1.0) as i32;
                chart.draw_series(s.points.rows().into_iter().map(|row| {
                    Circle::new((row[0], row[1]), size, color.filled())
                }))?;
                scatter_index += 1;
            }
        }
    }

    if let (Some(area), Some(c)) = (bar_area, contour) {
        draw_colorbar(&area, c)?;
    }
    Ok(())
}

fn draw_colorbar<DB>(area: &DrawingArea<DB, Shift>, contour: &ContourRequest) -> anyhow::Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let levels = &contour.levels;
    let mut bar = ChartBuilder::on(area)
        .margin_top(15)
        .margin_bottom(55)
        .margin_right(10)
        .y_label_area_size(55)
        .build_cartesian_2d(0.0..1.0, levels.min()..levels.max())?;
    bar.configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .y_desc("E (kJ/mol)")
        .y_labels(levels.bands() + 1)
        .draw()?;
    let bounds = levels.boundaries();
    bar.draw_series(bounds.windows(2).enumerate().map(|(band, w)| {
        Rectangle::new(
            [(0.0, w[0]), (1.0, w[1])],
            band_color(band, levels.bands()).filled(),
        )
    }))?;
    Ok(())
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo { (lo, hi) } else { (lo - 1.0, hi + 1.0) }
}
