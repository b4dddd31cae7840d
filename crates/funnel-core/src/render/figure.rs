use super::{ContourRequest, RenderError, RenderSink, ScatterRequest};

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Contour(ContourRequest),
    Scatter(ScatterRequest),
}

/// An append-only, in-memory list of drawing layers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    layers: Vec<Layer>,
    presentations: usize,
    flushed: bool,
}

impl Figure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    /// How many times the figure was presented without being finalized.
    pub fn presentations(&self) -> usize {
        self.presentations
    }

    pub fn contours(&self) -> impl Iterator<Item = &ContourRequest> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Contour(c) => Some(c),
            Layer::Scatter(_) => None,
        })
    }

    pub fn scatters(&self) -> impl Iterator<Item = &ScatterRequest> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Scatter(s) => Some(s),
            Layer::Contour(_) => None,
        })
    }

    /// Combined `(min_x, max_x, min_y, max_y)` of all layers, or `None` for
    /// an empty figure.
    pub fn extent(&self) -> Option<(f64, f64, f64, f64)> {
        let mut extent: Option<(f64, f64, f64, f64)> = None;
        let mut include = |x: f64, y: f64| {
            if !x.is_finite() || !y.is_finite() {
                return;
            }
            extent = Some(match extent {
                None => (x, x, y, y),
                Some((x0, x1, y0, y1)) => (x0.min(x), x1.max(x), y0.min(y), y1.max(y)),
            });
        };
        for layer in &self.layers {
            match layer {
                Layer::Contour(c) => {
                    let b = &c.grid.bounds;
                    include(b.min_x, b.min_y);
                    include(b.max_x, b.max_y);
                }
                Layer::Scatter(s) => {
                    for row in s.points.rows() {
                        include(row[0], row[1]);
                    }
                }
            }
        }
        extent
    }

    fn ensure_open(&self) -> Result<(), RenderError> {
        if self.flushed {
            return Err(RenderError::Flushed);
        }
        Ok(())
    }
}

impl RenderSink for Figure {
    fn contour_filled(&mut self, request: &ContourRequest) -> Result<(), RenderError> {
        self.ensure_open()?;
        request.validate()?;
        self.layers.push(Layer::Contour(request.clone()));
        Ok(())
    }

    fn scatter(&mut self, request: &ScatterRequest) -> Result<(), RenderError> {
        self.ensure_open()?;
        request.validate()?;
        self.layers.push(Layer::Scatter(request.clone()));
        Ok(())
    }

    fn present(&mut self) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.presentations += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), RenderError> {
        self.ensure_open()?;
        self.flushed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::{Grid, GridBounds};
    use crate::render::{ContourLevels, MarkerStyle};
    use ndarray::array;

    fn contour() -> ContourRequest {
        let grid = Grid::funnel(GridBounds::symmetric(12.0), 20).unwrap();
        let (lo, hi) = grid.value_range().unwrap();
        ContourRequest {
            grid,
            levels: ContourLevels::linear(lo, hi, 8).unwrap(),
            colorbar: true,
        }
    }

    fn scatter(sample: usize) -> ScatterRequest {
        ScatterRequest {
            sample,
            points: array![[1.0, 2.0], [-13.0, 0.5]],
            style: MarkerStyle::default(),
        }
    }

    #[test]
    fn layers_are_kept_in_call_order() {
        let mut figure = Figure::new();
        figure.contour_filled(&contour()).unwrap();
        figure.scatter(&scatter(0)).unwrap();
        figure.scatter(&scatter(1)).unwrap();
        assert_eq!(figure.layers().len(), 3);
        assert!(matches!(figure.layers()[0], Layer::Contour(_)));
        let samples: Vec<usize> = figure.scatters().map(|s| s.sample).collect();
        assert_eq!(samples, vec![0, 1]);
        assert_eq!(figure.contours().count(), 1);
    }

    #[test]
    fn extent_covers_grid_and_points() {
        let mut figure = Figure::new();
        assert_eq!(figure.extent(), None);
        figure.contour_filled(&contour()).unwrap();
        figure.scatter(&scatter(0)).unwrap();
        let (x0, x1, y0, y1) = figure.extent().unwrap();
        assert_eq!((x0, x1, y0, y1), (-13.0, 12.0, -12.0, 12.0));
    }

    #[test]
    fn flushed_figure_rejects_more_layers() {
        let mut figure = Figure::new();
        figure.flush().unwrap();
        assert!(figure.is_flushed());
        assert!(matches!(figure.scatter(&scatter(0)), Err(RenderError::Flushed)));
        assert!(matches!(figure.flush(), Err(RenderError::Flushed)));
    }

    #[test]
    fn present_keeps_the_figure_open() {
        let mut figure = Figure::new();
        figure.scatter(&scatter(0)).unwrap();
        figure.present().unwrap();
        figure.scatter(&scatter(1)).unwrap();
        figure.present().unwrap();
        assert_eq!(figure.presentations(), 2);
        assert!(!figure.is_flushed());
        figure.flush().unwrap();
        assert!(matches!(figure.present(), Err(RenderError::Flushed)));
    }

    #[test]
    fn malformed_scatter_is_rejected() {
        let mut figure = Figure::new();
        let bad = ScatterRequest {
            sample: 0,
            points: array![[1.0, 2.0, 3.0]],
            style: MarkerStyle::default(),
        };
        assert!(matches!(figure.scatter(&bad), Err(RenderError::InvalidRequest(_))));
        assert!(figure.layers().is_empty());
    }
}
