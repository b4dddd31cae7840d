use super::RenderError;

/// Boundaries of filled-contour bands, strictly increasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLevels {
    boundaries: Vec<f64>,
}

impl ContourLevels {
    /// `bands` equal-width bands spanning `[min, max]`.
    pub fn linear(min: f64, max: f64, bands: usize) -> Result<Self, RenderError> {
        if bands == 0 {
            return Err(RenderError::InvalidRequest(
                "contour needs at least one band".to_string(),
            ));
        }
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(RenderError::InvalidRequest(format!(
                "invalid contour range [{min}, {max}]"
            )));
        }
        // A flat field still gets a drawable band around its single value.
        let (min, max) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
        let width = (max - min) / bands as f64;
        let mut boundaries: Vec<f64> = (0..bands).map(|i| min + i as f64 * width).collect();
        boundaries.push(max);
        Ok(Self { boundaries })
    }

    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    pub fn bands(&self) -> usize {
        self.boundaries.len() - 1
    }

    pub fn min(&self) -> f64 {
        self.boundaries[0]
    }

    pub fn max(&self) -> f64 {
        self.boundaries[self.boundaries.len() - 1]
    }

    /// Index of the band containing `value`; the top boundary belongs to the
    /// last band. `None` outside the range or for NaN.
    pub fn band_of(&self, value: f64) -> Option<usize> {
        if !(value >= self.min() && value <= self.max()) {
            return None;
        }
        let upper = self.boundaries[1..].partition_point(|&b| b < value);
        Some(upper.min(self.bands() - 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_levels_split_range_evenly() {
        let levels = ContourLevels::linear(-6.0, 2.0, 8).unwrap();
        assert_eq!(levels.bands(), 8);
        assert_eq!(levels.boundaries().len(), 9);
        assert_eq!(levels.min(), -6.0);
        assert_eq!(levels.max(), 2.0);
        assert!((levels.boundaries()[1] + 5.0).abs() < 1e-12);
    }

    #[test]
    fn band_lookup_covers_closed_range() {
        let levels = ContourLevels::linear(0.0, 4.0, 4).unwrap();
        assert_eq!(levels.band_of(0.0), Some(0));
        assert_eq!(levels.band_of(0.5), Some(0));
        assert_eq!(levels.band_of(1.5), Some(1));
        assert_eq!(levels.band_of(4.0), Some(3));
        assert_eq!(levels.band_of(4.1), None);
        assert_eq!(levels.band_of(f64::NAN), None);
    }

    #[test]
    fn flat_range_is_widened() {
        let levels = ContourLevels::linear(1.0, 1.0, 2).unwrap();
        assert_eq!(levels.band_of(1.0), Some(0));
        assert!(levels.min() < 1.0 && levels.max() > 1.0);
    }

    #[test]
    fn zero_bands_or_inverted_range_is_rejected() {
        assert!(ContourLevels::linear(0.0, 1.0, 0).is_err());
        assert!(ContourLevels::linear(1.0, 0.0, 3).is_err());
        assert!(ContourLevels::linear(f64::NAN, 0.0, 3).is_err());
    }
}
