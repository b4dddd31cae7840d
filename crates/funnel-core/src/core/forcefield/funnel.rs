use super::ForceField;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESTRAINT_STIFFNESS: f64 = 1000.0;

const OSCILLATION_AMPLITUDE: f64 = 2.0;
const OSCILLATION_WAVENUMBER: f64 = 2.0;
const WELL_DEPTH: f64 = 8.0;
const CONFINEMENT_SCALE: f64 = 0.2;
const CONFINEMENT_LENGTH: f64 = 8.0;

/// The two-dimensional funnel landscape.
///
/// ```text
/// E(x, y, z) = 2*cos(2*sqrt(x^2+y^2))
///            - 8*exp(-(x^2+y^2))
///            + 0.2*((x/8)^2 + (y/8)^2)^3
///            + k*z^2
/// ```
///
/// The in-plane part depends only on the radius `ρ = sqrt(x^2+y^2)`: a deep
/// well at the origin ringed by cosine oscillations, inside a sextic wall at
/// large radius. The last term pins `z` near zero; `k` is the restraint
/// stiffness in kJ/(mol·nm²).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FunnelPotential {
    pub restraint_stiffness: f64,
}

impl Default for FunnelPotential {
    fn default() -> Self {
        Self {
            restraint_stiffness: DEFAULT_RESTRAINT_STIFFNESS,
        }
    }
}

impl FunnelPotential {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_restraint_stiffness(restraint_stiffness: f64) -> Self {
        Self {
            restraint_stiffness,
        }
    }

    /// The energy expression in the syntax accepted by the expression engine.
    pub fn force_field_expression(&self) -> String {
        format!(
            "2*cos(2*sqrt(x^2+y^2))-8*exp(-(x^2+y^2))+0.2*((x/8)^2+(y/8)^2)^3+{:?}*z^2",
            self.restraint_stiffness
        )
    }

    /// In-plane energy at `(x, y)`; the z restraint is omitted.
    #[inline]
    pub fn potential(x: f64, y: f64) -> f64 {
        Self::radial_profile_squared(x * x + y * y)
    }

    /// In-plane energy at radius `rho`.
    #[inline]
    pub fn radial_profile(rho: f64) -> f64 {
        Self::radial_profile_squared(rho * rho)
    }

    #[inline]
    fn radial_profile_squared(rho2: f64) -> f64 {
        let scaled = rho2 / (CONFINEMENT_LENGTH * CONFINEMENT_LENGTH);
        OSCILLATION_AMPLITUDE * (OSCILLATION_WAVENUMBER * rho2.sqrt()).cos()
            - WELL_DEPTH * (-rho2).exp()
            + CONFINEMENT_SCALE * scaled * scaled * scaled
    }

    /// Full three-dimensional energy, including the z restraint.
    #[inline]
    pub fn energy(&self, x: f64, y: f64, z: f64) -> f64 {
        Self::potential(x, y) + self.restraint_stiffness * z * z
    }
}

impl ForceField for FunnelPotential {
    fn name(&self) -> &str {
        "funnel"
    }

    fn expression(&self) -> String {
        self.force_field_expression()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const TOLERANCE: f64 = 1e-12;

    #[test]
    fn potential_at_origin_is_minus_six() {
        assert!((FunnelPotential::potential(0.0, 0.0) - (-6.0)).abs() < TOLERANCE);
    }

    #[test]
    fn potential_at_starting_radius_matches_direct_evaluation() {
        let expected = 2.0 * 20.0f64.cos() - 8.0 * (-100.0f64).exp() + 0.2 * (100.0f64 / 64.0).powi(3);
        let without_well = 2.0 * 20.0f64.cos() + 0.2 * (100.0f64 / 64.0).powi(3);
        let actual = FunnelPotential::potential(10.0, 0.0);
        assert!((actual - expected).abs() < TOLERANCE);
        assert!((actual - without_well).abs() < TOLERANCE);
        assert!((-100.0f64).exp() < 1e-43);
    }

    #[test]
    fn potential_is_radially_symmetric() {
        for &(x, y) in &[(1.0, 2.0), (-3.5, 0.25), (7.0, -7.0), (0.0, 9.5)] {
            let direct = FunnelPotential::potential(x, y);
            assert!((direct - FunnelPotential::potential(-x, -y)).abs() < TOLERANCE);

            let rho = (x * x + y * y).sqrt();
            for k in 0..8 {
                let theta = k as f64 * PI / 4.0;
                let rotated = FunnelPotential::potential(rho * theta.cos(), rho * theta.sin());
                assert!((direct - rotated).abs() < 1e-9);
            }
            assert!((direct - FunnelPotential::radial_profile(rho)).abs() < 1e-9);
        }
    }

    #[test]
    fn energy_adds_z_restraint() {
        let ff = FunnelPotential::new();
        let e = ff.energy(1.0, 1.0, 0.1);
        assert!((e - FunnelPotential::potential(1.0, 1.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn expression_uses_configured_stiffness() {
        assert!(FunnelPotential::new().force_field_expression().ends_with("+1000.0*z^2"));
        assert!(
            FunnelPotential::with_restraint_stiffness(250.5)
                .force_field_expression()
                .ends_with("+250.5*z^2")
        );
    }

    #[test]
    fn parsed_expression_agrees_with_closed_form() {
        let ff = FunnelPotential::with_restraint_stiffness(500.0);
        let expr = ff.symbolic_expression().unwrap();
        for &(x, y, z) in &[(0.0, 0.0, 0.0), (2.0, -1.0, 0.05), (-9.0, 4.0, -0.01)] {
            let parsed = expr.evaluate(&[("x", x), ("y", y), ("z", z)]).unwrap();
            assert!((parsed - ff.energy(x, y, z)).abs() < 1e-9);
        }
    }

    #[test]
    fn potential_has_no_singularities_in_plotting_box() {
        let mut x = -11.0;
        while x <= 11.0 {
            let mut y = -11.0;
            while y <= 11.0 {
                assert!(FunnelPotential::potential(x, y).is_finite());
                y += 0.25;
            }
            x += 0.25;
        }
    }
}
