//! Unit system shared by the engine: nanometres, picoseconds, atomic mass
//! units, kJ/mol and kelvin. With these units a force in kJ/(mol·nm) divided
//! by a mass in amu is an acceleration in nm/ps².

/// Boltzmann constant in kJ/(mol·K).
pub const BOLTZMANN: f64 = 0.008_314_462_618;

pub const FEMTOSECONDS_PER_PICOSECOND: f64 = 1000.0;

#[inline]
pub fn femtoseconds_to_picoseconds(fs: f64) -> f64 {
    fs / FEMTOSECONDS_PER_PICOSECOND
}

/// Thermal energy `k_B·T` in kJ/mol.
#[inline]
pub fn thermal_energy(temperature: f64) -> f64 {
    BOLTZMANN * temperature
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_femtoseconds_is_a_hundredth_of_a_picosecond() {
        assert!((femtoseconds_to_picoseconds(10.0) - 0.01).abs() < 1e-15);
    }

    #[test]
    fn thermal_energy_at_room_temperature_is_about_2_5_kj_per_mol() {
        let kt = thermal_energy(300.0);
        assert!((kt - 2.494).abs() < 1e-3);
    }
}
