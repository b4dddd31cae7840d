use crate::error::{CliError, Result};
use funnelmd::engine::config::IntegratorKind;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileEnsembleConfig {
    pub particles: Option<usize>,
    pub mass: Option<f64>,
    pub temperature: Option<f64>,
    pub friction: Option<f64>,
    pub timestep_fs: Option<f64>,
    pub steps_per_sample: Option<u64>,
    pub samples: Option<usize>,
    pub integrator: Option<IntegratorKind>,
    pub seed: Option<u64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileInitializationConfig {
    pub radius: Option<f64>,
    pub box_half_width: Option<f64>,
    pub relative_tolerance: Option<f64>,
    pub absolute_tolerance: Option<f64>,
    pub max_rounds: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePotentialConfig {
    pub restraint_stiffness: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileOutputConfig {
    pub plot: Option<PathBuf>,
    pub trajectory: Option<PathBuf>,
    pub surface_half_width: Option<f64>,
    pub resolution: Option<usize>,
    pub levels: Option<usize>,
    pub marker_size: Option<f64>,
    pub marker_alpha: Option<f64>,
    pub present_every: Option<usize>,
}

/// The TOML configuration file. Every key is optional.
#[derive(Deserialize, Debug, Default, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub ensemble: Option<FileEnsembleConfig>,
    pub initialization: Option<FileInitializationConfig>,
    pub potential: Option<FilePotentialConfig>,
    pub output: Option<FileOutputConfig>,
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {} value for {}: {}", kind, key, value)))
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Applies `KEY=VALUE` overrides on top of the values read from file.
    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();

            match key {
                "ensemble.particles" => {
                    self.ensemble.get_or_insert_with(Default::default).particles =
                        Some(parse_value(key, value, "integer")?);
                }
                "ensemble.mass" => {
                    self.ensemble.get_or_insert_with(Default::default).mass =
                        Some(parse_value(key, value, "float")?);
                }
                "ensemble.temperature" => {
                    self.ensemble.get_or_insert_with(Default::default).temperature =
                        Some(parse_value(key, value, "float")?);
                }
                "ensemble.friction" => {
                    self.ensemble.get_or_insert_with(Default::default).friction =
                        Some(parse_value(key, value, "float")?);
                }
                "ensemble.timestep-fs" => {
                    self.ensemble.get_or_insert_with(Default::default).timestep_fs =
                        Some(parse_value(key, value, "float")?);
                }
                "ensemble.steps-per-sample" => {
                    self.ensemble.get_or_insert_with(Default::default).steps_per_sample =
                        Some(parse_value(key, value, "integer")?);
                }
                "ensemble.samples" => {
                    self.ensemble.get_or_insert_with(Default::default).samples =
                        Some(parse_value(key, value, "integer")?);
                }
                "ensemble.seed" => {
                    self.ensemble.get_or_insert_with(Default::default).seed =
                        Some(parse_value(key, value, "integer")?);
                }
                "ensemble.integrator" => {
                    let kind = match value.trim() {
                        "langevin" => IntegratorKind::Langevin,
                        "brownian" => IntegratorKind::Brownian,
                        "verlet" => IntegratorKind::Verlet,
                        other => {
                            return Err(CliError::Config(format!(
                                "Unknown integrator for {}: {}",
                                key, other
                            )));
                        }
                    };
                    self.ensemble.get_or_insert_with(Default::default).integrator = Some(kind);
                }
                "initialization.radius" => {
                    self.initialization.get_or_insert_with(Default::default).radius =
                        Some(parse_value(key, value, "float")?);
                }
                "initialization.box-half-width" => {
                    self.initialization
                        .get_or_insert_with(Default::default)
                        .box_half_width = Some(parse_value(key, value, "float")?);
                }
                "initialization.relative-tolerance" => {
                    self.initialization
                        .get_or_insert_with(Default::default)
                        .relative_tolerance = Some(parse_value(key, value, "float")?);
                }
                "initialization.absolute-tolerance" => {
                    self.initialization
                        .get_or_insert_with(Default::default)
                        .absolute_tolerance = Some(parse_value(key, value, "float")?);
                }
                "initialization.max-rounds" => {
                    self.initialization
                        .get_or_insert_with(Default::default)
                        .max_rounds = Some(parse_value(key, value, "integer")?);
                }
                "potential.restraint-stiffness" => {
                    self.potential
                        .get_or_insert_with(Default::default)
                        .restraint_stiffness = Some(parse_value(key, value, "float")?);
                }
                "output.plot" => {
                    self.output.get_or_insert_with(Default::default).plot =
                        Some(PathBuf::from(value.trim()));
                }
                "output.trajectory" => {
                    self.output.get_or_insert_with(Default::default).trajectory =
                        Some(PathBuf::from(value.trim()));
                }
                "output.surface-half-width" => {
                    self.output
                        .get_or_insert_with(Default::default)
                        .surface_half_width = Some(parse_value(key, value, "float")?);
                }
                "output.resolution" => {
                    self.output.get_or_insert_with(Default::default).resolution =
                        Some(parse_value(key, value, "integer")?);
                }
                "output.levels" => {
                    self.output.get_or_insert_with(Default::default).levels =
                        Some(parse_value(key, value, "integer")?);
                }
                "output.marker-size" => {
                    self.output.get_or_insert_with(Default::default).marker_size =
                        Some(parse_value(key, value, "float")?);
                }
                "output.marker-alpha" => {
                    self.output.get_or_insert_with(Default::default).marker_alpha =
                        Some(parse_value(key, value, "float")?);
                }
                "output.present-every" => {
                    self.output.get_or_insert_with(Default::default).present_every =
                        Some(parse_value(key, value, "integer")?);
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_file_is_parsed_with_kebab_case_keys() {
        let config = FileConfig::from_toml(
            r#"
            [ensemble]
            particles = 12
            temperature = 300.0
            timestep-fs = 2.0
            steps-per-sample = 100
            integrator = "brownian"
            seed = 3

            [initialization]
            radius = 5.0
            relative-tolerance = 1e-3

            [potential]
            restraint-stiffness = 500.0

            [output]
            plot = "out.svg"
            levels = 12
            present-every = 50
            "#,
        )
        .unwrap();
        let ensemble = config.ensemble.unwrap();
        assert_eq!(ensemble.particles, Some(12));
        assert_eq!(ensemble.timestep_fs, Some(2.0));
        assert_eq!(ensemble.integrator, Some(IntegratorKind::Brownian));
        assert_eq!(ensemble.mass, None);
        assert_eq!(config.initialization.unwrap().relative_tolerance, Some(1e-3));
        assert_eq!(config.potential.unwrap().restraint_stiffness, Some(500.0));
        let output = config.output.unwrap();
        assert_eq!(output.plot, Some(PathBuf::from("out.svg")));
        assert_eq!(output.levels, Some(12));
        assert_eq!(output.present_every, Some(50));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(FileConfig::from_toml("[ensemble]\nparticle-count = 3\n").is_err());
        assert!(FileConfig::from_toml("[thermostat]\n").is_err());
    }

    #[test]
    fn empty_file_is_valid() {
        assert_eq!(FileConfig::from_toml("").unwrap(), FileConfig::default());
    }

    #[test]
    fn set_values_fill_missing_sections() {
        let mut config = FileConfig::default();
        config
            .apply_set_values(&[
                "ensemble.temperature=300".to_string(),
                "ensemble.integrator=verlet".to_string(),
                "initialization.max-rounds=10".to_string(),
                "output.plot=figure.svg".to_string(),
            ])
            .unwrap();
        let ensemble = config.ensemble.unwrap();
        assert_eq!(ensemble.temperature, Some(300.0));
        assert_eq!(ensemble.integrator, Some(IntegratorKind::Verlet));
        assert_eq!(config.initialization.unwrap().max_rounds, Some(10));
        assert_eq!(config.output.unwrap().plot, Some(PathBuf::from("figure.svg")));
    }

    #[test]
    fn set_values_override_file_values() {
        let mut config = FileConfig::from_toml("[ensemble]\nparticles = 3\n").unwrap();
        config
            .apply_set_values(&["ensemble.particles=8".to_string()])
            .unwrap();
        assert_eq!(config.ensemble.unwrap().particles, Some(8));
    }

    #[test]
    fn malformed_set_values_are_rejected() {
        let mut config = FileConfig::default();
        for bad in ["ensemble.mass", "ensemble.mass=heavy", "ensemble.colour=red", "ensemble.integrator=leapfrog"] {
            assert!(
                matches!(config.apply_set_values(&[bad.to_string()]), Err(CliError::Config(_))),
                "accepted {bad}"
            );
        }
    }
}
