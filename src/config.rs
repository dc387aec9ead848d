use std::collections::BTreeMap;
use std::path::Path;

use chrono::Duration;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use crate::propagate::Observer;
use crate::timeseries::{Constellation, CoverageTarget};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid observer coordinates: {0}")]
    Coordinates(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub coverage: CoverageTarget,
    pub alignment: AlignmentConfig,
    pub constellations: BTreeMap<Constellation, ConstellationConfig>,
    pub observer: ObserverConfig,
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlignmentConfig {
    #[serde(deserialize_with = "duration")]
    pub tolerance: Duration,
    pub signal_quality_source: String,
    pub signal_calculation_standard: String,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            tolerance: Duration::seconds(30),
            signal_quality_source: "orbit-engine Stage 5".to_string(),
            signal_calculation_standard: "3GPP_TS_38.214".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConstellationConfig {
    pub min_elevation_deg: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObserverConfig {
    pub name: String,
    pub coordinates: String,
    pub altitude_m: f64,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            name: "National Taipei University".to_string(),
            coordinates: "24.9441667,121.3713889".to_string(),
            altitude_m: 50.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateConfig {
    #[serde(deserialize_with = "duration")]
    pub step: Duration,
    #[serde(deserialize_with = "duration")]
    pub duration: Duration,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            step: Duration::seconds(30),
            duration: Duration::hours(2),
        }
    }
}

impl GenerateConfig {
    pub fn time_points(&self) -> usize {
        let step = self.step.num_seconds();
        if step <= 0 {
            return 0;
        }
        (self.duration.num_seconds() / step).max(0) as usize
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Reads `path` when given, otherwise the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn min_elevation_deg(&self, constellation: Constellation) -> f64 {
        self.constellations
            .get(&constellation)
            .map(|c| c.min_elevation_deg)
            .unwrap_or_else(|| constellation.default_min_elevation_deg())
    }

    pub fn observer(&self) -> Result<Observer, ConfigError> {
        Observer::from_coordinates(
            &self.observer.name,
            &self.observer.coordinates,
            self.observer.altitude_m,
        )
        .ok_or_else(|| ConfigError::Coordinates(self.observer.coordinates.clone()))
    }
}

fn duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim())
        .map_err(serde::de::Error::custom)
        .and_then(|d| Duration::from_std(d).map_err(serde::de::Error::custom))
}
