use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::error::SourceError;
use super::read_json;
use crate::timeseries::utils::Timestamp;
use crate::timeseries::{Constellation, PoolSatellite, SparseSample};

pub const FILE_PREFIX: &str = "link_feasibility_output_";

/// Link-feasibility output of the orbit engine: per-constellation pools of
/// satellites, each with the windows in which it is connectable.
#[derive(Debug, Clone, Deserialize)]
pub struct LinkFeasibilityDocument {
    #[serde(default)]
    pub pool_optimization: PoolOptimization,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolOptimization {
    #[serde(default)]
    pub optimized_pools: BTreeMap<String, Vec<PoolEntry>>,
    #[serde(default)]
    pub optimization_metrics: BTreeMap<String, OptimizationMetrics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PoolEntry {
    pub satellite_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub time_series: Vec<WindowPoint>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WindowPoint {
    pub timestamp: Timestamp,
    pub visibility_metrics: VisibilityMetrics,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VisibilityMetrics {
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub distance_km: f64,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_connectable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OptimizationMetrics {
    #[serde(default)]
    pub coverage_statistics: Option<UpstreamCoverage>,
}

/// Coverage figures as reported by the orbit engine itself.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpstreamCoverage {
    #[serde(default)]
    pub total_time_points: Option<usize>,
    #[serde(default)]
    pub avg_visible: Option<f64>,
    #[serde(default)]
    pub min_visible: Option<usize>,
    #[serde(default)]
    pub max_visible: Option<usize>,
}

impl LinkFeasibilityDocument {
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        read_json(path)
    }

    fn entries(&self, constellation: Constellation) -> &[PoolEntry] {
        self.pool_optimization
            .optimized_pools
            .get(constellation.as_ref())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The constellation's pool as sparse samples. Unknown constellations
    /// yield an empty pool.
    pub fn pool(&self, constellation: Constellation) -> Vec<PoolSatellite> {
        self.entries(constellation)
            .iter()
            .map(|entry| PoolSatellite {
                satellite_id: entry.satellite_id.clone(),
                name: entry
                    .name
                    .clone()
                    .unwrap_or_else(|| entry.satellite_id.clone()),
                samples: entry
                    .time_series
                    .iter()
                    .map(|p| SparseSample {
                        timestamp: p.timestamp.clone(),
                        elevation_deg: p.visibility_metrics.elevation_deg,
                        azimuth_deg: p.visibility_metrics.azimuth_deg,
                        range_km: p.visibility_metrics.distance_km,
                        connectable: p.visibility_metrics.is_connectable,
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn satellite_ids(&self, constellation: Constellation) -> Vec<String> {
        self.entries(constellation)
            .iter()
            .map(|e| e.satellite_id.clone())
            .collect()
    }

    pub fn upstream_coverage(&self, constellation: Constellation) -> Option<&UpstreamCoverage> {
        self.pool_optimization
            .optimization_metrics
            .get(constellation.as_ref())?
            .coverage_statistics
            .as_ref()
    }
}

// The orbit engine writes booleans as "True"/"False" strings.
fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(serde::de::Error::custom(format!("invalid flag: {}", s))),
        },
    }
}
