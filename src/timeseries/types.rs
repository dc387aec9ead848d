use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use super::utils::{ratio, round2, Timestamp};

pub const SENTINEL_ELEVATION_DEG: f64 = -90.0;
pub const SENTINEL_AZIMUTH_DEG: f64 = 0.0;
pub const SENTINEL_RANGE_KM: f64 = 9999.0;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    AsRefStr,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Constellation {
    Starlink,
    #[value(name = "oneweb")]
    OneWeb,
}

impl Constellation {
    pub const ALL: [Constellation; 2] = [Constellation::Starlink, Constellation::OneWeb];

    pub fn default_min_elevation_deg(&self) -> f64 {
        match self {
            Constellation::Starlink => 5.0,
            Constellation::OneWeb => 10.0,
        }
    }
}

/// One observation from a visibility window.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseSample {
    pub timestamp: Timestamp,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
    pub connectable: bool,
}

/// A satellite together with the windows in which it was observed.
#[derive(Debug, Clone, PartialEq)]
pub struct PoolSatellite {
    pub satellite_id: String,
    pub name: String,
    pub samples: Vec<SparseSample>,
}

/// Link quality at one instant. All-`None` means unavailable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalQuality {
    pub rsrp_dbm: Option<f64>,
    pub rsrq_db: Option<f64>,
    pub rs_sinr_db: Option<f64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl SignalQuality {
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_unavailable(&self) -> bool {
        self.rsrp_dbm.is_none()
            && self.rsrq_db.is_none()
            && self.rs_sinr_db.is_none()
            && self.extra.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DenseSample {
    pub time: Timestamp,
    pub time_offset_seconds: i64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
    pub is_visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_quality: Option<SignalQuality>,
}

impl DenseSample {
    pub fn observed(time: Timestamp, time_offset_seconds: i64, sample: &SparseSample) -> Self {
        Self {
            time,
            time_offset_seconds,
            elevation_deg: round2(sample.elevation_deg),
            azimuth_deg: round2(sample.azimuth_deg),
            range_km: round2(sample.range_km),
            is_visible: true,
            signal_quality: None,
        }
    }

    pub fn below_horizon(time: Timestamp, time_offset_seconds: i64) -> Self {
        Self {
            time,
            time_offset_seconds,
            elevation_deg: SENTINEL_ELEVATION_DEG,
            azimuth_deg: SENTINEL_AZIMUTH_DEG,
            range_km: SENTINEL_RANGE_KM,
            is_visible: false,
            signal_quality: None,
        }
    }

    #[cfg(test)]
    pub fn is_sentinel(&self) -> bool {
        !self.is_visible
            && self.elevation_deg == SENTINEL_ELEVATION_DEG
            && self.azimuth_deg == SENTINEL_AZIMUTH_DEG
            && self.range_km == SENTINEL_RANGE_KM
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesConfig {
    pub min_elevation_deg: f64,
    pub time_step_seconds: i64,
    pub time_points: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeriesStatistics {
    pub visible_points: usize,
    pub visible_percentage: f64,
    pub max_elevation: f64,
}

impl SeriesStatistics {
    pub fn from_samples(samples: &[DenseSample]) -> Self {
        let visible: Vec<&DenseSample> = samples.iter().filter(|s| s.is_visible).collect();
        let max_elevation = visible
            .iter()
            .map(|s| s.elevation_deg)
            .fold(None, |acc: Option<f64>, el| Some(acc.map_or(el, |m| m.max(el))))
            .unwrap_or(0.0);

        Self {
            visible_points: visible.len(),
            visible_percentage: round2(
                ratio(visible.len() as f64, samples.len() as f64) * 100.0,
            ),
            max_elevation: round2(max_elevation),
        }
    }
}

/// A satellite's dense series spanning the whole timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatelliteSeries {
    pub id: String,
    pub name: String,
    pub constellation: Constellation,
    pub config: SeriesConfig,
    pub statistics: SeriesStatistics,
    pub position_timeseries: Vec<DenseSample>,
}
