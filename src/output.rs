use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::source::{read_json, SourceError};
use crate::timeseries::utils::round2;
use crate::timeseries::{Constellation, CoverageReport, CoverageTarget, SatelliteSeries};

/// Per-constellation document handed to the frontend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesDocument {
    pub metadata: Metadata,
    pub statistics: DocumentStatistics,
    pub satellites: Vec<SatelliteSeries>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub generated_at: DateTime<Utc>,
    pub generator: String,
    pub description: String,
    pub source: String,
    pub orbit_period_minutes: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_quality_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal_calculation_standard: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentStatistics {
    pub total_satellites: usize,
    pub constellation: Constellation,
    pub time_points: usize,
    pub time_step_seconds: i64,
    pub orbit_period_minutes: f64,
    pub avg_visible_satellites: f64,
    pub visible_range: [usize; 2],
    pub target_met_rate: f64,
    #[serde(default)]
    pub target_met: bool,
}

/// Where a document came from, for the metadata block.
pub struct Provenance<'a> {
    pub generator: &'a str,
    pub description: String,
    pub source: String,
    pub warning: Option<String>,
}

impl TimeseriesDocument {
    pub fn new(
        constellation: Constellation,
        satellites: Vec<SatelliteSeries>,
        time_points: usize,
        time_step_seconds: i64,
        coverage: &CoverageReport,
        target: &CoverageTarget,
        provenance: Provenance<'_>,
    ) -> Self {
        let orbit_period_minutes = period_minutes(time_points, time_step_seconds);
        Self {
            metadata: Metadata {
                generated_at: Utc::now(),
                generator: provenance.generator.to_string(),
                description: provenance.description,
                source: provenance.source,
                orbit_period_minutes,
                warning: provenance.warning,
                enhanced: None,
                signal_quality_source: None,
                signal_calculation_standard: None,
                match_rate: None,
                enhanced_at: None,
            },
            statistics: DocumentStatistics {
                total_satellites: satellites.len(),
                constellation,
                time_points,
                time_step_seconds,
                orbit_period_minutes,
                avg_visible_satellites: coverage.average,
                visible_range: [coverage.min, coverage.max],
                target_met_rate: coverage.achievement_rate,
                target_met: coverage.meets(target),
            },
            satellites,
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        read_json(path)
    }

    /// Replaces the satellites with their aligned versions and stamps the
    /// signal provenance.
    pub fn enhance(
        mut self,
        satellites: Vec<SatelliteSeries>,
        signal_quality_source: &str,
        signal_calculation_standard: &str,
        match_rate: f64,
    ) -> Self {
        self.satellites = satellites;
        self.metadata.enhanced = Some(true);
        self.metadata.signal_quality_source = Some(signal_quality_source.to_string());
        self.metadata.signal_calculation_standard = Some(signal_calculation_standard.to_string());
        self.metadata.match_rate = Some(round2(match_rate * 100.0));
        self.metadata.enhanced_at = Some(Utc::now());
        self
    }

    pub fn write(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut writer, self).map_err(io::Error::other)?;
        writer.flush()
    }
}

pub fn period_minutes(time_points: usize, time_step_seconds: i64) -> f64 {
    (time_points as i64 * time_step_seconds) as f64 / 60.0
}

pub fn timeseries_path(dir: &Path, constellation: Constellation) -> PathBuf {
    dir.join(format!("satellite-timeseries-{}.json", constellation))
}

pub fn enhanced_path(dir: &Path, constellation: Constellation) -> PathBuf {
    dir.join(format!("satellite-timeseries-{}-enhanced.json", constellation))
}
