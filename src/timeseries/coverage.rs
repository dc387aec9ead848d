use serde::{Deserialize, Serialize};

use super::types::SatelliteSeries;
use super::utils::ratio;

/// Inclusive range of simultaneously visible satellites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetBand {
    pub min: usize,
    pub max: usize,
}

impl TargetBand {
    pub fn contains(&self, count: usize) -> bool {
        self.min <= count && count <= self.max
    }

    pub fn contains_average(&self, average: f64) -> bool {
        self.min as f64 <= average && average <= self.max as f64
    }
}

impl Default for TargetBand {
    fn default() -> Self {
        Self { min: 10, max: 15 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoverageTarget {
    pub band: TargetBand,
    /// Minimum achievement rate, as a fraction.
    pub pass_rate: f64,
}

impl Default for CoverageTarget {
    fn default() -> Self {
        Self {
            band: TargetBand::default(),
            pass_rate: 0.95,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoverageReport {
    pub visible_counts: Vec<usize>,
    pub average: f64,
    pub min: usize,
    pub max: usize,
    pub in_band_points: usize,
    pub achievement_rate: f64,
}

impl CoverageReport {
    pub fn compute(series: &[SatelliteSeries], band: &TargetBand) -> Self {
        let time_points = series
            .first()
            .map_or(0, |s| s.position_timeseries.len());

        let visible_counts: Vec<usize> = (0..time_points)
            .map(|i| {
                series
                    .iter()
                    .filter(|s| s.position_timeseries.get(i).is_some_and(|p| p.is_visible))
                    .count()
            })
            .collect();

        let total: usize = visible_counts.iter().sum();
        let in_band_points = visible_counts.iter().filter(|&&c| band.contains(c)).count();

        Self {
            average: ratio(total as f64, time_points as f64),
            min: visible_counts.iter().copied().min().unwrap_or(0),
            max: visible_counts.iter().copied().max().unwrap_or(0),
            in_band_points,
            achievement_rate: ratio(in_band_points as f64, time_points as f64),
            visible_counts,
        }
    }

    pub fn time_points(&self) -> usize {
        self.visible_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible_counts.is_empty()
    }

    pub fn meets(&self, target: &CoverageTarget) -> bool {
        !self.is_empty()
            && target.band.contains_average(self.average)
            && self.achievement_rate >= target.pass_rate
    }

    pub fn log_summary(&self, target: &CoverageTarget) {
        if self.is_empty() {
            log::warn!("No coverage data: empty satellite set or timeline");
            return;
        }
        log::info!(
            "Average visible: {:.1} (range {}-{})",
            self.average,
            self.min,
            self.max
        );
        log::info!(
            "Target achievement: {:.1}% ({}/{} points in {}-{})",
            self.achievement_rate * 100.0,
            self.in_band_points,
            self.time_points(),
            target.band.min,
            target.band.max
        );
        if self.meets(target) {
            log::info!("Coverage target met");
        } else {
            log::warn!(
                "Coverage target not met (needs average in {}-{} and {:.0}%+ achievement)",
                target.band.min,
                target.band.max,
                target.pass_rate * 100.0
            );
        }
    }
}
