use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use super::types::{PoolSatellite, SparseSample};
use super::utils::Timestamp;

pub const DEFAULT_STEP: Duration = Duration::seconds(30);

/// The sorted union of every observed instant in a pool, plus an
/// instant → satellite → sample index over the same data.
///
/// Instants are compared by value. When satellites spell the same instant
/// differently, the point keeps the spelling met first in pool order.
#[derive(Debug, Clone, PartialEq)]
pub struct Timeline {
    points: Vec<Timestamp>,
    step: Duration,
    index: BTreeMap<DateTime<Utc>, BTreeMap<String, SparseSample>>,
}

impl Timeline {
    pub fn build(pool: &[PoolSatellite]) -> Self {
        let mut labels: BTreeMap<DateTime<Utc>, Timestamp> = BTreeMap::new();
        let mut index: BTreeMap<DateTime<Utc>, BTreeMap<String, SparseSample>> = BTreeMap::new();
        for satellite in pool {
            for sample in &satellite.samples {
                let instant = sample.timestamp.instant();
                labels
                    .entry(instant)
                    .or_insert_with(|| sample.timestamp.clone());
                index
                    .entry(instant)
                    .or_default()
                    .insert(satellite.satellite_id.clone(), sample.clone());
            }
        }

        let instants: Vec<DateTime<Utc>> = labels.keys().copied().collect();
        let step = infer_step(&instants);
        let points: Vec<Timestamp> = labels.into_values().collect();

        log::debug!(
            "Built timeline with {} points from {} satellites (step {}s)",
            points.len(),
            pool.len(),
            step.num_seconds()
        );

        Self {
            points,
            step,
            index,
        }
    }

    pub fn points(&self) -> &[Timestamp] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn step_seconds(&self) -> i64 {
        self.step.num_seconds()
    }

    /// Nominal period covered: point count times the inferred step.
    pub fn period(&self) -> Duration {
        Duration::seconds(self.step_seconds() * self.len() as i64)
    }

    pub fn lookup(&self, instant: DateTime<Utc>, satellite_id: &str) -> Option<&SparseSample> {
        self.index.get(&instant)?.get(satellite_id)
    }
}

// Whole seconds between the first two points.
fn infer_step(points: &[DateTime<Utc>]) -> Duration {
    match points {
        [first, second, ..] => {
            let seconds = (*second - *first).num_seconds();
            if seconds > 0 {
                Duration::seconds(seconds)
            } else {
                log::warn!(
                    "Sub-second spacing between {} and {}, using default step",
                    first,
                    second
                );
                DEFAULT_STEP
            }
        }
        _ => DEFAULT_STEP,
    }
}
