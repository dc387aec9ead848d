use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::types::SignalPoint;
use crate::timeseries::utils::{parse_timestamp, ratio};
use crate::timeseries::{SatelliteSeries, SignalQuality};

pub const DEFAULT_TOLERANCE: Duration = Duration::seconds(30);

/// Link-quality samples of one satellite, indexed two ways.
///
/// One slot per distinct raw timestamp, in order of first appearance. A
/// repeated timestamp keeps its first slot but takes the later quality.
#[derive(Debug, Clone)]
struct SatelliteSignals {
    slots: Vec<SignalQuality>,
    // raw timestamp -> slot
    exact: HashMap<String, usize>,
    // (instant, slot) sorted by instant; unparsable stamps left out
    by_time: Vec<(DateTime<Utc>, usize)>,
}

impl SatelliteSignals {
    fn new(satellite_id: &str, points: &[SignalPoint]) -> Self {
        let mut slots: Vec<SignalQuality> = Vec::with_capacity(points.len());
        let mut exact = HashMap::with_capacity(points.len());
        let mut by_time = Vec::with_capacity(points.len());

        for point in points {
            if let Some(&slot) = exact.get(&point.timestamp) {
                slots[slot] = point.signal_quality.clone();
                continue;
            }

            let slot = slots.len();
            slots.push(point.signal_quality.clone());
            exact.insert(point.timestamp.clone(), slot);
            match parse_timestamp(&point.timestamp) {
                Some(instant) => by_time.push((instant, slot)),
                None => log::debug!(
                    "Satellite {}: unparsable signal timestamp {:?} excluded from fuzzy matching",
                    satellite_id,
                    point.timestamp
                ),
            }
        }
        by_time.sort();

        Self {
            slots,
            exact,
            by_time,
        }
    }

    fn exact(&self, raw: &str) -> Option<&SignalQuality> {
        self.exact.get(raw).map(|&slot| &self.slots[slot])
    }

    /// The earliest slot whose instant lies within `tolerance` of
    /// `instant`. Not necessarily the nearest one.
    fn first_within(&self, instant: DateTime<Utc>, tolerance: Duration) -> Option<&SignalQuality> {
        let lo = self
            .by_time
            .partition_point(|(t, _)| *t < instant - tolerance);
        let hi = self
            .by_time
            .partition_point(|(t, _)| *t <= instant + tolerance);

        self.by_time[lo..hi]
            .iter()
            .map(|&(_, slot)| slot)
            .min()
            .map(|slot| &self.slots[slot])
    }
}

/// Per-satellite link-quality lookup built once from the secondary source.
#[derive(Debug, Clone, Default)]
pub struct SignalIndex {
    satellites: HashMap<String, SatelliteSignals>,
}

impl SignalIndex {
    pub fn build<'a, I>(satellites: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a [SignalPoint])>,
    {
        let satellites = satellites
            .into_iter()
            .map(|(id, points)| (id.to_string(), SatelliteSignals::new(id, points)))
            .collect();
        Self { satellites }
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Alignment {
    pub satellites: Vec<SatelliteSeries>,
    pub matched_points: usize,
    /// Matches that needed the tolerance window.
    pub fuzzy_points: usize,
    pub total_points: usize,
    pub skipped: Vec<String>,
}

impl Alignment {
    pub fn match_rate(&self) -> f64 {
        ratio(self.matched_points as f64, self.total_points as f64)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Aligner {
    tolerance: Duration,
}

impl Default for Aligner {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl Aligner {
    pub fn new(tolerance: Duration) -> Self {
        Self {
            tolerance: tolerance.abs(),
        }
    }

    /// Attaches a `signal_quality` record to every point of every series.
    ///
    /// Satellites absent from `index` are passed through without any
    /// quality record and are not counted in the totals.
    pub fn align(&self, series: &[SatelliteSeries], index: &SignalIndex) -> Alignment {
        let mut result = Alignment::default();

        for source in series {
            let mut satellite = source.clone();

            let Some(signals) = index.satellites.get(&satellite.id) else {
                log::warn!("Satellite {} has no signal data, skipping", satellite.id);
                result.skipped.push(satellite.id.clone());
                result.satellites.push(satellite);
                continue;
            };

            for point in &mut satellite.position_timeseries {
                result.total_points += 1;

                if !point.is_visible {
                    point.signal_quality = Some(SignalQuality::unavailable());
                    continue;
                }

                let quality = match signals.exact(point.time.as_str()) {
                    Some(q) => Some(q),
                    None => {
                        let q = signals.first_within(point.time.instant(), self.tolerance);
                        if q.is_some() {
                            result.fuzzy_points += 1;
                        }
                        q
                    }
                };

                point.signal_quality = match quality {
                    Some(q) => {
                        result.matched_points += 1;
                        Some(q.clone())
                    }
                    None => Some(SignalQuality::unavailable()),
                };
            }

            result.satellites.push(satellite);
        }

        log::info!(
            "Matched {}/{} points ({:.1}%, {} via tolerance window)",
            result.matched_points,
            result.total_points,
            result.match_rate() * 100.0,
            result.fuzzy_points
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::utils::{timestamp_label, Timestamp};
    use crate::timeseries::{Constellation, DenseSample, SeriesConfig, SeriesStatistics};
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_762_149_600 + secs, 0).unwrap()
    }

    fn quality(rsrp: f64) -> SignalQuality {
        SignalQuality {
            rsrp_dbm: Some(rsrp),
            rsrq_db: Some(-10.0),
            rs_sinr_db: Some(12.0),
            ..Default::default()
        }
    }

    fn point(timestamp: &str, rsrp: f64) -> SignalPoint {
        SignalPoint {
            timestamp: timestamp.to_string(),
            signal_quality: quality(rsrp),
        }
    }

    fn label(secs: i64) -> String {
        timestamp_label(&at(secs))
    }

    fn series(id: &str, visible: &[(i64, bool)]) -> SatelliteSeries {
        let points: Vec<(Timestamp, bool)> = visible
            .iter()
            .map(|&(secs, is_visible)| (at(secs).into(), is_visible))
            .collect();
        series_at(id, points)
    }

    /// All-visible series whose points carry the given upstream spellings.
    fn series_labelled(id: &str, raws: &[&str]) -> SatelliteSeries {
        let points = raws
            .iter()
            .map(|raw| (Timestamp::parse(raw).unwrap(), true))
            .collect();
        series_at(id, points)
    }

    fn series_at(id: &str, points: Vec<(Timestamp, bool)>) -> SatelliteSeries {
        let samples: Vec<DenseSample> = points
            .into_iter()
            .enumerate()
            .map(|(i, (time, is_visible))| {
                let mut sample = DenseSample::below_horizon(time, 30 * i as i64);
                if is_visible {
                    sample.is_visible = true;
                    sample.elevation_deg = 30.0;
                    sample.azimuth_deg = 45.0;
                    sample.range_km = 700.0;
                }
                sample
            })
            .collect();
        SatelliteSeries {
            id: id.to_string(),
            name: id.to_string(),
            constellation: Constellation::Starlink,
            config: SeriesConfig {
                min_elevation_deg: 5.0,
                time_step_seconds: 30,
                time_points: samples.len(),
            },
            statistics: SeriesStatistics::from_samples(&samples),
            position_timeseries: samples,
        }
    }

    fn index(entries: &[(&str, Vec<SignalPoint>)]) -> SignalIndex {
        SignalIndex::build(entries.iter().map(|(id, points)| (*id, points.as_slice())))
    }

    fn rsrp(alignment: &Alignment, sat: usize, point: usize) -> Option<f64> {
        alignment.satellites[sat].position_timeseries[point]
            .signal_quality
            .as_ref()
            .and_then(|q| q.rsrp_dbm)
    }

    #[test]
    fn exact_match_is_used_first() {
        let index = index(&[("a", vec![point(&label(5), -90.0), point(&label(0), -80.0)])]);
        let result = Aligner::default().align(&[series("a", &[(0, true)])], &index);

        assert_eq!(rsrp(&result, 0, 0), Some(-80.0));
        assert_eq!(result.matched_points, 1);
        assert_eq!(result.fuzzy_points, 0);
    }

    #[test]
    fn first_candidate_in_window_wins_over_nearest() {
        let index = index(&[("a", vec![point(&label(10), -95.0), point(&label(5), -85.0)])]);
        let result = Aligner::new(Duration::seconds(30)).align(&[series("a", &[(0, true)])], &index);

        assert_eq!(rsrp(&result, 0, 0), Some(-95.0));
        assert_eq!(result.fuzzy_points, 1);
    }

    #[test]
    fn candidates_before_the_instant_count_too() {
        let index = index(&[(
            "a",
            vec![point(&label(200), -70.0), point(&label(-20), -75.0), point(&label(15), -72.0)],
        )]);
        let result = Aligner::default().align(&[series("a", &[(0, true)])], &index);

        assert_eq!(rsrp(&result, 0, 0), Some(-75.0));
    }

    #[test]
    fn tolerance_edge_is_inclusive() {
        let index = index(&[("a", vec![point(&label(30), -88.0)])]);
        let result = Aligner::default().align(&[series("a", &[(0, true), (60, true)])], &index);

        assert_eq!(rsrp(&result, 0, 0), Some(-88.0));
        assert_eq!(rsrp(&result, 0, 1), Some(-88.0));

        let index = self::index(&[("a", vec![point(&label(31), -88.0)])]);
        let result = Aligner::default().align(&[series("a", &[(0, true)])], &index);
        assert_eq!(rsrp(&result, 0, 0), None);
        assert_eq!(result.matched_points, 0);
    }

    #[test]
    fn invisible_points_are_always_unavailable() {
        let index = index(&[("a", vec![point(&label(0), -80.0), point(&label(30), -81.0)])]);
        let result = Aligner::default().align(&[series("a", &[(0, false), (30, true)])], &index);

        let first = result.satellites[0].position_timeseries[0]
            .signal_quality
            .as_ref()
            .unwrap();
        assert!(first.is_unavailable());
        assert_eq!(rsrp(&result, 0, 1), Some(-81.0));
        assert_eq!(result.total_points, 2);
        assert_eq!(result.matched_points, 1);
        assert_eq!(result.match_rate(), 0.5);
    }

    #[test]
    fn missing_satellite_is_skipped() {
        let index = index(&[("a", vec![point(&label(0), -80.0)])]);
        let result = Aligner::default().align(
            &[series("a", &[(0, true)]), series("b", &[(0, true), (30, false)])],
            &index,
        );

        assert_eq!(result.skipped, vec!["b".to_string()]);
        assert_eq!(result.satellites.len(), 2);
        assert_eq!(result.total_points, 1);
        assert_eq!(result.match_rate(), 1.0);
        assert!(result.satellites[1]
            .position_timeseries
            .iter()
            .all(|p| p.signal_quality.is_none()));
    }

    #[test]
    fn malformed_candidates_never_match() {
        let index = index(&[("a", vec![point("garbage", -60.0), point("", -61.0)])]);
        let result = Aligner::default().align(&[series("a", &[(0, true)])], &index);

        assert_eq!(rsrp(&result, 0, 0), None);
        assert_eq!(result.matched_points, 0);
        assert_eq!(result.total_points, 1);
    }

    #[test]
    fn naive_candidate_timestamps_are_read_as_utc() {
        let naive = at(3).format("%Y-%m-%dT%H:%M:%S%.6f").to_string();
        let index = index(&[("a", vec![point(&naive, -79.0)])]);
        let result = Aligner::default().align(&[series("a", &[(0, true)])], &index);

        assert_eq!(rsrp(&result, 0, 0), Some(-79.0));
    }

    #[test]
    fn empty_inputs_have_zero_match_rate() {
        let result = Aligner::default().align(&[], &SignalIndex::default());
        assert_eq!(result.total_points, 0);
        assert_eq!(result.match_rate(), 0.0);
    }

    #[test]
    fn input_series_are_left_untouched() {
        let input = vec![series("a", &[(0, true)])];
        let index = index(&[("a", vec![point(&label(0), -80.0)])]);
        let _ = Aligner::default().align(&input, &index);

        assert!(input[0].position_timeseries[0].signal_quality.is_none());
    }

    #[test]
    fn fractional_seconds_match_exactly_in_order() {
        let raws = [
            "2025-11-03T06:00:00.500000+00:00",
            "2025-11-03T06:00:30.500000+00:00",
            "2025-11-03T06:01:00.500000+00:00",
        ];
        let index = index(&[(
            "a",
            vec![point(raws[0], -80.0), point(raws[1], -81.0), point(raws[2], -82.0)],
        )]);
        let result = Aligner::default().align(&[series_labelled("a", &raws)], &index);

        assert_eq!(rsrp(&result, 0, 0), Some(-80.0));
        assert_eq!(rsrp(&result, 0, 1), Some(-81.0));
        assert_eq!(rsrp(&result, 0, 2), Some(-82.0));
        assert_eq!(result.fuzzy_points, 0);
    }

    #[test]
    fn zulu_suffix_matches_exactly_against_the_same_spelling() {
        let raws = ["2025-11-03T06:00:00Z", "2025-11-03T06:00:30Z"];
        let index = index(&[("a", vec![point(raws[0], -70.0), point(raws[1], -71.0)])]);
        let result = Aligner::default().align(&[series_labelled("a", &raws)], &index);

        assert_eq!(rsrp(&result, 0, 0), Some(-70.0));
        assert_eq!(rsrp(&result, 0, 1), Some(-71.0));
        assert_eq!(result.fuzzy_points, 0);
    }

    #[test]
    fn differing_spellings_of_one_instant_fall_back_to_window() {
        let index = index(&[(
            "a",
            vec![
                point("2025-11-03T06:00:00.000000+00:00", -60.0),
                point("2025-11-03T06:00:20+00:00", -61.0),
            ],
        )]);
        let result =
            Aligner::default().align(&[series_labelled("a", &["2025-11-03T06:00:00Z"])], &index);

        assert_eq!(rsrp(&result, 0, 0), Some(-60.0));
        assert_eq!(result.fuzzy_points, 1);
    }

    #[test]
    fn repeated_timestamp_keeps_first_slot_and_last_quality() {
        let index = index(&[(
            "a",
            vec![
                point(&label(10), -95.0),
                point(&label(5), -85.0),
                point(&label(10), -70.0),
            ],
        )]);
        let result =
            Aligner::default().align(&[series("a", &[(0, true), (10, true)])], &index);

        // window around 0 holds both slots; the repeated stamp's slot is first
        assert_eq!(rsrp(&result, 0, 0), Some(-70.0));
        assert_eq!(rsrp(&result, 0, 1), Some(-70.0));
    }
}
