use super::timeline::Timeline;
use super::types::{
    Constellation, DenseSample, PoolSatellite, SatelliteSeries, SeriesConfig, SeriesStatistics,
};

/// Expands one satellite's windows over the full timeline.
///
/// Offsets are `index × step` rather than the elapsed time between
/// observations, so a timeline with uneven spacing still plays back at a
/// constant cadence.
pub fn reconstruct(
    timeline: &Timeline,
    satellite: &PoolSatellite,
    constellation: Constellation,
    min_elevation_deg: f64,
) -> SatelliteSeries {
    let step = timeline.step_seconds();

    let position_timeseries: Vec<DenseSample> = timeline
        .points()
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let offset = i as i64 * step;
            match timeline.lookup(point.instant(), &satellite.satellite_id) {
                Some(sample) => DenseSample::observed(point.clone(), offset, sample),
                None => DenseSample::below_horizon(point.clone(), offset),
            }
        })
        .collect();

    let statistics = SeriesStatistics::from_samples(&position_timeseries);

    SatelliteSeries {
        id: satellite.satellite_id.clone(),
        name: satellite.name.clone(),
        constellation,
        config: SeriesConfig {
            min_elevation_deg,
            time_step_seconds: step,
            time_points: timeline.len(),
        },
        statistics,
        position_timeseries,
    }
}

/// Reconstructs every satellite in the pool, in pool order.
pub fn reconstruct_all(
    timeline: &Timeline,
    pool: &[PoolSatellite],
    constellation: Constellation,
    min_elevation_deg: f64,
) -> Vec<SatelliteSeries> {
    let series: Vec<SatelliteSeries> = pool
        .iter()
        .enumerate()
        .map(|(i, satellite)| {
            if (i + 1) % 10 == 0 {
                log::debug!("Reconstructed {}/{} satellites", i + 1, pool.len());
            }
            reconstruct(timeline, satellite, constellation, min_elevation_deg)
        })
        .collect();

    let never_visible = series
        .iter()
        .filter(|s| s.statistics.visible_points == 0)
        .count();
    if never_visible > 0 {
        log::info!(
            "{} of {} {} satellites are never visible in this period",
            never_visible,
            series.len(),
            constellation
        );
    }

    series
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeseries::types::SparseSample;
    use crate::timeseries::utils::Timestamp;
    use chrono::{TimeZone, Utc};

    fn at(secs: i64) -> Timestamp {
        Utc.timestamp_opt(1_762_149_600 + secs, 0).unwrap().into()
    }

    fn sample(secs: i64, elevation: f64, azimuth: f64, range: f64) -> SparseSample {
        SparseSample {
            timestamp: at(secs),
            elevation_deg: elevation,
            azimuth_deg: azimuth,
            range_km: range,
            connectable: true,
        }
    }

    fn satellite(id: &str, samples: Vec<SparseSample>) -> PoolSatellite {
        PoolSatellite {
            satellite_id: id.to_string(),
            name: format!("STARLINK-{}", id),
            samples,
        }
    }

    #[test]
    fn interleaved_windows_fill_with_sentinels() {
        let pool = vec![
            satellite(
                "x",
                vec![sample(0, 15.0, 90.0, 800.0), sample(60, 25.0, 100.0, 700.0)],
            ),
            satellite("y", vec![sample(30, 35.0, 200.0, 600.0)]),
        ];
        let timeline = Timeline::build(&pool);
        let series = reconstruct_all(&timeline, &pool, Constellation::Starlink, 5.0);

        let x: Vec<bool> = series[0].position_timeseries.iter().map(|p| p.is_visible).collect();
        let y: Vec<bool> = series[1].position_timeseries.iter().map(|p| p.is_visible).collect();
        assert_eq!(x, vec![true, false, true]);
        assert_eq!(y, vec![false, true, false]);

        assert!(series[0].position_timeseries[1].is_sentinel());
        assert!(series[1].position_timeseries[0].is_sentinel());
        assert!(series[1].position_timeseries[2].is_sentinel());
        assert_eq!(series[1].position_timeseries[1].elevation_deg, 35.0);
    }

    #[test]
    fn observed_values_are_rounded_and_sentinels_are_fixed() {
        let pool = vec![
            satellite("a", vec![sample(0, 12.3456, 271.119, 1023.987)]),
            satellite("b", vec![sample(30, 50.0, 0.0, 550.0)]),
        ];
        let timeline = Timeline::build(&pool);
        let series = reconstruct(&timeline, &pool[0], Constellation::Starlink, 5.0);

        let observed = &series.position_timeseries[0];
        assert!(observed.is_visible);
        assert_eq!(observed.elevation_deg, 12.35);
        assert_eq!(observed.azimuth_deg, 271.12);
        assert_eq!(observed.range_km, 1023.99);

        let missing = &series.position_timeseries[1];
        assert!(!missing.is_visible);
        assert_eq!(missing.elevation_deg, -90.0);
        assert_eq!(missing.azimuth_deg, 0.0);
        assert_eq!(missing.range_km, 9999.0);
        assert_eq!(missing.time, at(30));
    }

    #[test]
    fn every_series_spans_the_timeline() {
        let pool = vec![
            satellite("a", vec![sample(0, 10.0, 1.0, 1.0)]),
            satellite("b", vec![sample(30, 10.0, 1.0, 1.0), sample(90, 10.0, 1.0, 1.0)]),
            satellite("c", vec![sample(60, 10.0, 1.0, 1.0)]),
        ];
        let timeline = Timeline::build(&pool);
        let series = reconstruct_all(&timeline, &pool, Constellation::OneWeb, 10.0);

        for s in &series {
            assert_eq!(s.position_timeseries.len(), timeline.len());
            assert_eq!(s.config.time_points, timeline.len());
            for (p, t) in s.position_timeseries.iter().zip(timeline.points()) {
                assert_eq!(&p.time, t);
            }
        }
    }

    #[test]
    fn offsets_follow_index_not_wall_clock() {
        // 0s, 30s, then a 100s gap
        let pool = vec![satellite(
            "a",
            vec![
                sample(0, 10.0, 1.0, 1.0),
                sample(30, 10.0, 1.0, 1.0),
                sample(130, 10.0, 1.0, 1.0),
            ],
        )];
        let timeline = Timeline::build(&pool);
        let series = reconstruct(&timeline, &pool[0], Constellation::Starlink, 5.0);

        let offsets: Vec<i64> = series
            .position_timeseries
            .iter()
            .map(|p| p.time_offset_seconds)
            .collect();
        assert_eq!(offsets, vec![0, 30, 60]);
    }

    #[test]
    fn satellite_without_samples_is_all_sentinel() {
        let pool = vec![
            satellite("seen", vec![sample(0, 10.0, 1.0, 1.0), sample(30, 20.0, 1.0, 1.0)]),
            satellite("silent", vec![]),
        ];
        let timeline = Timeline::build(&pool);
        let series = reconstruct_all(&timeline, &pool, Constellation::Starlink, 5.0);

        assert_eq!(series.len(), 2);
        let silent = &series[1];
        assert_eq!(silent.id, "silent");
        assert_eq!(silent.position_timeseries.len(), 2);
        assert!(silent.position_timeseries.iter().all(|p| p.is_sentinel()));
        assert_eq!(silent.statistics.visible_points, 0);
        assert_eq!(silent.statistics.visible_percentage, 0.0);
        assert_eq!(silent.statistics.max_elevation, 0.0);
    }

    #[test]
    fn statistics_cover_visible_entries() {
        let pool = vec![
            satellite("a", vec![sample(0, 10.0, 1.0, 1.0), sample(60, 44.444, 1.0, 1.0)]),
            satellite("b", vec![sample(30, 80.0, 1.0, 1.0)]),
        ];
        let timeline = Timeline::build(&pool);
        let series = reconstruct(&timeline, &pool[0], Constellation::Starlink, 5.0);

        assert_eq!(series.statistics.visible_points, 2);
        assert_eq!(series.statistics.visible_percentage, 66.67);
        assert_eq!(series.statistics.max_elevation, 44.44);
        assert_eq!(series.config.min_elevation_deg, 5.0);
        assert_eq!(series.config.time_step_seconds, 30);
    }

    #[test]
    fn empty_timeline_gives_empty_series() {
        let pool = vec![satellite("a", vec![])];
        let timeline = Timeline::build(&pool);
        let series = reconstruct(&timeline, &pool[0], Constellation::Starlink, 5.0);

        assert!(series.position_timeseries.is_empty());
        assert_eq!(series.statistics.visible_percentage, 0.0);
    }

    #[test]
    fn upstream_spelling_survives_into_series() {
        let raws = [
            "2025-11-03T06:00:00.500000+00:00",
            "2025-11-03T06:00:30.500000+00:00",
            "2025-11-03T06:01:00.5Z",
        ];
        let samples: Vec<SparseSample> = raws
            .iter()
            .map(|raw| SparseSample {
                timestamp: Timestamp::parse(raw).unwrap(),
                elevation_deg: 20.0,
                azimuth_deg: 10.0,
                range_km: 800.0,
                connectable: true,
            })
            .collect();
        let pool = vec![satellite("a", samples)];
        let timeline = Timeline::build(&pool);
        let series = reconstruct(&timeline, &pool[0], Constellation::Starlink, 5.0);

        let written: Vec<&str> = series
            .position_timeseries
            .iter()
            .map(|p| p.time.as_str())
            .collect();
        assert_eq!(written, raws);

        let json = serde_json::to_value(&series.position_timeseries[1]).unwrap();
        assert_eq!(json["time"], "2025-11-03T06:00:30.500000+00:00");
    }
}
