use chrono::{DateTime, Duration, Utc};

use super::error::PropagateError;
use super::propagator::Propagator;
use crate::timeseries::utils::round2;
use crate::timeseries::{Constellation, DenseSample, SatelliteSeries, SeriesConfig, SeriesStatistics};

/// Samples a satellite at `config.time_points` instants spaced
/// `config.time_step_seconds` apart, starting at `start`.
///
/// Unlike windows reconstructed from the orbit engine, every point carries
/// propagated values; visibility is the elevation threshold alone.
pub fn generate_series<P: Propagator>(
    propagator: &P,
    satellite_id: &str,
    name: &str,
    constellation: Constellation,
    config: &SeriesConfig,
    start: DateTime<Utc>,
) -> Result<SatelliteSeries, PropagateError> {
    let position_timeseries = (0..config.time_points)
        .map(|i| {
            let offset = i as i64 * config.time_step_seconds;
            let time = start + Duration::seconds(offset);
            let angles = propagator.look_angles(satellite_id, time)?;
            Ok(DenseSample {
                time: time.into(),
                time_offset_seconds: offset,
                elevation_deg: round2(angles.elevation_deg),
                azimuth_deg: round2(angles.azimuth_deg),
                range_km: round2(angles.range_km),
                is_visible: angles.elevation_deg >= config.min_elevation_deg,
                signal_quality: None,
            })
        })
        .collect::<Result<Vec<_>, PropagateError>>()?;

    Ok(SatelliteSeries {
        id: satellite_id.to_string(),
        name: name.to_string(),
        constellation,
        config: config.clone(),
        statistics: SeriesStatistics::from_samples(&position_timeseries),
        position_timeseries,
    })
}
