use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use super::error::PropagateError;
use super::observer::Observer;

/// Topocentric position of a satellite seen from the observer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LookAngles {
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub range_km: f64,
}

/// Source of look angles for a satellite at an instant.
pub trait Propagator {
    fn look_angles(
        &self,
        satellite_id: &str,
        instant: DateTime<Utc>,
    ) -> Result<LookAngles, PropagateError>;
}

pub struct Sgp4Propagator {
    observer: Observer,
    satellites: HashMap<String, (Elements, Constants)>,
}

impl Sgp4Propagator {
    pub fn new(observer: Observer) -> Self {
        Self {
            observer,
            satellites: HashMap::new(),
        }
    }

    pub fn add(&mut self, satellite_id: &str, elements: Elements) -> Result<(), PropagateError> {
        let constants = Constants::from_elements(&elements)?;
        self.satellites
            .insert(satellite_id.to_string(), (elements, constants));
        Ok(())
    }
}

impl Propagator for Sgp4Propagator {
    fn look_angles(
        &self,
        satellite_id: &str,
        instant: DateTime<Utc>,
    ) -> Result<LookAngles, PropagateError> {
        let (elements, constants) = self
            .satellites
            .get(satellite_id)
            .ok_or_else(|| PropagateError::UnknownSatellite(satellite_id.to_string()))?;

        let propagation_error = |message: String| PropagateError::Propagation {
            satellite: satellite_id.to_string(),
            message,
        };

        let naive = instant.naive_utc();
        let minutes = elements
            .datetime_to_minutes_since_epoch(&naive)
            .map_err(|e| propagation_error(e.to_string()))?;
        let prediction = constants
            .propagate(minutes)
            .map_err(|e| propagation_error(e.to_string()))?;

        let gmst = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&naive));
        let sat_ecef = teme_to_ecef(prediction.position, gmst);
        let obs_ecef = self.observer.position_ecef_km();

        let dr = [
            sat_ecef[0] - obs_ecef[0],
            sat_ecef[1] - obs_ecef[1],
            sat_ecef[2] - obs_ecef[2],
        ];
        let range_km = (dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2]).sqrt();
        let [east, north, up] = self.observer.enu(dr);

        Ok(LookAngles {
            elevation_deg: if range_km > 0.0 {
                (up / range_km).asin().to_degrees()
            } else {
                0.0
            },
            azimuth_deg: east.atan2(north).to_degrees().rem_euclid(360.0),
            range_km,
        })
    }
}

fn teme_to_ecef(pos: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_g, cos_g) = gmst.sin_cos();
    [
        pos[0] * cos_g + pos[1] * sin_g,
        -pos[0] * sin_g + pos[1] * cos_g,
        pos[2],
    ]
}
