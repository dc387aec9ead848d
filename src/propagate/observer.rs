const WGS84_A_KM: f64 = 6378.137;
const WGS84_E2: f64 = 0.006_694_379_990_14;

/// Fixed ground observer on the WGS-84 ellipsoid.
#[derive(Debug, Clone, PartialEq)]
pub struct Observer {
    pub name: String,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Observer {
    /// Parses `"lat,lon"` in degrees.
    pub fn from_coordinates(name: &str, coordinates: &str, altitude_m: f64) -> Option<Self> {
        let mut parts = coordinates.split(',').map(str::trim);
        let latitude_deg = parts.next()?.parse().ok()?;
        let longitude_deg = parts.next()?.parse().ok()?;
        Some(Self {
            name: name.to_string(),
            latitude_deg,
            longitude_deg,
            altitude_m,
        })
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let (sin_lat, cos_lat) = self.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad().sin_cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        [
            (n + alt_km) * cos_lat * cos_lon,
            (n + alt_km) * cos_lat * sin_lon,
            (n * (1.0 - WGS84_E2) + alt_km) * sin_lat,
        ]
    }

    /// Rotates an ECEF offset from the observer into local east/north/up.
    pub fn enu(&self, dr: [f64; 3]) -> [f64; 3] {
        let (sin_lat, cos_lat) = self.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad().sin_cos();
        [
            -sin_lon * dr[0] + cos_lon * dr[1],
            -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2],
            cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2],
        ]
    }
}
