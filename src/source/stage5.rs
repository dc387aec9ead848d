use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::error::SourceError;
use super::read_json;
use crate::signal::SignalPoint;
use crate::timeseries::Constellation;

pub const FILE_PREFIX: &str = "stage5_signal_analysis_";

/// Signal-analysis output of the orbit engine, keyed by satellite id.
#[derive(Debug, Clone, Deserialize)]
pub struct SignalDocument {
    #[serde(default)]
    pub signal_analysis: BTreeMap<String, SignalSatellite>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignalSatellite {
    #[serde(default)]
    pub constellation: String,
    #[serde(default)]
    pub time_series: Vec<SignalPoint>,
}

impl SignalDocument {
    pub fn from_file(path: &Path) -> Result<Self, SourceError> {
        read_json(path)
    }

    pub fn satellites(
        &self,
        constellation: Constellation,
    ) -> impl Iterator<Item = (&str, &[SignalPoint])> {
        self.signal_analysis
            .iter()
            .filter(move |(_, sat)| sat.constellation.eq_ignore_ascii_case(constellation.as_ref()))
            .map(|(id, sat)| (id.as_str(), sat.time_series.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filters_by_constellation_case_insensitively() {
        let doc: SignalDocument = serde_json::from_value(json!({
            "signal_analysis": {
                "44713": {
                    "constellation": "Starlink",
                    "time_series": [{
                        "timestamp": "2025-11-03T06:02:30+00:00",
                        "signal_quality": { "rsrp_dbm": -88.1, "rsrq_db": -11.2, "rs_sinr_db": 9.4 }
                    }]
                },
                "63001": { "constellation": "ONEWEB", "time_series": [] }
            }
        }))
        .unwrap();

        let starlink: Vec<_> = doc.satellites(Constellation::Starlink).collect();
        assert_eq!(starlink.len(), 1);
        assert_eq!(starlink[0].0, "44713");
        assert_eq!(starlink[0].1[0].signal_quality.rsrp_dbm, Some(-88.1));

        let oneweb: Vec<_> = doc.satellites(Constellation::OneWeb).collect();
        assert_eq!(oneweb.len(), 1);
        assert!(oneweb[0].1.is_empty());
    }
}
