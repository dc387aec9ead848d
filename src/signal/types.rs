use serde::{Deserialize, Serialize};

use crate::timeseries::SignalQuality;

/// One link-quality sample as produced upstream. The timestamp is kept
/// verbatim; it is only parsed when exact matching fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub timestamp: String,
    #[serde(default)]
    pub signal_quality: SignalQuality,
}
