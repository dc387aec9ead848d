pub mod coverage;
pub mod dense;
pub mod timeline;
mod types;
pub mod utils;

pub use coverage::{CoverageReport, CoverageTarget, TargetBand};
pub use dense::{reconstruct, reconstruct_all};
pub use timeline::Timeline;
pub use types::*;
