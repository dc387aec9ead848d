mod aligner;
mod types;

pub use aligner::{Aligner, Alignment, SignalIndex};
pub use types::SignalPoint;
