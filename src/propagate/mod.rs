mod error;
mod generator;
mod observer;
mod propagator;

pub use error::PropagateError;
pub use generator::generate_series;
pub use observer::Observer;
pub use propagator::{LookAngles, Propagator, Sgp4Propagator};
