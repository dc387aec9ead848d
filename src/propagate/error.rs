use thiserror::Error;

#[derive(Debug, Error)]
pub enum PropagateError {
    #[error("no elements for satellite {0}")]
    UnknownSatellite(String),
    #[error("elements error: {0}")]
    Elements(#[from] sgp4::ElementsError),
    #[error("propagation error for {satellite}: {message}")]
    Propagation { satellite: String, message: String },
}
