mod discovery;
mod error;
pub mod stage4;
pub mod stage5;
mod tle;

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::de::DeserializeOwned;

pub use discovery::resolve_input;
pub use error::SourceError;
pub use stage4::LinkFeasibilityDocument;
pub use stage5::SignalDocument;
pub use tle::{TleCatalog, TleEntry};

#[cfg(test)]
pub(crate) use tle::tests::{ISS_LINE1, ISS_LINE2};

pub(crate) fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let file = File::open(path).map_err(|e| SourceError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| SourceError::Json {
        path: path.display().to_string(),
        source: e,
    })
}
