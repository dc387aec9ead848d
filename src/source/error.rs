use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no input found at {location}")]
    NotFound { location: String },
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error in {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
}

impl SourceError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
