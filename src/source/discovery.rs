use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::error::SourceError;

/// Resolves an input argument to a concrete file.
///
/// A file is returned as-is. A directory resolves to the most recently
/// modified `<prefix>*.json` inside it.
pub fn resolve_input(path: &Path, prefix: &str) -> Result<PathBuf, SourceError> {
    if path.is_file() {
        return Ok(path.to_path_buf());
    }

    let not_found = || SourceError::NotFound {
        location: format!("{}/{}*.json", path.display(), prefix),
    };

    if !path.is_dir() {
        return Err(not_found());
    }

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in path.read_dir().map_err(|e| SourceError::io(path, e))? {
        let entry = entry.map_err(|e| SourceError::io(path, e))?;
        let candidate = entry.path();

        let matches = candidate.is_file()
            && candidate.extension().is_some_and(|ext| ext == "json")
            && candidate
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix));
        if !matches {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .map_err(|e| SourceError::io(&candidate, e))?;

        if latest.as_ref().map_or(true, |(t, _)| modified > *t) {
            latest = Some((modified, candidate));
        }
    }

    let (_, resolved) = latest.ok_or_else(not_found)?;
    log::info!("Selected latest input: {}", resolved.display());
    Ok(resolved)
}
