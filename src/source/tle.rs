use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use sgp4::Elements;

use super::error::SourceError;
use crate::timeseries::Constellation;

pub struct TleEntry {
    pub name: String,
    pub catalog_number: String,
    pub elements: Elements,
}

/// Two-line element sets for one constellation, keyed by catalog number.
pub struct TleCatalog {
    source: PathBuf,
    entries: HashMap<String, TleEntry>,
}

impl TleCatalog {
    /// Loads the newest `<constellation>_*.tle` file in `dir`, keeping only
    /// the satellites listed in `wanted`. File names embed the download
    /// date, so the lexicographically last name is the newest.
    pub fn load_latest(
        dir: &Path,
        constellation: Constellation,
        wanted: &HashSet<String>,
    ) -> Result<Self, SourceError> {
        let prefix = format!("{}_", constellation);
        let not_found = || SourceError::NotFound {
            location: format!("{}/{}*.tle", dir.display(), prefix),
        };

        if !dir.is_dir() {
            return Err(not_found());
        }

        let mut candidates = Vec::new();
        for entry in fs::read_dir(dir).map_err(|e| SourceError::io(dir, e))? {
            let path = entry.map_err(|e| SourceError::io(dir, e))?.path();
            let is_tle = path.is_file()
                && path.extension().is_some_and(|ext| ext == "tle")
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix));
            if is_tle {
                candidates.push(path);
            }
        }
        candidates.sort();
        let source = candidates.pop().ok_or_else(not_found)?;
        log::info!("Using {} TLE: {}", constellation, source.display());

        let content = fs::read_to_string(&source).map_err(|e| SourceError::io(&source, e))?;
        let filename = source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let mut entries = HashMap::new();
        for (name, line1, line2) in parse_multi_tle(&content) {
            let catalog_number = catalog_number(&line1);
            if !wanted.contains(&catalog_number) {
                continue;
            }

            let elements = match Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes())
            {
                Ok(e) => e,
                Err(e) => {
                    log::warn!(
                        "{}",
                        SourceError::InvalidTle {
                            file: filename.clone(),
                            message: format!("{}: {}", catalog_number, e),
                        }
                    );
                    continue;
                }
            };

            let name = name.unwrap_or_else(|| format!("NORAD {}", catalog_number));
            entries.insert(
                catalog_number.clone(),
                TleEntry {
                    name,
                    catalog_number,
                    elements,
                },
            );
        }

        log::info!("Loaded TLE for {}/{} satellites", entries.len(), wanted.len());
        Ok(Self { source, entries })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn get(&self, catalog_number: &str) -> Option<&TleEntry> {
        self.entries.get(catalog_number)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Catalog number as written in column 3-7 of line 1, without the
/// classification letter.
fn catalog_number(line1: &str) -> String {
    line1
        .split_whitespace()
        .nth(1)
        .unwrap_or_default()
        .trim_end_matches(|c: char| c.is_ascii_alphabetic())
        .to_string()
}

/// Splits TLE text into (name, line1, line2), accepting both 2- and 3-line sets.
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            result.push((
                Some(lines[i].to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
