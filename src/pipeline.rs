use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::output::{self, Provenance, TimeseriesDocument};
use crate::propagate::{generate_series, PropagateError, Sgp4Propagator};
use crate::signal::{Aligner, SignalIndex};
use crate::source::{LinkFeasibilityDocument, SignalDocument, SourceError, TleCatalog};
use crate::timeseries::{reconstruct_all, Constellation, CoverageReport, SeriesConfig, Timeline};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{0}")]
    Source(#[from] SourceError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Propagate(#[from] PropagateError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

fn write_document(doc: &TimeseriesDocument, path: &Path) -> Result<(), PipelineError> {
    doc.write(path).map_err(|e| PipelineError::Write {
        path: path.display().to_string(),
        source: e,
    })?;
    log::info!(
        "Wrote {} satellites ({} points each) to {}",
        doc.satellites.len(),
        doc.statistics.time_points,
        path.display()
    );
    Ok(())
}

/// Sparse link-feasibility windows → dense per-satellite document.
pub fn convert(
    config: &Config,
    document: &LinkFeasibilityDocument,
    source_name: &str,
    constellation: Constellation,
    out_dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let pool = document.pool(constellation);
    log::info!("{} pool: {} satellites", constellation, pool.len());
    if let Some(upstream) = document.upstream_coverage(constellation) {
        log::info!(
            "Upstream coverage: {} points, avg {:.1}, range {:?}-{:?}",
            upstream.total_time_points.unwrap_or_default(),
            upstream.avg_visible.unwrap_or_default(),
            upstream.min_visible,
            upstream.max_visible
        );
    }

    let timeline = Timeline::build(&pool);
    if timeline.is_empty() {
        log::warn!("{} pool has no observed instants", constellation);
    }
    log::info!(
        "Timeline: {} points, step {}s ({:.1} min)",
        timeline.len(),
        timeline.step_seconds(),
        timeline.period().num_seconds() as f64 / 60.0
    );

    let satellites = reconstruct_all(
        &timeline,
        &pool,
        constellation,
        config.min_elevation_deg(constellation),
    );

    let coverage = CoverageReport::compute(&satellites, &config.coverage.band);
    coverage.log_summary(&config.coverage);

    let doc = TimeseriesDocument::new(
        constellation,
        satellites,
        timeline.len(),
        timeline.step_seconds(),
        &coverage,
        &config.coverage,
        Provenance {
            generator: env!("CARGO_PKG_NAME"),
            description: format!(
                "{} {} full orbit period reconstructed from link feasibility windows",
                config.observer.name, constellation
            ),
            source: source_name.to_string(),
            warning: Some(
                "Full orbit period (visible and non-visible); frontend loops this period"
                    .to_string(),
            ),
        },
    );

    let path = output::timeseries_path(out_dir, constellation);
    write_document(&doc, &path)?;
    Ok(path)
}

/// Dense document + signal analysis → enhanced document.
pub fn enhance(
    config: &Config,
    signals: &SignalDocument,
    timeseries_dir: &Path,
    constellation: Constellation,
) -> Result<PathBuf, PipelineError> {
    let input = output::timeseries_path(timeseries_dir, constellation);
    if !input.is_file() {
        return Err(SourceError::NotFound {
            location: input.display().to_string(),
        }
        .into());
    }
    let doc = TimeseriesDocument::from_file(&input)?;
    log::info!(
        "Loaded {} {} satellites from {}",
        doc.satellites.len(),
        constellation,
        input.display()
    );

    let index = SignalIndex::build(signals.satellites(constellation));
    if index.is_empty() {
        log::warn!("Signal analysis has no {} satellites", constellation);
    }
    log::info!("Signal data for {} {} satellites", index.len(), constellation);

    let alignment = Aligner::new(config.alignment.tolerance).align(&doc.satellites, &index);
    if !alignment.skipped.is_empty() {
        log::warn!(
            "{} satellites without signal data: {}",
            alignment.skipped.len(),
            alignment.skipped.join(", ")
        );
    }

    let match_rate = alignment.match_rate();
    let doc = doc.enhance(
        alignment.satellites,
        &config.alignment.signal_quality_source,
        &config.alignment.signal_calculation_standard,
        match_rate,
    );

    let path = output::enhanced_path(timeseries_dir, constellation);
    write_document(&doc, &path)?;
    Ok(path)
}

/// Propagates the pool's satellites from TLEs instead of using the
/// engine's windows.
pub fn generate(
    config: &Config,
    document: &LinkFeasibilityDocument,
    source_name: &str,
    tle_dir: &Path,
    constellation: Constellation,
    start: DateTime<Utc>,
    out_dir: &Path,
) -> Result<PathBuf, PipelineError> {
    let ids = document.satellite_ids(constellation);
    let wanted: HashSet<String> = ids.iter().cloned().collect();
    let catalog = TleCatalog::load_latest(tle_dir, constellation, &wanted)?;
    if catalog.is_empty() {
        log::warn!("None of the {} pool satellites has a TLE", ids.len());
    }

    let observer = config.observer()?;
    log::info!(
        "Observer {} at ({}, {}), {} m",
        observer.name, observer.latitude_deg, observer.longitude_deg, observer.altitude_m
    );
    let mut propagator = Sgp4Propagator::new(observer);
    let series_config = SeriesConfig {
        min_elevation_deg: config.min_elevation_deg(constellation),
        time_step_seconds: config.generate.step.num_seconds(),
        time_points: config.generate.time_points(),
    };
    log::info!(
        "Propagating {} {} satellites from {} for {} points of {}s",
        catalog.len(),
        constellation,
        start,
        series_config.time_points,
        series_config.time_step_seconds
    );

    let mut satellites = Vec::with_capacity(ids.len());
    for id in &ids {
        let Some(entry) = catalog.get(id) else {
            log::warn!("No TLE for {} satellite {}, skipping", constellation, id);
            continue;
        };
        propagator.add(&entry.catalog_number, entry.elements.clone())?;
        let series = generate_series(
            &propagator,
            &entry.catalog_number,
            &entry.name,
            constellation,
            &series_config,
            start,
        )?;
        log::info!(
            "{} {}: {:.1}% visible",
            constellation, entry.name, series.statistics.visible_percentage
        );
        satellites.push(series);
    }

    let coverage = CoverageReport::compute(&satellites, &config.coverage.band);
    coverage.log_summary(&config.coverage);

    let doc = TimeseriesDocument::new(
        constellation,
        satellites,
        series_config.time_points,
        series_config.time_step_seconds,
        &coverage,
        &config.coverage,
        Provenance {
            generator: env!("CARGO_PKG_NAME"),
            description: format!(
                "{} {} visibility from SGP4 propagation of the candidate pool",
                config.observer.name, constellation
            ),
            source: format!("{} + {}", source_name, catalog.source().display()),
            warning: Some("Computed from TLE epoch data; not for real-time use".to_string()),
        },
    );

    let path = output::timeseries_path(out_dir, constellation);
    write_document(&doc, &path)?;
    Ok(path)
}

/// Re-checks a written document against the configured coverage target.
pub fn verify(config: &Config, path: &Path) -> Result<CoverageReport, PipelineError> {
    if !path.is_file() {
        return Err(SourceError::NotFound {
            location: path.display().to_string(),
        }
        .into());
    }
    let doc = TimeseriesDocument::from_file(path)?;
    let report = CoverageReport::compute(&doc.satellites, &config.coverage.band);
    log::info!(
        "{}: {} satellites, {} points",
        path.display(),
        doc.satellites.len(),
        report.time_points()
    );
    report.log_summary(&config.coverage);
    Ok(report)
}
