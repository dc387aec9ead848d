mod config;
mod output;
mod pipeline;
mod propagate;
mod signal;
mod source;
mod timeseries;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

use crate::config::Config;
use crate::pipeline::PipelineError;
use crate::source::{resolve_input, stage4, stage5, LinkFeasibilityDocument, SignalDocument};
use crate::timeseries::Constellation;

#[derive(Parser)]
#[command(name = "sat-timeseries")]
#[command(about = "Satellite visibility timeseries reconstruction")]
struct Cli {
    /// YAML configuration file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Selection {
    /// Constellation to process
    #[arg(short, long, value_enum, default_value_t = Constellation::Starlink)]
    constellation: Constellation,

    /// Process every known constellation
    #[arg(short, long, conflicts_with = "constellation")]
    all: bool,
}

impl Selection {
    fn constellations(&self) -> Vec<Constellation> {
        if self.all {
            Constellation::ALL.to_vec()
        } else {
            vec![self.constellation]
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild full-period series from link feasibility windows
    Convert {
        /// Link feasibility output, or a directory holding them
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long, default_value = "public/data")]
        out_dir: PathBuf,
        #[command(flatten)]
        selection: Selection,
    },
    /// Merge signal quality into previously converted series
    Enhance {
        #[arg(short, long, default_value = "public/data")]
        timeseries_dir: PathBuf,
        /// Signal analysis output, or a directory holding them
        #[arg(short, long)]
        signal: PathBuf,
        #[command(flatten)]
        selection: Selection,
    },
    /// Propagate the candidate pool from TLEs
    Generate {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(long)]
        tle_dir: PathBuf,
        #[arg(short, long, default_value = "public/data")]
        out_dir: PathBuf,
        /// Start of the propagation window (RFC 3339, defaults to now)
        #[arg(long)]
        start: Option<DateTime<Utc>>,
        #[command(flatten)]
        selection: Selection,
    },
    /// Check a written series document against the coverage target
    Verify { timeseries: PathBuf },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match Config::load(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Convert {
            input,
            out_dir,
            selection,
        } => convert(&config, &input, &out_dir, &selection),
        Commands::Enhance {
            timeseries_dir,
            signal,
            selection,
        } => enhance(&config, &timeseries_dir, &signal, &selection),
        Commands::Generate {
            input,
            tle_dir,
            out_dir,
            start,
            selection,
        } => generate(
            &config,
            &input,
            &tle_dir,
            &out_dir,
            start.unwrap_or_else(Utc::now),
            &selection,
        ),
        Commands::Verify { timeseries } => verify(&config, &timeseries),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_pool(input: &Path) -> Result<(LinkFeasibilityDocument, String), PipelineError> {
    let path = resolve_input(input, stage4::FILE_PREFIX)?;
    let document = LinkFeasibilityDocument::from_file(&path)?;
    let name = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    Ok((document, name))
}

fn convert(
    config: &Config,
    input: &Path,
    out_dir: &Path,
    selection: &Selection,
) -> Result<ExitCode, PipelineError> {
    let (document, name) = load_pool(input)?;
    for constellation in selection.constellations() {
        let path = pipeline::convert(config, &document, &name, constellation, out_dir)?;
        println!("{}: {}", constellation, path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn enhance(
    config: &Config,
    timeseries_dir: &Path,
    signal: &Path,
    selection: &Selection,
) -> Result<ExitCode, PipelineError> {
    let path = resolve_input(signal, stage5::FILE_PREFIX)?;
    let signals = SignalDocument::from_file(&path)?;
    for constellation in selection.constellations() {
        let path = pipeline::enhance(config, &signals, timeseries_dir, constellation)?;
        println!("{}: {}", constellation, path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn generate(
    config: &Config,
    input: &Path,
    tle_dir: &Path,
    out_dir: &Path,
    start: DateTime<Utc>,
    selection: &Selection,
) -> Result<ExitCode, PipelineError> {
    let (document, name) = load_pool(input)?;
    for constellation in selection.constellations() {
        let path = pipeline::generate(
            config,
            &document,
            &name,
            tle_dir,
            constellation,
            start,
            out_dir,
        )?;
        println!("{}: {}", constellation, path.display());
    }
    Ok(ExitCode::SUCCESS)
}

fn verify(config: &Config, path: &Path) -> Result<ExitCode, PipelineError> {
    let report = pipeline::verify(config, path)?;
    println!(
        "avg {:.1}, range {}-{}, achievement {:.1}%",
        report.average,
        report.min,
        report.max,
        report.achievement_rate * 100.0
    );
    if report.meets(&config.coverage) {
        println!("Coverage target met");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("Coverage target not met");
        Ok(ExitCode::FAILURE)
    }
}
