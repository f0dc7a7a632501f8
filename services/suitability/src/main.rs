//! Aquaculture suitability CLI.
//!
//! Loads the configured SST, bathymetry and EEZ inputs, runs the suitability
//! pipeline for one species and writes the maps. The text report goes to
//! stdout; logs go to stderr.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use suitability::{compute_suitability, Inputs, SpeciesParams, SuitabilityConfig};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "suitability")]
#[command(about = "Marine aquaculture suitability per Exclusive Economic Zone")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "SUITABILITY_CONFIG", default_value = "config/suitability.yaml")]
    config: PathBuf,

    /// Species preset from the configuration
    #[arg(short, long, default_value = "oyster")]
    species: String,

    /// Minimum mean SST in °C (ad-hoc species)
    #[arg(long, allow_negative_numbers = true)]
    temp_min: Option<f64>,

    /// Maximum mean SST in °C (ad-hoc species)
    #[arg(long, allow_negative_numbers = true)]
    temp_max: Option<f64>,

    /// Minimum depth in metres below sea level (ad-hoc species)
    #[arg(long)]
    depth_min: Option<f64>,

    /// Maximum depth in metres below sea level (ad-hoc species)
    #[arg(long)]
    depth_max: Option<f64>,

    /// Name of the ad-hoc species
    #[arg(long, default_value = "Custom species")]
    name: String,

    /// Output directory (overrides the configuration)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the JSON report instead of text
    #[arg(long)]
    json: bool,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Log output format
    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args)?;

    let mut config = SuitabilityConfig::load(&args.config)
        .with_context(|| format!("Failed to load configuration {}", args.config.display()))?;
    if let Some(dir) = &args.output_dir {
        config.output.dir = dir.clone();
    }

    let species = select_species(&args, &config)?;
    info!(
        species = %species.name,
        temp_c = ?(species.temp_min_c, species.temp_max_c),
        depth_m = ?(species.depth_min_m, species.depth_max_m),
        "Starting suitability run"
    );

    let inputs = Inputs::load(&config.inputs).context("Failed to load inputs")?;
    let outcome = compute_suitability(&inputs, &species, &config.pipeline())
        .with_context(|| format!("Suitability run for {} failed", species.name))?;

    let written = outcome.write(&config.output).context("Failed to write outputs")?;
    for path in &written {
        info!(path = %path.display(), "Output written");
    }

    if args.json {
        println!("{}", outcome.report.to_json()?);
    } else {
        print!("{}", outcome.report);
    }

    Ok(())
}

fn init_tracing(args: &Args) -> Result<()> {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    match args.log_format {
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
        LogFormat::Text => tracing::subscriber::set_global_default(builder.finish())?,
    }

    Ok(())
}

/// Ad-hoc bounds when given (all four required), otherwise the named preset.
fn select_species(args: &Args, config: &SuitabilityConfig) -> Result<SpeciesParams> {
    let species = match (args.temp_min, args.temp_max, args.depth_min, args.depth_max) {
        (Some(temp_min), Some(temp_max), Some(depth_min), Some(depth_max)) => {
            SpeciesParams::new(args.name.clone(), temp_min, temp_max, depth_min, depth_max)
        }
        (None, None, None, None) => config.preset(&args.species)?.clone(),
        _ => bail!("--temp-min, --temp-max, --depth-min and --depth-max must be given together"),
    };

    species.validate()?;
    Ok(species)
}
