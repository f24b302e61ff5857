//! reflbin command-line interface.
//!
//! Joins, rebins and flattens reflectometry measurement records stored as
//! JSON.
#![allow(clippy::uninlined_format_args, clippy::too_many_lines)]

use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info};

use reflbin_algorithms::{join_records, nobin, rebin, rebin_banks, sort_records, RecordOrder};
use reflbin_core::{
    linear_centers, BinEdges, MeasurementRecord, MergeConfig, MergeWeight, RebinConfig,
};
use reflbin_io::{read_records, write_records};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    ReflbinIo(#[from] reflbin_io::Error),

    #[error("Core error: {0}")]
    Core(#[from] reflbin_core::Error),

    #[error("no input records")]
    NoInput,
}

/// Averaging weight selection.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Weight {
    /// Monitor for monitor-normalized data, time for time-normalized data
    Norm,
    /// Monitor counts
    Monitor,
    /// Count time
    Time,
    /// Intensity
    Intensity,
}

impl From<Weight> for MergeWeight {
    fn from(weight: Weight) -> Self {
        match weight {
            Weight::Norm => MergeWeight::NormBasis,
            Weight::Monitor => MergeWeight::Monitor,
            Weight::Time => MergeWeight::Time,
            Weight::Intensity => MergeWeight::Intensity,
        }
    }
}

/// Record order before joining.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum Order {
    File,
    Time,
    Theta,
    Slit,
    None,
}

impl From<Order> for RecordOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::File => RecordOrder::File,
            Order::Time => RecordOrder::Time,
            Order::Theta => RecordOrder::Theta,
            Order::Slit => RecordOrder::Slit,
            Order::None => RecordOrder::None,
        }
    }
}

/// Reflectometry point merging and Q rebinning.
#[derive(Parser)]
#[command(name = "reflbin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join records, merging points measured at the same configuration
    Join {
        /// Input record file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.json for records, otherwise Q dQ R dR columns)
        #[arg(short, long)]
        output: PathBuf,

        /// Angle and wavelength tolerance as a fraction of the resolution
        #[arg(long, default_value = "0.5")]
        qtol: f64,

        /// Resolution tolerance as a fraction of the resolution
        #[arg(long, default_value = "0.002")]
        dqtol: f64,

        /// Weight for averaging geometry columns
        #[arg(long, value_enum, default_value = "norm")]
        weight: Weight,

        /// Record order before joining
        #[arg(long, value_enum, default_value = "none")]
        order: Order,
    },

    /// Rebin records onto a linear Q grid
    Rebin {
        /// Input record file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.json for records, otherwise Q dQ R dR columns)
        #[arg(short, long)]
        output: PathBuf,

        /// First bin center
        #[arg(long)]
        q_min: f64,

        /// Last bin center
        #[arg(long)]
        q_max: f64,

        /// Bin center spacing
        #[arg(long)]
        q_step: f64,

        /// Incident angle offset in degrees
        #[arg(long)]
        theta_offset: Option<f64>,

        /// Sample broadening in degrees
        #[arg(long)]
        broadening: Option<f64>,

        /// Detector bank to keep
        #[arg(long, default_value = "0", conflicts_with = "all_banks")]
        bank: usize,

        /// Keep every detector bank
        #[arg(long)]
        all_banks: bool,
    },

    /// Flatten points into a single Q-sorted record with no combination
    Nobin {
        /// Input record file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.json for records, otherwise Q dQ R dR columns)
        #[arg(short, long)]
        output: PathBuf,

        /// Detector bank to keep
        #[arg(long, default_value = "0")]
        bank: usize,
    },

    /// Show information about record files
    Info {
        /// Input record file(s)
        #[arg(required = true)]
        input: Vec<PathBuf>,
    },
}

fn load(input: &[PathBuf]) -> Result<Vec<MeasurementRecord>> {
    let mut records = Vec::new();
    for path in input {
        let loaded = read_records(path)?;
        debug!("read {} record(s) from {}", loaded.len(), path.display());
        records.extend(loaded);
    }
    if records.is_empty() {
        return Err(CliError::NoInput);
    }
    Ok(records)
}

fn save(output: &Path, records: &[MeasurementRecord]) -> Result<()> {
    write_records(output, records)?;
    info!("wrote {} record(s) to {}", records.len(), output.display());
    Ok(())
}

fn print_info(path: &Path, records: &[MeasurementRecord]) {
    println!("File: {}", path.display());
    println!("  Records: {}", records.len());
    for data in records {
        println!("  {}:", data.label());
        println!("    Intent:        {}", data.intent);
        println!("    Normalized by: {}", data.norm_basis);
        println!("    Points:        {}", data.points());
        println!("    Banks:         {}", data.bank_count());
        if let Ok(q) = data.q_values() {
            let (lo, hi) = q
                .iter()
                .filter(|q| q.is_finite())
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &q| {
                    (lo.min(q), hi.max(q))
                });
            if lo <= hi {
                println!("    Q range:       {:.6} .. {:.6}", lo, hi);
            }
        }
        if !data.environment.is_empty() {
            let names: Vec<&str> = data.environment.keys().map(String::as_str).collect();
            println!("    Environment:   {}", names.join(", "));
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    match cli.command {
        Commands::Join {
            input,
            output,
            qtol,
            dqtol,
            weight,
            order,
        } => {
            let start = Instant::now();
            let mut records = load(&input)?;
            sort_records(&mut records, order.into());

            let config = MergeConfig::new()
                .with_q_tolerance(qtol)
                .with_dq_tolerance(dqtol)
                .with_weight(weight.into());
            let points: usize = records.iter().map(MeasurementRecord::points).sum();
            let joined = join_records(&records, &config)?;

            if cli.verbose {
                eprintln!(
                    "Joined {} record(s): {} -> {} points in {:.2?}",
                    records.len(),
                    points,
                    joined.points(),
                    start.elapsed()
                );
            }
            save(&output, &[joined])?;
        }

        Commands::Rebin {
            input,
            output,
            q_min,
            q_max,
            q_step,
            theta_offset,
            broadening,
            bank,
            all_banks,
        } => {
            let start = Instant::now();
            let records = load(&input)?;

            let centers = linear_centers(q_min, q_max, q_step);
            let edges = BinEdges::from_centers(&centers, true)?;
            let mut config = RebinConfig::new().with_bank(bank);
            config.theta_offset = theta_offset;
            config.sample_broadening = broadening;

            let binned = if all_banks {
                rebin_banks(&records, &edges, &config)?
            } else {
                vec![rebin(&records, &edges, &config)?]
            };

            if cli.verbose {
                eprintln!(
                    "Rebinned onto {} bins: {} record(s), {} points in {:.2?}",
                    centers.len(),
                    binned.len(),
                    binned.iter().map(MeasurementRecord::points).sum::<usize>(),
                    start.elapsed()
                );
            }
            save(&output, &binned)?;
        }

        Commands::Nobin {
            input,
            output,
            bank,
        } => {
            let records = load(&input)?;
            let flat = nobin(&records, bank)?;
            if cli.verbose {
                eprintln!("Flattened {} points", flat.points());
            }
            save(&output, &[flat])?;
        }

        Commands::Info { input } => {
            for path in &input {
                let records = read_records(path)?;
                print_info(path, &records);
            }
        }
    }

    Ok(())
}
