//! Command line interface.

use crate::config::{ConvertConfig, ExistingFilePolicy};
use crate::converter::Converter;
use crate::models::ConversionStats;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

/// Convert MDS binary model output into NetCDF files.
#[derive(Parser, Debug)]
#[command(name = "mds-converter", version, about)]
pub struct Args {
    /// Fields to convert, comma separated (e.g. T,Rho,IceFract)
    #[arg(short, long, required = true, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Iterations to convert, comma separated; all discovered
    /// iterations when omitted
    #[arg(short = 'n', long, value_delimiter = ',')]
    pub iterations: Option<Vec<u64>>,

    /// Directory containing the .meta/.data pairs
    #[arg(short, long, default_value = ".")]
    pub input: PathBuf,

    /// Directory for the generated .nc files
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Overwrite existing output files instead of skipping them
    #[arg(long)]
    pub overwrite: bool,

    /// Read the cell-corner grid (XG/YG/RF) instead of cell centers
    #[arg(long)]
    pub corner_grid: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn to_config(&self) -> ConvertConfig {
        let mut config = ConvertConfig::default();
        if self.corner_grid {
            config = config.with_corner_grid();
        }
        if self.overwrite {
            config = config.with_on_exists(ExistingFilePolicy::Overwrite);
        }
        config
    }
}

/// Run a conversion from parsed arguments.
pub fn run(args: &Args) -> anyhow::Result<()> {
    let converter =
        Converter::new(&args.input, &args.output)?.with_config(args.to_config());
    let stats = converter.convert(&args.fields, args.iterations.as_deref())?;
    print_summary(&stats);

    if stats.iterations_failed > 0 {
        anyhow::bail!("{} iterations failed", stats.iterations_failed);
    }
    Ok(())
}

fn print_summary(stats: &ConversionStats) {
    println!();
    println!("{}", "Conversion complete".green().bold());
    println!(
        "  {} {}",
        "Converted:".cyan(),
        stats.iterations_converted
    );
    if stats.iterations_skipped > 0 {
        println!("  {} {}", "Skipped:".cyan(), stats.iterations_skipped);
    }
    if stats.iterations_failed > 0 {
        println!(
            "  {} {}",
            "Failed:".red(),
            stats.iterations_failed
        );
    }
    println!(
        "  {} {:.2}s",
        "Elapsed:".cyan(),
        stats.processing_time_ms as f64 / 1000.0
    );
}
