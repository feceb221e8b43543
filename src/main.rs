use clap::Parser;
use mds_converter::cli::{self, Args};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = Args::parse();

    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .init();

    if let Err(e) = cli::run(&args) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
