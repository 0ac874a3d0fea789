use std::path::PathBuf;

use clap::Parser;
use mrf_sieve::config::JobConfig;
use mrf_sieve::pipeline;

#[derive(Parser)]
#[command(name = "mrf-sieve")]
#[command(version)]
#[command(
    about = "Filter in-network-rate file URLs out of a price-transparency index by location and plan type",
    long_about = None
)]
struct Cli {
    /// Path to the TOML job configuration file
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let config = match JobConfig::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e.user_message());
            std::process::exit(1);
        }
    };

    match pipeline::run(&config) {
        Ok(summary) => {
            println!(
                "Done: {} urls written to {} ({} elements scanned, {} EINs, {} lookup failures)",
                summary.result_urls,
                config.output_file.display(),
                summary.elements_scanned,
                summary.eins,
                summary.lookup_failures,
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    }
}
