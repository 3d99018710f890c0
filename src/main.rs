//! Ethereum Vanity Address Search CLI
//!
//! Usage:
//!   eth_va -p 0xdead                 # Find addresses starting with "0xdead"
//!   eth_va -s beef -i                # Find addresses ending with "beef", any case
//!   eth_va -p 0xCafe -n 1 --password pw  # Save the first match to an encrypted keyfile

use std::process;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use eth_va::handler::{format_count, format_number};
use eth_va::{search, shutdown, Cancel, Config, Error, KeystoreExport, PoolSettings, SearchSettings};

fn main() {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // The only place a fatal error is logged
    if let Err(e) = run(&config) {
        error!("{}", e);
        process::exit(1);
    }
}

fn run(config: &Config) -> eth_va::Result<()> {
    config.validate()?;
    let pattern = config.pattern()?;

    let settings = SearchSettings {
        pool: PoolSettings {
            workers: config.worker_count(),
            flush_interval: config.flush_interval(),
        },
        report_interval: config.report_interval(),
        policy: config.match_policy(),
    };
    let export = config
        .export_secret()
        .map(|password| KeystoreExport::new(password, &config.output_dir));

    info!(
        "Generating address with {} workers, {}",
        settings.pool.workers, pattern
    );
    info!("Difficulty: {}", pattern.difficulty_description());
    if let Some(export) = &export {
        info!("Keyfiles:   {}", export.dir.display());
    }

    shutdown::install().map_err(Error::Spawn)?;
    info!("Searching... (Press Ctrl+C to stop)");

    let summary = search::run(&settings, &pattern, export, Cancel::new())?;

    info!("--- Final Statistics ---");
    info!("Total keys generated: {}", format_count(summary.keys));
    info!("Total matches found:  {}", summary.matches);
    info!("Time elapsed:         {:.2}s", summary.elapsed.as_secs_f64());
    info!(
        "Average speed:        {}/s",
        format_number(summary.keys_per_second() as u64)
    );

    Ok(())
}
