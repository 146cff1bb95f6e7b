use anyhow::{Context, Result};
use clap::Parser;
use steer_cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Steering simulation starting...");
    if let Some(settings) = &args.settings {
        log::info!("Settings: {}", settings.display());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    steer_cli::run(&args, &mut out).context("Simulation error")?;

    Ok(())
}
