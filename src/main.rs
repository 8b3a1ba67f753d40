// Entry point for the Minesweeper console application
// Initializes logging, configuration and best times, then runs the menu loop

use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::io;
use tracing_subscriber::EnvFilter;

use mswpr::msw_cli::Console;
use mswpr::msw_config::{Config, config_path, load_or_create_config};
use mswpr::msw_store::BestTimes;

fn main() -> Result<(), Box<dyn Error>> {
    // Logs go to stderr so they never interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    // Load or create user configuration (difficulty, policy, file locations)
    let path = config_path();
    let cfg = match &path {
        Some(path) => load_or_create_config(path),
        None => Config::default(),
    };

    let best = BestTimes::load_lenient(&cfg.best_times_path());

    let stdin = io::stdin();
    let mut console = Console::new(stdin.lock(), io::stdout(), cfg, best, StdRng::from_entropy());
    if let Some(path) = path {
        console = console.with_config_path(path);
    }
    console.run()?;
    Ok(())
}
