//! PGLabel command-line entry point.

use std::process::ExitCode;

use clap::Parser;
use pglabel::cli::{self, Cli};

fn main() -> ExitCode {
    let args = Cli::parse();

    // The log level comes from the config, so read it before logging starts.
    let config = cli::load_config(&args);
    let level = args.log_level.unwrap_or_else(|| {
        config
            .as_ref()
            .map(|c| c.preferences.log_level)
            .unwrap_or_default()
    });
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();

    let result = config.and_then(|config| cli::run(args, config));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
