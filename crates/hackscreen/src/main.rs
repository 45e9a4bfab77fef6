#![forbid(unsafe_code)]

//! hackscreen binary entry point.

use hackscreen::cli;
use hackscreen::logging;
use hackscreen::runner::{self, Runner};

fn main() {
    let opts = cli::Opts::parse();

    if let Err(e) = logging::init(opts.log_file.as_deref()) {
        eprintln!("Failed to open log file: {e}");
        std::process::exit(1);
    }

    let result = Runner::new(opts).and_then(|runner| runner.run());
    match &result {
        Ok(outcome) => tracing::info!(?outcome, "exit"),
        Err(e) => {
            tracing::error!(error = %e, "run failed");
            eprintln!("hackscreen: {e}");
        }
    }
    std::process::exit(runner::exit_code(&result));
}
