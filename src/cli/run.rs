//! Function for running the command line program.

use super::{
    build, completions::run_completions_subcommand, locate::run_locate_subcommand,
};
use clap::ArgMatches;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Runs the `curvigrid` command line program.
pub fn run() {
    run_with_args(build::build().get_matches());
}

/// Runs the `curvigrid` command line program with the given parsed arguments.
pub fn run_with_args(arguments: ArgMatches) {
    init_logging(arguments.get_flag("debug"));

    let start_instant = Instant::now();

    match arguments.subcommand() {
        Some(("locate", locate_arguments)) => run_locate_subcommand(locate_arguments),
        Some(("completions", completions_arguments)) => {
            run_completions_subcommand(completions_arguments)
        }
        _ => {}
    }

    if arguments.get_flag("timing") {
        println!("Elapsed time: {} s", start_instant.elapsed().as_secs_f64());
    }
}

/// Sends log messages to standard error, filtered by `RUST_LOG` if set.
fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    // A subscriber may already be installed when running repeatedly in-process
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
