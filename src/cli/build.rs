//! Function for building the command line hierarchy.

use super::{completions::create_completions_subcommand, locate::create_locate_subcommand};
use clap::{self, Arg, ArgAction, Command};

/// Build the `curvigrid` command line hierarchy.
pub fn build() -> Command {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about(clap::crate_description!())
        .disable_help_subcommand(true)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("timing")
                .short('t')
                .long("timing")
                .action(ArgAction::SetTrue)
                .help("Display elapsed time when done"),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print diagnostic log messages (overridden by RUST_LOG)"),
        )
        .subcommand(create_locate_subcommand())
        .subcommand(create_completions_subcommand())
}
