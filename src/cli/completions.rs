//! Command line interface for generating a command line completion script.

use super::build;
use clap::{value_parser, Arg, ArgMatches, Command};
use clap_complete::Shell;
use std::io;

/// Creates a subcommand for generating a completion script.
pub fn create_completions_subcommand() -> Command {
    Command::new("completions")
        .about("Generate tab-completion script for your shell")
        .hide(true)
        .arg(
            Arg::new("shell")
                .value_name("SHELL")
                .required(true)
                .value_parser(value_parser!(Shell))
                .help("The shell to generate the script for"),
        )
        .after_help(
            r#"DISCUSSION
    The script is written to `stdout`, so it can be redirected to a file
    in a location where your shell picks up completions.

    BASH:

        $ mkdir -p ~/.local/share/bash-completion/completions
        $ curvigrid completions bash > ~/.local/share/bash-completion/completions/curvigrid

    ZSH:

        $ mkdir ~/.zfunc
        $ curvigrid completions zsh > ~/.zfunc/_curvigrid

    and add `fpath+=~/.zfunc` to your `.zshrc` before `compinit`.

    FISH:

        $ mkdir -p ~/.config/fish/completions
        $ curvigrid completions fish > ~/.config/fish/completions/curvigrid.fish"#,
        )
}

/// Runs the actions for the `completions` subcommand using the given arguments.
pub fn run_completions_subcommand(arguments: &ArgMatches) {
    let shell = *arguments
        .get_one::<Shell>("shell")
        .expect("No value for required argument");
    let mut command = build::build();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut io::stdout());
}
