//! Command line calculator for triple-axis spectrometers

mod args;
mod commands;

use args::{Cli, Command};
use clap::Parser;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    match &cli.command {
        Command::Angles(args) => commands::angles(args, cli.json),
        Command::Hkl(args) => commands::hkl(args, cli.json),
        Command::Bmatrix(args) => commands::bmatrix(args, cli.json),
        Command::Reso(args) => commands::reso(args, cli.json),
    }
}

/// Warnings by default, each `-v` adds a level
fn init_logging(cli: &Cli) -> Result<(), log::SetLoggerError> {
    stderrlog::new()
        .quiet(cli.quiet)
        .verbosity(usize::from(cli.verbose) + 1)
        .timestamp(stderrlog::Timestamp::Off)
        .init()
}
