use clap::{CommandFactory, Parser};
use class_scanner::cli::Cli;
use class_scanner::config::ScanConfig;
use class_scanner::introspect::BytecodeIntrospector;
use class_scanner::runner::ScanRunner;
use std::io::IsTerminal;
use std::process::ExitCode;
use tracing::{error, metadata::LevelFilter, warn};
use tracing_subscriber::{fmt, prelude::*};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.is_quiet());

    if cli.paths.is_empty() {
        if !cli.is_quiet() {
            println!("{}", Cli::command().render_help());
        }
        return ExitCode::SUCCESS;
    }

    let config = ScanConfig::from_cli(&cli);
    if config.inputs.is_empty() {
        warn!("No processable files or directories found in arguments.");
        return ExitCode::SUCCESS;
    }

    let stdout = std::io::stdout();
    let mut runner = ScanRunner::new(&config, BytecodeIntrospector::new(), stdout.lock());
    match runner.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Error processing files: {e:#}");
            ExitCode::from(1)
        }
    }
}

/// Log lines go to stderr so stdout carries only the class listing.
/// `--quiet` silences every level.
fn init_tracing(quiet: bool) {
    let fmt = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .without_time()
        .with_target(false);
    let filter_layer = if quiet {
        LevelFilter::OFF
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();
}
