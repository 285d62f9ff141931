//! Knight entry point: parses arguments, installs the tracing subscriber
//! sized by `-v` count, then hands off to the library's CLI runner and
//! translates its result into a process exit code. All real logic lives in
//! `knight::cli` so it stays testable without spawning a process.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use knight::cli::Cli;

fn main() {
    let cli = Cli::parse();
    install_tracing(cli.verbose);
    std::process::exit(knight::cli::run(cli));
}

fn install_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();
}
