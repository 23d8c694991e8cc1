use clap::Parser;
use docket::cli::commands::Cli;
use docket::cli::handlers;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Logs go to stderr so `--json` output on stdout stays parseable.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("DOCKET_LOG").unwrap_or_else(|_| EnvFilter::new("docket=warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
