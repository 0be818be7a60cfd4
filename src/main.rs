use clap::Parser;
use rebalancer::cli::{Cli, run};

fn main() -> std::process::ExitCode {
    init_tracing();
    run(Cli::parse())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}
