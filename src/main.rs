#![forbid(unsafe_code)]

use clap::Parser;
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use certifiable_bench::cli::{self, Cli};

fn init_tracing(verbose: bool) {
    let env = std::env::var("CB_LOG").unwrap_or_else(|_| {
        if verbose {
            "certifiable_bench=debug".to_string()
        } else {
            "certifiable_bench=info".to_string()
        }
    });
    let _ = tracing_subscriber::fmt()
        .with_span_events(FmtSpan::ACTIVE)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_env_filter(EnvFilter::new(env))
        .try_init();
}

fn main() {
    color_eyre::install().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = cli::run(cli) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}
