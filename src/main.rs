// Entrypoint for the CLI application.
// - Keeps `main` small: resolve configuration, build the transport and
//   hand both to the deployer.
// - Any failure ends the process with exit status 1.

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use ghost_theme_deploy::api::HttpTransport;
use ghost_theme_deploy::config::log_filter;
use ghost_theme_deploy::ui::ConsoleSink;
use ghost_theme_deploy::{Cli, Deployer};

fn main() {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, rust_log.as_deref()))
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = cli.deploy_config()?;
    let transport =
        HttpTransport::new(&config.site, config.timeout).context("Failed to build HTTP client")?;

    let mut deployer = Deployer::new(config, transport, ConsoleSink::new());
    let report = deployer.run(&cli.artifact);
    Ok(report.exit_code())
}
