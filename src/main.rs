use std::path::PathBuf;

use clap::Parser;

use claims_proxy::config::load_config;
use claims_proxy::lifecycle::startup;
use claims_proxy::observability::logging;

/// Reverse proxy that turns token claims into request headers.
#[derive(Debug, Parser)]
#[command(name = "claims-proxy", version, about)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long, default_value = "claims-proxy.toml")]
    config: PathBuf,

    /// Validate the configuration and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = load_config(&cli.config)?;

    if cli.check {
        println!("{}: configuration ok", cli.config.display());
        return Ok(());
    }

    logging::init(&config.observability.log_level);

    tracing::info!("claims-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = %cli.config.display(),
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        mappings = config.claims.mappings.len(),
        fail_open = config.claims.fail_open,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;
    Ok(())
}
