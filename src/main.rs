use clap::Parser;
use devhook::config::{Config, DEFAULT_CONFIG_PATH};
use devhook::{DeliveryStatus, DevHookSimulator, UploadDescriptor};
use tracing_subscriber::EnvFilter;

/// Simulate the upload service's completion callback against a local dev server
#[derive(Parser, Debug)]
#[command(name = "devhook", version)]
struct Args {
    /// File key of the pending upload
    #[arg(long)]
    key: String,

    /// Polling URL returned when the upload was initiated
    #[arg(long)]
    polling_url: String,

    /// Polling token returned when the upload was initiated
    #[arg(long, env = "DEVHOOK_POLLING_TOKEN")]
    polling_token: String,

    /// Path to the config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = Config::load_config(&args.config)?;
    let simulator = DevHookSimulator::from_config(&config)?;

    let descriptor = UploadDescriptor::new(args.key, args.polling_url, args.polling_token);
    let outcome = simulator.simulate(descriptor).await?;

    if outcome.delivery == DeliveryStatus::DeliveryFailed {
        anyhow::bail!("callback delivery to {} failed", outcome.callback_url);
    }
    Ok(())
}
