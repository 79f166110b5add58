use anyhow::Result;
use clap::Parser;
use squat_coach::config::{Config, DEFAULT_CONFIG_PATH};
use squat_coach::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "squat_coach")]
#[command(about = "Real-time squat technique feedback server")]
struct Args {
    /// Path to config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Override server.listen_addr
    #[arg(short, long)]
    listen: Option<String>,

    /// Log per-frame diagnostics
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut config = Config::load_or_default(&args.config)?;
    if let Some(listen) = args.listen {
        config.server.listen_addr = listen;
    }

    info!("Squat Coach ({})", env!("GIT_VERSION"));
    info!("Config: {}", args.config);
    info!("Rules: {:?}", config.rules);

    server::run(config).await
}
