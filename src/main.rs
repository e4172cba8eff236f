use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use lanefeed::config::FeedConfig;
use lanefeed::startup::launch;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Seconds between status lines.
const STATUS_INTERVAL_SECS: u64 = 10;

/// Value following `--config`, if given.
fn config_path_arg() -> Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args
                .next()
                .map(|path| Some(PathBuf::from(path)))
                .ok_or_else(|| eyre!("--config requires a path"));
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Ok(Some(PathBuf::from(path)));
        }
    }
    Ok(None)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn run(config: FeedConfig) -> Result<()> {
    let handle = launch(&config)
        .await
        .wrap_err("Failed to start the feed")?;

    let mut status = tokio::time::interval(Duration::from_secs(STATUS_INTERVAL_SECS));
    status.tick().await;

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result.wrap_err("Failed to listen for Ctrl-C")?;
                break;
            }
            _ = status.tick() => {
                info!("{}", handle.snapshot().summary());
            }
        }
    }

    let last = handle.shutdown().await;
    info!(final_state = %last.summary(), "Feed stopped");
    Ok(())
}

fn main() -> Result<()> {
    // Handle --version flag before any initialization
    if std::env::args().any(|arg| arg == "--version") {
        println!("lanefeed {}", VERSION);
        std::process::exit(0);
    }

    color_eyre::install()?;
    init_tracing();

    let config = FeedConfig::load(config_path_arg()?).wrap_err("Failed to load configuration")?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run(config))
}
