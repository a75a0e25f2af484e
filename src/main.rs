use crate::app_config::AppConfig;
use crate::tracker::IssTracker;
use tracing::info;

mod app_config;
mod domain;
mod iss;
mod map_renderer;
mod speed;
mod tracker;

const PERIOD_SECONDS: u64 = 1;
const N_PERIODS: usize = 20;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_max_level(tracing::Level::INFO).init();

    info!("🛰  Starting {} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load()?;
    info!("✅  Loaded configuration");

    let client = iss::new_client()?;
    let mut tracker = IssTracker::new(client, config);

    tracker.sample(PERIOD_SECONDS, N_PERIODS).await?;
    tracker.sample_and_render(PERIOD_SECONDS, N_PERIODS).await?;

    Ok(())
}
