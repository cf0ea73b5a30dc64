use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;
use econ_calendar::api::{self, AppState};
use econ_calendar::{CalendarConfig, ScrapingContext};
use log::{LevelFilter, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = CalendarConfig::new()?;
    let addr = config.bind_addr()?;
    let ctx = Arc::new(ScrapingContext::new(config)?);
    let app = api::router(AppState { ctx });

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!("Economic Calendar Scraper API listening on {addr}");
    axum::serve(listener, app).await?;
    info!("Economic Calendar Scraper API stopped");
    Ok(())
}
