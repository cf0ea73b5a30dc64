use std::sync::Arc;

use futures::stream::{self, StreamExt};
use log::{error, info};

use crate::event_filter::apply_filters;
use crate::models::{EconomicEvent, FilterParams};
use crate::scraping_context::ScrapingContext;

/// Upper bound on weeks fetched at the same time.
pub const MAX_WORKERS: usize = 4;

/// Fetch and parse a single week. Every failure ends up as zero events.
pub async fn scrape_week(ctx: &ScrapingContext, year: i32, week: u32) -> Vec<EconomicEvent> {
    match ctx.calendar_client.fetch_week(year, week).await {
        Some(body) => ctx.day_block_scraper.parse_document(&body, year, week),
        None => Vec::new(),
    }
}

/// Scrapes all `weeks` of `year` in parallel and concatenates the events in
/// the order the weeks were requested, then applies `filters` unless they
/// constrain nothing.
///
/// A week that fails, or whose task panics, contributes no events and does
/// not affect the others.
pub async fn scrape_weeks(
    ctx: Arc<ScrapingContext>,
    year: i32,
    weeks: &[u32],
    filters: Option<&FilterParams>,
) -> Vec<EconomicEvent> {
    info!("Scraping {} weeks: {:?}", weeks.len(), weeks);
    let workers = weeks.len().clamp(1, MAX_WORKERS);

    let per_week: Vec<(u32, Vec<EconomicEvent>)> = stream::iter(weeks.iter().copied())
        .map(|week| {
            let ctx = Arc::clone(&ctx);
            async move {
                let task = tokio::spawn(async move { scrape_week(&ctx, year, week).await });
                match task.await {
                    Ok(events) => (week, events),
                    Err(e) => {
                        error!("Week {week} failed: {e}");
                        (week, Vec::new())
                    }
                }
            }
        })
        .buffered(workers)
        .collect()
        .await;

    let mut all_events = Vec::new();
    for (week, events) in per_week {
        info!("Week {week}: {} events", events.len());
        all_events.extend(events);
    }
    info!("Total events before filtering: {}", all_events.len());

    match filters.filter(|f| !f.is_empty()) {
        Some(filters) => {
            let filtered = apply_filters(all_events, filters);
            info!("Total events after filtering: {}", filtered.len());
            filtered
        }
        None => all_events,
    }
}
