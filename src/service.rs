use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use chrono::{Datelike, NaiveDate, Utc};
use futures::FutureExt;
use log::{error, info};

use crate::event_filter::group_by_day;
use crate::models::{
    EconomicEvent, FilterParams, OutputFormat, ScrapeRequest, ScrapeResponse, week_label,
};
use crate::scrape_error::ScrapeError;
use crate::scraping_context::ScrapingContext;
use crate::week_scraper::scrape_weeks;

pub const MAX_WEEKS: usize = 4;

/// A request with defaults filled in and bounds checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub year: i32,
    pub weeks: Vec<u32>,
    pub filters: Option<FilterParams>,
    pub format: OutputFormat,
    pub day: u32,
}

/// Checks caller input and resolves defaults against `today`.
pub fn validate_request(
    request: &ScrapeRequest,
    today: NaiveDate,
) -> Result<ValidatedRequest, ScrapeError> {
    let weeks: Vec<i32> = match request.weeks.as_deref() {
        Some(weeks) if !weeks.is_empty() => weeks.to_vec(),
        _ => vec![today.iso_week().week() as i32],
    };
    if weeks.len() > MAX_WEEKS {
        return Err(ScrapeError::TooManyWeeks {
            requested: weeks.len(),
            max: MAX_WEEKS,
        });
    }
    let weeks = weeks
        .iter()
        .map(|&week| match u32::try_from(week) {
            Ok(w @ 1..=53) => Ok(w),
            _ => Err(ScrapeError::WeekOutOfRange(week)),
        })
        .collect::<Result<Vec<u32>, _>>()?;

    let day = match request.day {
        None => today.day(),
        Some(day @ 1..=31) => day as u32,
        Some(day) => return Err(ScrapeError::DayOutOfRange(day)),
    };

    Ok(ValidatedRequest {
        year: request.year.unwrap_or_else(|| today.year()),
        weeks,
        filters: request.filters.clone(),
        format: request.format,
        day,
    })
}

/// Serves one scrape request end to end.
///
/// Input problems come back as caller errors before anything is fetched.
/// Scrape shortfalls only show up as fewer events; a panic anywhere in the
/// pipeline becomes `ScrapeError::Internal`.
pub async fn handle_scrape(
    ctx: Arc<ScrapingContext>,
    request: ScrapeRequest,
) -> Result<ScrapeResponse, ScrapeError> {
    let started = Instant::now();
    let validated = validate_request(&request, Utc::now().date_naive())?;

    let scrape = scrape_weeks(
        ctx,
        validated.year,
        &validated.weeks,
        validated.filters.as_ref(),
    );
    let events = match AssertUnwindSafe(scrape).catch_unwind().await {
        Ok(events) => events,
        Err(_) => {
            error!("Scrape of {:?} panicked", validated.weeks);
            return Err(ScrapeError::Internal(anyhow::anyhow!(
                "unexpected failure while scraping"
            )));
        }
    };

    let data = match validated.format {
        OutputFormat::Weekly => events,
        OutputFormat::Daily => events_for_day(events, validated.day),
    };
    let execution_time = round_secs(started.elapsed().as_secs_f64());
    info!("Served {} events in {execution_time}s", data.len());

    Ok(ScrapeResponse {
        success: true,
        total_events: data.len(),
        data,
        weeks_scraped: validated.weeks.iter().map(|&w| week_label(w)).collect(),
        filters_applied: request.filters,
        execution_time,
    })
}

/// Day groups whose day of month is `day`, flattened in group order.
pub fn events_for_day(events: Vec<EconomicEvent>, day: u32) -> Vec<EconomicEvent> {
    group_by_day(events)
        .into_iter()
        .filter(|group| {
            group
                .events
                .first()
                .and_then(|e| e.day_number.trim().parse::<u32>().ok())
                == Some(day)
        })
        .flat_map(|group| group.events)
        .collect()
}

fn round_secs(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}
