mod common;

use std::sync::Arc;

use async_trait::async_trait;
use econ_calendar::models::OutputFormat;
use econ_calendar::requests::PageSource;
use econ_calendar::service::handle_scrape;
use econ_calendar::week_scraper::scrape_weeks;
use econ_calendar::{FilterParams, ScrapeRequest, ScrapingContext, Session};

use common::{FixturePages, WEEK_01, WEEK_02_DRIFT, context, test_config};

/// Serves fixtures but blows up on one week, as a parser bug would.
struct PanicsOnWeek {
    pages: FixturePages,
    week_param: &'static str,
}

#[async_trait]
impl PageSource for PanicsOnWeek {
    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        if url.ends_with(self.week_param) {
            panic!("unexpected markup in {url}");
        }
        self.pages.fetch_page(url).await
    }
}

#[tokio::test]
async fn week_one_skips_december_and_derives_fields() {
    let ctx = context(FixturePages::new().with_page("2025-W01", WEEK_01));

    let events = scrape_weeks(ctx, 2025, &[1], None).await;

    assert_eq!(events.len(), 2, "December block must not contribute");
    let claims = &events[0];
    assert_eq!(claims.source_name, "Unemployment Claims");
    assert_eq!(claims.week, "W01");
    assert_eq!(claims.month_num, "01");
    assert_eq!(claims.day_number, "2");
    assert_eq!(claims.week_day, "Thu");
    assert_eq!(claims.impact, "High");
    assert_eq!(claims.session, Some(Session::Tokyo));
    assert_eq!(claims.timestamp, "1735806600");
    assert_eq!(claims.actual.as_deref(), Some("211K"));

    let holiday = &events[1];
    assert_eq!(holiday.time, "All Day");
    assert_eq!(holiday.currency_name, "EUR");
    assert_eq!(holiday.session, None);
    assert_eq!(holiday.timestamp, "1735776000");
    assert_eq!(holiday.actual.as_deref(), Some(""));
}

#[tokio::test]
async fn drifted_markup_falls_back_to_header_and_positions() {
    let ctx = context(FixturePages::new().with_page("2025-W02", WEEK_02_DRIFT));

    let events = scrape_weeks(ctx, 2025, &[2], None).await;

    let names: Vec<&str> = events.iter().map(|e| e.source_name.as_str()).collect();
    assert_eq!(
        names,
        ["Caixin Services PMI", "German Prelim CPI m/m", "RBA Governor Speaks"]
    );
    assert!(events.iter().all(|e| e.month_name == "Jan" && e.day_number == "6"));
    assert!(events.iter().all(|e| e.week_day == "Monday"));
    assert_eq!(events[0].timestamp, "1736132400");
    assert_eq!(events[0].session, Some(Session::Sydney));
    assert_eq!(events[1].session, Some(Session::London));
    assert_eq!(events[2].previous.as_deref(), Some(""));
}

#[tokio::test]
async fn weeks_are_merged_in_request_order_and_failures_are_isolated() {
    let pages = FixturePages::new()
        .with_page("2025-W01", WEEK_01)
        .with_page("2025-W02", WEEK_02_DRIFT);
    let ctx = context(pages.clone());

    let events = scrape_weeks(ctx, 2025, &[2, 9, 1], None).await;

    let weeks: Vec<&str> = events.iter().map(|e| e.week.as_str()).collect();
    assert_eq!(weeks, ["W02", "W02", "W02", "W01", "W01"]);

    let missing = pages
        .requested()
        .iter()
        .filter(|url| url.ends_with("2025-W09"))
        .count();
    assert_eq!(missing, 3, "unreachable week is retried up to the limit");
}

#[tokio::test]
async fn panicking_week_does_not_take_down_its_siblings() {
    let source = PanicsOnWeek {
        pages: FixturePages::new()
            .with_page("2025-W01", WEEK_01)
            .with_page("2025-W02", WEEK_02_DRIFT),
        week_param: "2025-W03",
    };
    let ctx = Arc::new(ScrapingContext::with_source(test_config(), Box::new(source)).unwrap());

    let events = scrape_weeks(ctx, 2025, &[2, 3, 1], None).await;

    let weeks: Vec<&str> = events.iter().map(|e| e.week.as_str()).collect();
    assert_eq!(weeks, ["W02", "W02", "W02", "W01", "W01"]);
}

#[tokio::test]
async fn filters_that_constrain_nothing_keep_every_event() {
    let ctx = context(FixturePages::new().with_page("2025-W02", WEEK_02_DRIFT));
    let filters = FilterParams {
        impact: Some(vec![]),
        pairs: Some(vec![]),
        ..Default::default()
    };

    let events = scrape_weeks(ctx, 2025, &[2], Some(&filters)).await;

    assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn impact_filter_keeps_low_and_high() {
    let ctx = context(FixturePages::new().with_page("2025-W02", WEEK_02_DRIFT));
    let filters = FilterParams {
        impact: Some(vec!["low".into(), "HIGH".into()]),
        ..Default::default()
    };

    let events = scrape_weeks(ctx, 2025, &[2], Some(&filters)).await;

    let impacts: Vec<&str> = events.iter().map(|e| e.impact.as_str()).collect();
    assert_eq!(impacts, ["Low", "High"]);
}

#[tokio::test]
async fn midnight_wrapping_time_range() {
    let ctx = context(FixturePages::new().with_page("2025-W02", WEEK_02_DRIFT));
    let filters = FilterParams {
        time_range: Some(("22:00".into(), "06:00".into())),
        ..Default::default()
    };

    let events = scrape_weeks(ctx, 2025, &[2], Some(&filters)).await;

    let times: Vec<&str> = events.iter().map(|e| e.time.as_str()).collect();
    assert_eq!(times, ["03:00", "23:00"]);
}

#[tokio::test]
async fn weekly_response_reports_weeks_and_echoes_filters() {
    let ctx = context(FixturePages::new().with_page("2025-W01", WEEK_01));
    let filters = FilterParams {
        pairs: Some(vec!["eur".into()]),
        ..Default::default()
    };
    let request = ScrapeRequest {
        year: Some(2025),
        weeks: Some(vec![1]),
        filters: Some(filters.clone()),
        ..Default::default()
    };

    let response = handle_scrape(ctx, request).await.unwrap();

    assert!(response.success);
    assert_eq!(response.total_events, 1);
    assert_eq!(response.data[0].source_name, "Bank Holiday");
    assert_eq!(response.weeks_scraped, ["W01"]);
    assert_eq!(response.filters_applied, Some(filters));
    assert!(response.execution_time >= 0.0);
}

#[tokio::test]
async fn daily_response_keeps_only_the_requested_day() {
    let ctx = context(
        FixturePages::new()
            .with_page("2025-W01", WEEK_01)
            .with_page("2025-W02", WEEK_02_DRIFT),
    );
    let request = ScrapeRequest {
        year: Some(2025),
        weeks: Some(vec![1, 2]),
        format: OutputFormat::Daily,
        day: Some(6),
        ..Default::default()
    };

    let response = handle_scrape(ctx, request).await.unwrap();

    assert_eq!(response.total_events, 3);
    assert!(response.data.iter().all(|e| e.day_number == "6"));
    assert_eq!(response.weeks_scraped, ["W01", "W02"]);
}

#[tokio::test]
async fn blocked_week_yields_an_empty_success() {
    let ctx = context(FixturePages::new().with_page("2025-W05", "<html>Just a moment...</html>"));
    let request = ScrapeRequest {
        year: Some(2025),
        weeks: Some(vec![5]),
        ..Default::default()
    };

    let response = handle_scrape(ctx, request).await.unwrap();

    assert!(response.success);
    assert!(response.data.is_empty());
    assert_eq!(response.total_events, 0);
}

#[tokio::test]
async fn invalid_weeks_are_rejected_before_fetching() {
    let pages = FixturePages::new();
    let ctx = context(pages.clone());
    let request = ScrapeRequest {
        weeks: Some(vec![1, 2, 3, 4, 5]),
        ..Default::default()
    };

    let err = handle_scrape(ctx, request).await.unwrap_err();

    assert!(err.is_caller_error());
    assert!(pages.requested().is_empty());
}
