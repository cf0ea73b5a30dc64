use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::error;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::models::{FilterParams, OutputFormat, ScrapeRequest, ScrapeResponse, Session};
use crate::scrape_error::ScrapeError;
use crate::scraping_context::ScrapingContext;
use crate::service::handle_scrape;

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<ScrapingContext>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/scrape", post(scrape))
        .route("/scrape/quick", get(quick_scrape))
        .route("/health", get(health))
        .route("/sessions", get(sessions));

    Router::new()
        .nest("/api/v1", api)
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

impl IntoResponse for ScrapeError {
    fn into_response(self) -> Response {
        let status = if self.is_caller_error() {
            StatusCode::BAD_REQUEST
        } else {
            error!("Error in scrape endpoint: {self}");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

async fn scrape(
    State(state): State<AppState>,
    Json(request): Json<ScrapeRequest>,
) -> Result<Json<ScrapeResponse>, ScrapeError> {
    handle_scrape(state.ctx, request).await.map(Json)
}

#[derive(Debug, Deserialize)]
struct QuickParams {
    year: i32,
    week: i32,
    impact: Option<String>,
    pairs: Option<String>,
    sessions: Option<String>,
}

impl QuickParams {
    /// Filters from the comma-separated query lists, if any was given.
    fn filters(&self) -> Result<Option<FilterParams>, ScrapeError> {
        if self.impact.is_none() && self.pairs.is_none() && self.sessions.is_none() {
            return Ok(None);
        }
        let sessions = self
            .sessions
            .as_deref()
            .map(|list| {
                split_list(list)
                    .into_iter()
                    .map(|s| s.parse::<Session>().map_err(ScrapeError::InvalidSession))
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?;
        Ok(Some(FilterParams {
            impact: self.impact.as_deref().map(split_list),
            pairs: self.pairs.as_deref().map(split_list),
            sessions,
            ..Default::default()
        }))
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

async fn quick_scrape(
    State(state): State<AppState>,
    Query(params): Query<QuickParams>,
) -> Result<Json<ScrapeResponse>, ScrapeError> {
    let request = ScrapeRequest {
        year: Some(params.year),
        weeks: Some(vec![params.week]),
        filters: params.filters()?,
        format: OutputFormat::Weekly,
        day: None,
    };
    handle_scrape(state.ctx, request).await.map(Json)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "Economic Calendar Scraper" }))
}

async fn sessions() -> Json<serde_json::Value> {
    let windows: BTreeMap<&str, String> = Session::ALL
        .into_iter()
        .map(|session| (session.as_str(), describe_windows(session)))
        .collect();
    Json(json!({ "sessions": windows }))
}

// Sydney's two windows are shown as one span across midnight.
fn describe_windows(session: Session) -> String {
    let windows = session.windows();
    let start = windows.first().map_or(0, |w| w.0);
    let end = windows.last().map_or(0, |w| w.1);
    format!("{start:02}:00-{end:02}:00 UTC")
}
