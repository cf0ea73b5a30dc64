#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use econ_calendar::requests::PageSource;
use econ_calendar::{CalendarConfig, ScrapingContext};

pub const WEEK_01: &str = include_str!("../fixtures/week_2025_w01.html");
pub const WEEK_02_DRIFT: &str = include_str!("../fixtures/week_2025_w02_drift.html");

/// Serves fixture pages keyed by the `week=` query value; anything else
/// fails like a refused connection.
#[derive(Clone, Default)]
pub struct FixturePages {
    pages: HashMap<String, String>,
    requested: Arc<Mutex<Vec<String>>>,
}

impl FixturePages {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, week_param: &str, html: &str) -> Self {
        self.pages.insert(week_param.to_string(), html.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageSource for FixturePages {
    async fn fetch_page(&self, url: &str) -> anyhow::Result<String> {
        self.requested.lock().unwrap().push(url.to_string());
        let week_param = url.rsplit("week=").next().unwrap_or_default();
        self.pages
            .get(week_param)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("connection refused: {url}"))
    }
}

/// Fast retries, no pacing.
pub fn test_config() -> CalendarConfig {
    CalendarConfig {
        calendar_backoff_base_ms: 1,
        calendar_requests_per_sec: 0,
        ..CalendarConfig::default()
    }
}

pub fn context(pages: FixturePages) -> Arc<ScrapingContext> {
    Arc::new(ScrapingContext::with_source(test_config(), Box::new(pages)).unwrap())
}
