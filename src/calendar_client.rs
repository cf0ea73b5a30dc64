use std::num::NonZeroU32;
use std::time::Duration;

use log::{error, info, warn};

use crate::config::CalendarConfig;
use crate::models::week_label;
use crate::ratelimit::RateLimiter;
use crate::requests::{PageSource, RequestClient, check_body_len};

/// How often to try a week and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Wait after failed attempt `attempt` (0-based): `base * 2^attempt`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

/// Fetches one calendar page per week, retrying with exponential backoff.
pub struct CalendarClient {
    source: Box<dyn PageSource>,
    config: CalendarConfig,
    retry: RetryPolicy,
    rate_limiter: Option<RateLimiter>,
}

impl CalendarClient {
    /// Client talking to the configured origin over HTTP.
    pub fn new(config: CalendarConfig) -> anyhow::Result<Self> {
        let source = RequestClient::new(config.timeout())?;
        Self::with_source(config, Box::new(source))
    }

    pub fn with_source(config: CalendarConfig, source: Box<dyn PageSource>) -> anyhow::Result<Self> {
        let rate_limiter = NonZeroU32::new(config.calendar_requests_per_sec)
            .map(RateLimiter::new)
            .transpose()?;
        let retry = RetryPolicy {
            max_attempts: config.max_attempts(),
            base_delay: config.backoff_base(),
        };
        Ok(Self {
            source,
            config,
            retry,
            rate_limiter,
        })
    }

    /// Body of the week's calendar page, or `None` once every attempt failed.
    /// Transport errors, bad statuses and block pages are all retried.
    pub async fn fetch_week(&self, year: i32, week: u32) -> Option<String> {
        let url = self.config.week_url(year, week);
        let attempts = self.retry.max_attempts.max(1);

        for attempt in 0..attempts {
            if let Some(limiter) = &self.rate_limiter {
                limiter.wait_until_ready().await;
            }
            info!("Scraping {url}, attempt {}", attempt + 1);

            match self.try_fetch(&url).await {
                Ok(body) => {
                    info!("Response received: {} characters", body.len());
                    return Some(body);
                }
                Err(e) => {
                    warn!("Error scraping {url}: {e:#}");
                    if attempt + 1 < attempts {
                        tokio::time::sleep(self.retry.delay(attempt)).await;
                    }
                }
            }
        }

        error!(
            "Failed to scrape {year}-{} after {attempts} attempts",
            week_label(week)
        );
        None
    }

    async fn try_fetch(&self, url: &str) -> anyhow::Result<String> {
        let body = self.source.fetch_page(url).await?;
        check_body_len(&body, self.config.calendar_min_body_len)?;
        Ok(body)
    }
}
