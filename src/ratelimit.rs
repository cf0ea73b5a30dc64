use governor::{
    Quota, RateLimiter as GovernorRateLimiter,
    clock::{QuantaClock, QuantaInstant},
    middleware::NoOpMiddleware,
    state::{InMemoryState, NotKeyed},
};
use std::{num::NonZeroU32, time::Duration};

// No two requests to the origin closer than this.
const MS_BETWEEN_REQ: Duration = Duration::from_millis(100);

type SpecificGovernorRateLimiter =
    GovernorRateLimiter<NotKeyed, InMemoryState, QuantaClock, NoOpMiddleware<QuantaInstant>>;

/// Keeps our request pattern toward the calendar origin polite.
pub struct RateLimiter {
    req_per_sec: SpecificGovernorRateLimiter,
    ms_between_req: SpecificGovernorRateLimiter,
}

impl RateLimiter {
    pub fn new(requests_per_sec: NonZeroU32) -> anyhow::Result<Self> {
        // Limit to X total req/sec on average.
        let req_per_sec = GovernorRateLimiter::direct(Quota::per_second(requests_per_sec));

        // Limit to Y req/ms (i.e. no two requests closer than Y ms).
        let spacing = Quota::with_period(MS_BETWEEN_REQ)
            .ok_or_else(|| anyhow::anyhow!("request spacing must be non-zero"))?;
        let ms_between_req = GovernorRateLimiter::direct(spacing);

        Ok(RateLimiter {
            req_per_sec,
            ms_between_req,
        })
    }

    pub async fn wait_until_ready(&self) {
        // Average rate first, then spacing, so callers released together by
        // the per-second quota still go out one at a time.
        self.req_per_sec.until_ready().await;
        self.ms_between_req.until_ready().await;
    }
}
