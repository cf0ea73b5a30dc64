use thiserror::Error;

/// Why a scrape request was not served.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Maximum {max} weeks allowed, got {requested}")]
    TooManyWeeks { requested: usize, max: usize },

    #[error("Week numbers must be between 1 and 53, got {0}")]
    WeekOutOfRange(i32),

    #[error("Day must be between 1 and 31, got {0}")]
    DayOutOfRange(i32),

    #[error("Unknown trading session {0:?}")]
    InvalidSession(String),

    #[error("scrape failed: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ScrapeError {
    /// True for problems with the request itself rather than with scraping.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, ScrapeError::Internal(_))
    }
}
