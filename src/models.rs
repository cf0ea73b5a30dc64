use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four major FX market-hours windows, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Session {
    Sydney,
    Tokyo,
    London,
    NewYork,
}

impl Session {
    /// Precedence order used when an hour falls in more than one window.
    pub const ALL: [Session; 4] = [
        Session::Sydney,
        Session::Tokyo,
        Session::London,
        Session::NewYork,
    ];

    /// Inclusive whole-hour windows. Sydney wraps midnight, so it has two.
    pub fn windows(self) -> &'static [(u32, u32)] {
        match self {
            Session::Sydney => &[(22, 23), (0, 7)],
            Session::Tokyo => &[(0, 9)],
            Session::London => &[(8, 17)],
            Session::NewYork => &[(13, 22)],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Session::Sydney => "Sydney",
            Session::Tokyo => "Tokyo",
            Session::London => "London",
            Session::NewYork => "NewYork",
        }
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Session {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Session::ALL
            .into_iter()
            .find(|session| session.as_str() == s.trim())
            .ok_or_else(|| s.trim().to_string())
    }
}

/// Day-level context shared by every event of one day block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayInfo {
    pub year: String,
    /// "W01".."W53"
    pub week: String,
    pub month_name: String,
    /// "01".."12"
    pub month_num: String,
    pub day_number: String,
    pub week_day: String,
}

/// A single calendar entry as served to callers.
///
/// Built once per extracted row and never modified afterwards. Field names
/// are the wire names of the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EconomicEvent {
    pub year: String,
    pub week: String,
    pub month_num: String,
    pub month_name: String,
    pub day_number: String,
    pub week_day: String,
    /// "HH:MM", "All Day" or empty.
    pub time: String,
    pub currency_name: String,
    pub source_name: String,
    pub impact: String,
    pub actual: Option<String>,
    pub forecast: Option<String>,
    pub previous: Option<String>,
    /// Unix seconds as text; "0" when the date/time could not be resolved.
    pub timestamp: String,
    pub session: Option<Session>,
}

/// Post-scrape narrowing criteria. Every present field is ANDed; an absent
/// or empty field places no constraint on its dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterParams {
    #[serde(default)]
    pub impact: Option<Vec<String>>,
    #[serde(default)]
    pub pairs: Option<Vec<String>>,
    #[serde(default)]
    pub sessions: Option<Vec<Session>>,
    /// ("HH:MM", "HH:MM"); may wrap midnight.
    #[serde(default)]
    pub time_range: Option<(String, String)>,
    /// Event-name patterns, matched as a case-insensitive alternation.
    #[serde(default)]
    pub events: Option<Vec<String>>,
}

impl FilterParams {
    pub fn is_empty(&self) -> bool {
        fn blank<T>(list: &Option<Vec<T>>) -> bool {
            list.as_ref().is_none_or(|l| l.is_empty())
        }
        blank(&self.impact)
            && blank(&self.pairs)
            && blank(&self.sessions)
            && blank(&self.events)
            && self.time_range.is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Daily,
    #[default]
    Weekly,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScrapeRequest {
    /// Defaults to the current year.
    #[serde(default)]
    pub year: Option<i32>,
    /// At most four, each in 1..=53. Defaults to the current ISO week.
    #[serde(default)]
    pub weeks: Option<Vec<i32>>,
    #[serde(default)]
    pub filters: Option<FilterParams>,
    #[serde(default)]
    pub format: OutputFormat,
    /// Day of month for `daily` output. Defaults to today.
    #[serde(default)]
    pub day: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResponse {
    pub success: bool,
    pub data: Vec<EconomicEvent>,
    pub total_events: usize,
    pub weeks_scraped: Vec<String>,
    pub filters_applied: Option<FilterParams>,
    /// Seconds, rounded to two decimals.
    pub execution_time: f64,
}

/// Events of one calendar day, keyed "year-month-day".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayGroup {
    pub key: String,
    pub events: Vec<EconomicEvent>,
}

pub fn week_label(week: u32) -> String {
    format!("W{week:02}")
}
