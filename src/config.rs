use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, de::DeserializeOwned};

/// Runtime configuration, read from `CALENDAR_*` env vars.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    #[serde(default = "default_base_url")]
    pub calendar_base_url: String,
    /// Attempts per week, including the first one.
    #[serde(default = "default_max_retries")]
    pub calendar_max_retries: u32,
    /// Backoff unit; the wait after failed attempt `n` is `unit * 2^n`.
    #[serde(default = "default_backoff_base_ms")]
    pub calendar_backoff_base_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub calendar_timeout_secs: u64,
    /// Bodies shorter than this are taken to be a block or error page.
    #[serde(default = "default_min_body_len")]
    pub calendar_min_body_len: usize,
    #[serde(default = "default_requests_per_sec")]
    pub calendar_requests_per_sec: u32,
    #[serde(default = "default_bind_addr")]
    pub calendar_bind_addr: String,
    #[serde(default)]
    pub port: Option<u16>,
}

fn default_base_url() -> String {
    "https://www.babypips.com".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1_000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_min_body_len() -> usize {
    1_000
}

fn default_requests_per_sec() -> u32 {
    4
}

fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            calendar_base_url: default_base_url(),
            calendar_max_retries: default_max_retries(),
            calendar_backoff_base_ms: default_backoff_base_ms(),
            calendar_timeout_secs: default_timeout_secs(),
            calendar_min_body_len: default_min_body_len(),
            calendar_requests_per_sec: default_requests_per_sec(),
            calendar_bind_addr: default_bind_addr(),
            port: None,
        }
    }
}

impl CalendarConfig {
    pub fn new() -> anyhow::Result<Self> {
        Self::load_from_env()
    }

    /// Builds the config from explicit key/value pairs instead of the process env.
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(vars).context("failed to load calendar config from vars")
    }

    pub fn week_url(&self, year: i32, week: u32) -> String {
        format!(
            "{}/economic-calendar?week={year}-W{week:02}",
            self.calendar_base_url.trim_end_matches('/')
        )
    }

    pub fn max_attempts(&self) -> u32 {
        self.calendar_max_retries.max(1)
    }

    pub fn backoff_base(&self) -> Duration {
        Duration::from_millis(self.calendar_backoff_base_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.calendar_timeout_secs)
    }

    /// Listen address; `PORT` overrides the port of `CALENDAR_BIND_ADDR`.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let mut addr: SocketAddr = self
            .calendar_bind_addr
            .parse()
            .with_context(|| format!("invalid bind address {:?}", self.calendar_bind_addr))?;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        Ok(addr)
    }
}

// Extension trait.
pub trait LoadFromEnv: DeserializeOwned {
    fn load_from_env() -> anyhow::Result<Self> {
        // Don't throw an error if .env file doesn't exist.
        let _ = dotenv::dotenv();
        let config =
            envy::from_env::<Self>().context("failed to load env variables into config struct")?;
        Ok(config)
    }
}

impl<T: DeserializeOwned> LoadFromEnv for T {}
