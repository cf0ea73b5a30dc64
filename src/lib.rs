pub mod api;
pub mod calendar_client;
pub mod config;
pub mod day_block_scraper;
pub mod event_filter;
pub mod event_row_scraper;
pub mod models;
pub mod normalize;
mod ratelimit;
pub mod requests;
pub mod scrape_error;
pub mod scraping_context;
pub mod service;
mod text_manipulators;
pub mod week_scraper;

pub use calendar_client::CalendarClient;
pub use config::CalendarConfig;
pub use models::{EconomicEvent, FilterParams, ScrapeRequest, ScrapeResponse, Session};
pub use scrape_error::ScrapeError;
pub use scraping_context::ScrapingContext;
