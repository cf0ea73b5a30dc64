use crate::{
    calendar_client::CalendarClient, config::CalendarConfig, day_block_scraper::DayBlockScraper,
    requests::PageSource,
};

/// Everything a week task needs, shared read-only between tasks.
pub struct ScrapingContext {
    pub config: CalendarConfig,
    pub calendar_client: CalendarClient,
    pub day_block_scraper: DayBlockScraper,
}

impl ScrapingContext {
    pub fn new(config: CalendarConfig) -> anyhow::Result<Self> {
        let calendar_client = CalendarClient::new(config.clone())?;
        let day_block_scraper = DayBlockScraper::new()?;
        Ok(ScrapingContext {
            config,
            calendar_client,
            day_block_scraper,
        })
    }

    /// Context that reads pages from `source` instead of the network.
    pub fn with_source(config: CalendarConfig, source: Box<dyn PageSource>) -> anyhow::Result<Self> {
        let calendar_client = CalendarClient::with_source(config.clone(), source)?;
        let day_block_scraper = DayBlockScraper::new()?;
        Ok(ScrapingContext {
            config,
            calendar_client,
            day_block_scraper,
        })
    }
}
