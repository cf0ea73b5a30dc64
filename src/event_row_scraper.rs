use log::debug;
use scraper::{ElementRef, Selector};

use crate::models::{DayInfo, EconomicEvent};
use crate::normalize::{calculate_timestamp, determine_session, normalize_impact};
use crate::text_manipulators::{extract_optional_text, extract_text, parse_selector};

/// How the cells of a row were located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStrategy {
    /// Cells found by their column class.
    ClassCells,
    /// Cells taken by column position: time, currency, name, impact,
    /// actual, forecast, previous.
    Positional,
}

impl RowStrategy {
    pub const CASCADE: [RowStrategy; 2] = [RowStrategy::ClassCells, RowStrategy::Positional];
}

/// Raw text of one event row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFields {
    pub time: String,
    pub currency: String,
    pub name: String,
    pub impact: String,
    pub actual: Option<String>,
    pub forecast: Option<String>,
    pub previous: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedRow {
    pub fields: RowFields,
    pub strategy: RowStrategy,
}

#[derive(Default)]
struct RowCells<'a> {
    time: Option<ElementRef<'a>>,
    currency: Option<ElementRef<'a>>,
    name: Option<ElementRef<'a>>,
    impact: Option<ElementRef<'a>>,
    actual: Option<ElementRef<'a>>,
    forecast: Option<ElementRef<'a>>,
    previous: Option<ElementRef<'a>>,
}

impl RowCells<'_> {
    fn into_fields(self) -> Option<RowFields> {
        Some(RowFields {
            time: extract_text(self.time?),
            currency: extract_text(self.currency?),
            name: extract_text(self.name?),
            impact: extract_text(self.impact?),
            actual: extract_optional_text(self.actual),
            forecast: extract_optional_text(self.forecast),
            previous: extract_optional_text(self.previous),
        })
    }
}

pub struct EventRowScraper {
    time: Selector,
    currency: Selector,
    name: Selector,
    impact: Selector,
    actual: Selector,
    forecast: Selector,
    previous: Selector,
    cells: Selector,
}

impl EventRowScraper {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            time: parse_selector("td.Table-module__time___IHBtp")?,
            currency: parse_selector("td.Table-module__currency___gSAJ5")?,
            name: parse_selector("td.Table-module__name___FugPe")?,
            impact: parse_selector("td.Table-module__impact___kYuei")?,
            actual: parse_selector("td.Table-module__actual___kzVNq")?,
            forecast: parse_selector("td.Table-module__forecast___WchYX")?,
            previous: parse_selector("td.Table-module__previous___F0PHu")?,
            cells: parse_selector("td, th")?,
        })
    }

    /// Pulls the raw cell text out of a row, trying each strategy in turn.
    /// Header rows and rows missing a required cell yield nothing.
    pub fn extract_row(&self, row: ElementRef) -> Option<ExtractedRow> {
        let cells: Vec<ElementRef> = row.select(&self.cells).collect();
        if !cells.is_empty() && cells.iter().all(|cell| cell.value().name() == "th") {
            return None;
        }

        RowStrategy::CASCADE.into_iter().find_map(|strategy| {
            let found = match strategy {
                RowStrategy::ClassCells => self.class_cells(row),
                RowStrategy::Positional => positional_cells(&cells),
            };
            found
                .into_fields()
                .map(|fields| ExtractedRow { fields, strategy })
        })
    }

    /// Builds the event for a row of the given day.
    pub fn scrape_row(&self, row: ElementRef, day: &DayInfo) -> Option<EconomicEvent> {
        let Some(extracted) = self.extract_row(row) else {
            debug!("row without required cells skipped: {:?}", extract_text(row));
            return None;
        };
        if extracted.strategy == RowStrategy::Positional {
            debug!("row resolved by column position");
        }
        Some(build_event(day, extracted.fields))
    }

    fn class_cells<'a>(&self, row: ElementRef<'a>) -> RowCells<'a> {
        RowCells {
            time: row.select(&self.time).next(),
            currency: row.select(&self.currency).next(),
            name: row.select(&self.name).next(),
            impact: row.select(&self.impact).next(),
            actual: row.select(&self.actual).next(),
            forecast: row.select(&self.forecast).next(),
            previous: row.select(&self.previous).next(),
        }
    }
}

fn positional_cells<'a>(cells: &[ElementRef<'a>]) -> RowCells<'a> {
    if cells.len() < 4 {
        return RowCells::default();
    }
    RowCells {
        time: cells.first().copied(),
        currency: cells.get(1).copied(),
        name: cells.get(2).copied(),
        impact: cells.get(3).copied(),
        actual: cells.get(4).copied(),
        forecast: cells.get(5).copied(),
        previous: cells.get(6).copied(),
    }
}

/// Derives impact, timestamp and session and assembles the event.
pub fn build_event(day: &DayInfo, fields: RowFields) -> EconomicEvent {
    let timestamp = calculate_timestamp(&day.year, &day.month_num, &day.day_number, &fields.time);
    let session = determine_session(&fields.time);
    EconomicEvent {
        year: day.year.clone(),
        week: day.week.clone(),
        month_num: day.month_num.clone(),
        month_name: day.month_name.clone(),
        day_number: day.day_number.clone(),
        week_day: day.week_day.clone(),
        impact: normalize_impact(&fields.impact),
        time: fields.time,
        currency_name: fields.currency,
        source_name: fields.name,
        actual: fields.actual,
        forecast: fields.forecast,
        previous: fields.previous,
        timestamp,
        session,
    }
}
