use log::{debug, info, warn};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::event_row_scraper::EventRowScraper;
use crate::models::{DayInfo, EconomicEvent, week_label};
use crate::normalize::{WEEKDAYS, month_abbrev, month_number, weekday_name};
use crate::text_manipulators::{extract_text, parse_selector};

/// How the day of a block was recovered, most to least specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayStrategy {
    /// Month, day number and weekday elements found by class anywhere in the block.
    ClassMarkers,
    /// "Jan 6" / "Mon" style text in the table header row.
    HeaderRow,
    /// Weekday name found somewhere in the block text.
    TextScan,
}

impl DayStrategy {
    pub const CASCADE: [DayStrategy; 3] = [
        DayStrategy::ClassMarkers,
        DayStrategy::HeaderRow,
        DayStrategy::TextScan,
    ];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDay {
    pub info: DayInfo,
    /// The strategy that completed month and day number.
    pub strategy: DayStrategy,
}

#[derive(Debug, Default)]
struct PartialDay {
    month: Option<String>,
    day: Option<String>,
    weekday: Option<String>,
}

impl PartialDay {
    fn has_date(&self) -> bool {
        self.month.is_some() && self.day.is_some()
    }

    fn is_complete(&self) -> bool {
        self.has_date() && self.weekday.is_some()
    }

    fn fill(&mut self, month: Option<String>, day: Option<String>, weekday: Option<String>) {
        let keep = |s: Option<String>| s.filter(|s| !s.is_empty());
        if self.month.is_none() {
            self.month = keep(month);
        }
        if self.day.is_none() {
            self.day = keep(day);
        }
        if self.weekday.is_none() {
            self.weekday = keep(weekday);
        }
    }
}

/// Finds the day blocks of a calendar page and the event rows under each.
pub struct DayBlockScraper {
    block: Selector,
    month: Selector,
    day_number: Selector,
    weekday: Selector,
    header_row: Selector,
    thead: Selector,
    tbody: Selector,
    row: Selector,
    month_day: Regex,
    weekday_word: Regex,
    rows: EventRowScraper,
}

impl DayBlockScraper {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            block: parse_selector("div.Section-module__container___WUPgM.Table-module__day___As54H")?,
            month: parse_selector("div.Table-module__month___PGbXI")?,
            day_number: parse_selector("div.Table-module__dayNumber___dyJpm")?,
            weekday: parse_selector("td.Table-module__weekday___p3Buh")?,
            header_row: parse_selector("thead tr")?,
            thead: parse_selector("thead")?,
            tbody: parse_selector("tbody")?,
            row: parse_selector("tr")?,
            month_day: Regex::new(
                r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})\b",
            )?,
            weekday_word: Regex::new(r"(?i)\b(?:mon|tue|wed|thu|fri|sat|sun)[a-z]*\b")?,
            rows: EventRowScraper::new()?,
        })
    }

    /// Every event of one week page. Markup that does not match yields
    /// fewer (possibly zero) events, never an error.
    pub fn parse_document(&self, html: &str, year: i32, week: u32) -> Vec<EconomicEvent> {
        let document = Html::parse_document(html);
        let mut events = Vec::new();
        for (day, rows) in self.day_rows(&document, year, week) {
            let before = events.len();
            events.extend(rows.into_iter().filter_map(|row| self.rows.scrape_row(row, &day)));
            debug!(
                "{} {} {}: {} events",
                day.month_name,
                day.day_number,
                day.week_day,
                events.len() - before
            );
        }
        info!("{year}-{}: extracted {} events", week_label(week), events.len());
        events
    }

    /// Day blocks paired with their event rows.
    pub fn day_rows<'a>(
        &self,
        document: &'a Html,
        year: i32,
        week: u32,
    ) -> Vec<(DayInfo, Vec<ElementRef<'a>>)> {
        let blocks: Vec<ElementRef> = document.select(&self.block).collect();
        if blocks.is_empty() {
            warn!("{year}-{}: no day blocks found", week_label(week));
            return Vec::new();
        }
        info!("{year}-{}: found {} day blocks", week_label(week), blocks.len());

        let mut out = Vec::with_capacity(blocks.len());
        for (i, block) in blocks.into_iter().enumerate() {
            let Some(extracted) = self.extract_day_info(block, year, week) else {
                warn!("block {}: could not extract day info", i + 1);
                continue;
            };
            // Week 1 pages open with the tail of the previous December.
            if week == 1 && extracted.info.month_num == "12" {
                debug!("block {}: skipping December in W01", i + 1);
                continue;
            }
            debug!("block {}: day resolved by {:?}", i + 1, extracted.strategy);
            out.push((extracted.info, self.event_rows(block)));
        }
        out
    }

    pub fn extract_day_info(&self, block: ElementRef, year: i32, week: u32) -> Option<ExtractedDay> {
        let mut partial = PartialDay::default();
        let mut strategy = None;
        for candidate in DayStrategy::CASCADE {
            if partial.is_complete() {
                break;
            }
            match candidate {
                DayStrategy::ClassMarkers => self.apply_class_markers(block, &mut partial),
                DayStrategy::HeaderRow => self.apply_header_row(block, &mut partial),
                DayStrategy::TextScan => apply_text_scan(block, &mut partial),
            }
            if strategy.is_none() && partial.has_date() {
                strategy = Some(candidate);
            }
        }

        let (Some(month), Some(day_number), Some(strategy)) = (partial.month, partial.day, strategy)
        else {
            return None;
        };
        let month_name = month_abbrev(&month).map_or(month.clone(), str::to_string);
        Some(ExtractedDay {
            info: DayInfo {
                year: year.to_string(),
                week: week_label(week),
                month_num: month_number(&month).to_string(),
                month_name,
                day_number,
                week_day: partial.weekday.unwrap_or_else(|| "Unknown".to_string()),
            },
            strategy,
        })
    }

    /// Rows of the table body when the table has an explicit header section,
    /// otherwise every row but the first.
    ///
    /// The parser wraps bare rows in an implied `tbody`, so only a `thead`
    /// tells a real body apart from a header row sitting among the events.
    pub fn event_rows<'a>(&self, block: ElementRef<'a>) -> Vec<ElementRef<'a>> {
        if block.select(&self.thead).next().is_some() {
            if let Some(tbody) = block.select(&self.tbody).next() {
                return tbody.select(&self.row).collect();
            }
        }
        let all: Vec<ElementRef> = block.select(&self.row).collect();
        if all.len() > 1 {
            all.into_iter().skip(1).collect()
        } else {
            all
        }
    }

    fn apply_class_markers(&self, block: ElementRef, partial: &mut PartialDay) {
        let text = |sel: &Selector| block.select(sel).next().map(extract_text);
        partial.fill(text(&self.month), text(&self.day_number), text(&self.weekday));
    }

    fn apply_header_row(&self, block: ElementRef, partial: &mut PartialDay) {
        let Some(header) = block.select(&self.header_row).next() else {
            return;
        };
        let text = header.text().collect::<Vec<_>>().join(" ");
        let (month, day) = match self.month_day.captures(&text) {
            Some(caps) => (
                caps.get(1).map(|m| m.as_str().to_string()),
                caps.get(2).map(|m| m.as_str().to_string()),
            ),
            None => (None, None),
        };
        let weekday = self
            .weekday_word
            .find_iter(&text)
            .find_map(|m| weekday_name(m.as_str()))
            .map(str::to_string);
        partial.fill(month, day, weekday);
    }
}

fn apply_text_scan(block: ElementRef, partial: &mut PartialDay) {
    let text = block.text().collect::<String>();
    let weekday = WEEKDAYS
        .into_iter()
        .find(|day| text.contains(day))
        .map(str::to_string);
    partial.fill(None, None, weekday);
}
