use log::warn;
use regex::{Regex, RegexBuilder};

use crate::models::{DayGroup, EconomicEvent, FilterParams};
use crate::normalize::{ALL_DAY, hour_in_range, normalize_impact};

/// Narrows `events` by every criterion present in `filters`.
///
/// Each pass is an independent intersection, so the order of the passes
/// does not change the result.
pub fn apply_filters(events: Vec<EconomicEvent>, filters: &FilterParams) -> Vec<EconomicEvent> {
    let mut events = events;

    if let Some(impacts) = non_empty(&filters.impact) {
        let wanted: Vec<String> = impacts.iter().map(|i| normalize_impact(i)).collect();
        events.retain(|e| wanted.contains(&normalize_impact(&e.impact)));
    }

    if let Some(pairs) = non_empty(&filters.pairs) {
        let wanted: Vec<String> = pairs.iter().map(|p| p.trim().to_uppercase()).collect();
        events.retain(|e| wanted.contains(&e.currency_name.to_uppercase()));
    }

    if let Some(sessions) = non_empty(&filters.sessions) {
        events.retain(|e| e.session.is_some_and(|s| sessions.contains(&s)));
    }

    if let Some(patterns) = non_empty(&filters.events) {
        match keyword_matcher(patterns) {
            Some(matcher) => events.retain(|e| matcher.is_match(&e.source_name)),
            None => warn!("event patterns {patterns:?} could not be compiled, ignoring them"),
        }
    }

    if let Some((start, end)) = &filters.time_range {
        events = filter_by_time_range(events, start, end);
    }

    events
}

fn non_empty<T>(list: &Option<Vec<T>>) -> Option<&[T]> {
    list.as_deref().filter(|l| !l.is_empty())
}

/// Case-insensitive alternation of the patterns. Patterns that do not form a
/// valid regex are matched literally instead.
pub fn keyword_matcher(patterns: &[String]) -> Option<Regex> {
    let build = |pattern: &str| RegexBuilder::new(pattern).case_insensitive(true).build();
    let joined = patterns.join("|");
    match build(&joined) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("event pattern {joined:?} is not a valid regex ({e}), matching literally");
            let literal: Vec<String> = patterns.iter().map(|p| regex::escape(p)).collect();
            build(&literal.join("|")).ok()
        }
    }
}

/// Keeps events whose hour lies in `[start, end]`, wrapping past midnight
/// when `start > end`.
///
/// Events without a clock time ("All Day", empty) are dropped. An event whose
/// hour cannot be read is kept. Unreadable bounds disable the pass.
pub fn filter_by_time_range(
    events: Vec<EconomicEvent>,
    start: &str,
    end: &str,
) -> Vec<EconomicEvent> {
    let (Some(start_hour), Some(end_hour)) = (bound_hour(start), bound_hour(end)) else {
        warn!("time range ({start:?}, {end:?}) is malformed, ignoring it");
        return events;
    };

    events
        .into_iter()
        .filter(|e| {
            let time = e.time.trim();
            if time.is_empty() || time == ALL_DAY {
                return false;
            }
            match event_hour(time) {
                Some(hour) => hour_in_range(hour, start_hour, end_hour),
                None => true,
            }
        })
        .collect()
}

fn bound_hour(bound: &str) -> Option<u32> {
    let hour: u32 = bound.split(':').next()?.trim().parse().ok()?;
    (hour <= 23).then_some(hour)
}

fn event_hour(time: &str) -> Option<u32> {
    time.split(':').next()?.trim().parse().ok()
}

/// Partitions events by calendar day, keyed "year-month-day", in order of
/// first appearance. Events keep their relative order within a day.
pub fn group_by_day(events: Vec<EconomicEvent>) -> Vec<DayGroup> {
    let mut groups: Vec<DayGroup> = Vec::new();
    for event in events {
        let key = format!("{}-{}-{}", event.year, event.month_num, event.day_number);
        match groups.iter_mut().find(|g| g.key == key) {
            Some(group) => group.events.push(event),
            None => groups.push(DayGroup {
                key,
                events: vec![event],
            }),
        }
    }
    groups
}
