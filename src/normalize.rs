use chrono::NaiveDate;
use log::debug;

use crate::models::Session;

const MONTHS: [(&str, &str); 12] = [
    ("Jan", "01"),
    ("Feb", "02"),
    ("Mar", "03"),
    ("Apr", "04"),
    ("May", "05"),
    ("Jun", "06"),
    ("Jul", "07"),
    ("Aug", "08"),
    ("Sep", "09"),
    ("Oct", "10"),
    ("Nov", "11"),
    ("Dec", "12"),
];

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub const ALL_DAY: &str = "All Day";

/// Returned in place of a timestamp that could not be derived.
pub const TIMESTAMP_SENTINEL: &str = "0";

/// Two-digit month number for a month label ("Jan", "January", "jan.").
/// Unrecognised labels fall back to "01".
pub fn month_number(month_name: &str) -> &'static str {
    let prefix: String = month_name.trim().chars().take(3).collect();
    MONTHS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&prefix))
        .map_or("01", |(_, num)| num)
}

/// Canonical three-letter label for a month label, if it is one.
pub fn month_abbrev(month_name: &str) -> Option<&'static str> {
    let prefix: String = month_name.trim().chars().take(3).collect();
    MONTHS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(&prefix))
        .map(|(name, _)| *name)
}

/// Full weekday name for a label such as "Mon", "tue" or "Wednesday".
pub fn weekday_name(label: &str) -> Option<&'static str> {
    let label = label.trim();
    if label.len() < 3 {
        return None;
    }
    WEEKDAYS.into_iter().find(|day| {
        day.len() >= label.len() && day[..label.len()].eq_ignore_ascii_case(label)
    })
}

/// Maps raw impact text onto Low/Medium/High.
///
/// Matching is case-insensitive and ignores surrounding whitespace. Other
/// non-empty values are capitalised as-is, empty input becomes "Unknown".
pub fn normalize_impact(impact: &str) -> String {
    let trimmed = impact.trim();
    match trimmed.to_lowercase().as_str() {
        "" => "Unknown".to_string(),
        "low" | "l" => "Low".to_string(),
        "med" | "medium" | "m" => "Medium".to_string(),
        "high" | "h" => "High".to_string(),
        _ => capitalize(trimmed),
    }
}

// First character upper-cased, the rest lower-cased.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Hour from the leading one or two digits of a time text ("8:30" -> 8).
pub fn leading_hour(time: &str) -> Option<u32> {
    let digits: String = time
        .trim()
        .chars()
        .take_while(char::is_ascii_digit)
        .take(2)
        .collect();
    digits.parse().ok()
}

/// First session, in `Session::ALL` order, whose window contains `hour`.
pub fn session_for_hour(hour: u32) -> Option<Session> {
    Session::ALL.into_iter().find(|session| {
        session
            .windows()
            .iter()
            .any(|&(start, end)| hour_in_range(hour, start, end))
    })
}

/// Inclusive hour range membership; `start > end` wraps past midnight.
pub fn hour_in_range(hour: u32, start: u32, end: u32) -> bool {
    if start <= end {
        start <= hour && hour <= end
    } else {
        hour >= start || hour <= end
    }
}

/// Trading session for an event time. "All Day", empty or unparsable
/// times have none.
pub fn determine_session(time: &str) -> Option<Session> {
    let time = time.trim();
    if time.is_empty() || time == ALL_DAY {
        return None;
    }
    leading_hour(time).and_then(session_for_hour)
}

/// UTC epoch seconds for the event, as text, or the "0" sentinel.
pub fn calculate_timestamp(year: &str, month_num: &str, day_number: &str, time: &str) -> String {
    match epoch_seconds(year, month_num, day_number, time) {
        Some(ts) => ts.to_string(),
        None => {
            debug!("could not derive timestamp for {year}-{month_num}-{day_number} {time:?}");
            TIMESTAMP_SENTINEL.to_string()
        }
    }
}

fn epoch_seconds(year: &str, month_num: &str, day_number: &str, time: &str) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(
        year.trim().parse().ok()?,
        month_num.trim().parse().ok()?,
        day_number.trim().parse().ok()?,
    )?;
    let time = time.trim();
    let (hour, minute) = if time.is_empty() || time == ALL_DAY {
        (0, 0)
    } else if let Some((hour, minute)) = time.split_once(':') {
        (hour.trim().parse().ok()?, minute.trim().parse().ok()?)
    } else {
        let hour: String = time.chars().take(2).collect();
        (hour.parse().ok()?, 0)
    };
    Some(date.and_hms_opt(hour, minute, 0)?.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn impact_normalization_is_case_insensitive_and_idempotent() {
        for raw in ["HIGH", "high", "High", "h", " H "] {
            assert_eq!(normalize_impact(raw), "High");
        }
        assert_eq!(normalize_impact("med"), "Medium");
        assert_eq!(normalize_impact("M"), "Medium");
        assert_eq!(normalize_impact("l"), "Low");
        assert_eq!(normalize_impact(""), "Unknown");
        assert_eq!(normalize_impact("   "), "Unknown");
        assert_eq!(normalize_impact("holiday"), "Holiday");
        assert_eq!(normalize_impact("NON-ECONOMIC"), "Non-economic");

        for raw in ["low", "MED", "h", "", "tentative"] {
            let once = normalize_impact(raw);
            assert_eq!(normalize_impact(&once), once);
        }
    }

    #[test]
    fn every_hour_of_the_day_has_exactly_one_session() {
        let expected = [
            (0, Session::Sydney),
            (7, Session::Sydney),
            (8, Session::Tokyo),
            (9, Session::Tokyo),
            (10, Session::London),
            (12, Session::London),
            (17, Session::London),
            (18, Session::NewYork),
            (21, Session::NewYork),
            (22, Session::Sydney),
            (23, Session::Sydney),
        ];
        for (hour, session) in expected {
            assert_eq!(session_for_hour(hour), Some(session), "hour {hour}");
        }
        for hour in 0..24 {
            assert!(session_for_hour(hour).is_some(), "hour {hour} unmapped");
        }
        assert_eq!(session_for_hour(24), None);
    }

    #[test]
    fn session_from_time_text() {
        assert_eq!(determine_session("13:45"), Some(Session::London));
        assert_eq!(determine_session("8:30"), Some(Session::Tokyo));
        assert_eq!(determine_session("19:00"), Some(Session::NewYork));
        assert_eq!(determine_session("All Day"), None);
        assert_eq!(determine_session(""), None);
        assert_eq!(determine_session("Tentative"), None);
    }

    #[test]
    fn timestamp_for_all_day_is_midnight_utc() {
        // 2025-01-06T00:00:00Z
        assert_eq!(calculate_timestamp("2025", "01", "6", "All Day"), "1736121600");
        assert_eq!(calculate_timestamp("2025", "01", "06", ""), "1736121600");
    }

    #[test]
    fn timestamp_parses_hour_and_minute() {
        // 2025-01-06T08:30:00Z
        assert_eq!(calculate_timestamp("2025", "01", "6", "08:30"), "1736152200");
        // No colon: leading two characters are the hour.
        assert_eq!(calculate_timestamp("2025", "01", "6", "08"), "1736150400");
    }

    #[test]
    fn timestamp_falls_back_to_sentinel() {
        assert_eq!(calculate_timestamp("2025", "02", "30", "10:00"), "0");
        assert_eq!(calculate_timestamp("2025", "01", "6", "Tentative"), "0");
        assert_eq!(calculate_timestamp("2025", "01", "6", "25:00"), "0");
        assert_eq!(calculate_timestamp("", "01", "6", "10:00"), "0");
    }

    #[test]
    fn month_and_weekday_lookup() {
        assert_eq!(month_number("Dec"), "12");
        assert_eq!(month_number("january"), "01");
        assert_eq!(month_number("Sept"), "09");
        assert_eq!(month_number("???"), "01");
        assert_eq!(month_abbrev("oct"), Some("Oct"));
        assert_eq!(month_abbrev("Foo"), None);
        assert_eq!(weekday_name("Tue"), Some("Tuesday"));
        assert_eq!(weekday_name("friday"), Some("Friday"));
        assert_eq!(weekday_name("Fr"), None);
    }
}
