//! Loose date parsing and due-date urgency.
//!
//! Emails write dates every which way ("10 March 2023", "March 10, 2023",
//! "1st December 2025", "18 Nov 2025", "10/03/2023"). [`parse_date`] turns
//! those into canonical `YYYY-MM-DD`, preferring day-first order when the
//! input is ambiguous. [`compute_urgency`] classifies a canonical due date by
//! how many days remain.

use chrono::{Datelike, NaiveDate, Utc};
use tracing::debug;

use crate::analysis::UrgencyLevel;

/// Days-remaining threshold at or below which a due date is `high`.
pub const HIGH_URGENCY_DAYS: i64 = 2;
/// Days-remaining threshold at or below which a due date is `medium`.
pub const MEDIUM_URGENCY_DAYS: i64 = 7;

const ISO_FORMAT: &str = "%Y-%m-%d";

// Day-first numeric forms come before anything month-first.
const FULL_FORMATS: &[&str] = &[
    ISO_FORMAT,
    "%Y/%m/%d",
    "%d %B %Y",
    "%d %B, %Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d-%B-%Y",
    // Two-digit years, still day-first.
    "%d/%m/%y",
    "%d-%m-%y",
    "%d.%m.%y",
    "%d %B %y",
    "%d %B, %y",
    "%B %d, %y",
    "%B %d %y",
];

// chrono's `%Y` happily reads "10" as year 10; nothing an email means is that old.
const MIN_YEAR: i32 = 1000;

// Forms with no year; the current year is assumed.
const YEARLESS_FORMATS: &[&str] = &["%d %B %Y", "%B %d %Y", "%d/%m %Y"];

const WEEKDAYS: &[&str] = &[
    "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday", "mon", "tue",
    "tues", "wed", "thu", "thur", "thurs", "fri", "sat", "sun",
];

/// Parse a loose date expression into canonical `YYYY-MM-DD`.
///
/// Returns `None` for absent, empty, or unrecognised input; never panics.
pub fn parse_date(raw: Option<&str>) -> Option<String> {
    parse_naive_date(raw).map(|d| d.format(ISO_FORMAT).to_string())
}

/// Parse a loose date expression, assuming today's UTC year when none is given.
pub fn parse_naive_date(raw: Option<&str>) -> Option<NaiveDate> {
    parse_naive_date_on(raw, Utc::now().date_naive())
}

/// Like [`parse_naive_date`] with an explicit "today" for the yearless case.
pub fn parse_naive_date_on(raw: Option<&str>, today: NaiveDate) -> Option<NaiveDate> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    // ISO datetimes ("2025-11-18T09:00:00Z") keep only the calendar date.
    if let Some(prefix) = raw.get(..10) {
        let rest = &raw[10..];
        if (rest.is_empty() || rest.starts_with('T') || rest.starts_with(' '))
            && let Some(d) = parse_with(prefix, ISO_FORMAT)
        {
            return Some(d);
        }
    }

    let cleaned = clean_date_text(raw);
    if let Some(d) = FULL_FORMATS.iter().find_map(|fmt| parse_with(&cleaned, fmt)) {
        return Some(d);
    }

    if !has_year(&cleaned) {
        let with_year = format!("{cleaned} {}", today.year());
        if let Some(d) = YEARLESS_FORMATS.iter().find_map(|fmt| parse_with(&with_year, fmt)) {
            return Some(d);
        }
    }

    debug!(raw, "unrecognised date expression");
    None
}

fn parse_with(text: &str, fmt: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, fmt)
        .ok()
        .filter(|d| d.year() >= MIN_YEAR)
}

/// Strip weekday names, ordinal suffixes, the word "of", and stray punctuation.
fn clean_date_text(raw: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    for (i, token) in raw.split_whitespace().enumerate() {
        let bare = token.trim_matches(|c: char| c == ',' || c == '.');
        let lower = bare.to_ascii_lowercase();
        if i == 0 && WEEKDAYS.contains(&lower.as_str()) {
            continue;
        }
        if lower == "of" || lower == "the" {
            continue;
        }
        let keep_comma = token.ends_with(',');
        let mut t = strip_ordinal(bare);
        if keep_comma {
            t.push(',');
        }
        tokens.push(t);
    }
    tokens.join(" ")
}

/// "1st" → "1", "22nd" → "22"; other tokens are returned unchanged.
fn strip_ordinal(token: &str) -> String {
    let digits = token.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 && digits <= 2 {
        let suffix = token[digits..].to_ascii_lowercase();
        if matches!(suffix.as_str(), "st" | "nd" | "rd" | "th") {
            return token[..digits].to_string();
        }
    }
    token.to_string()
}

fn has_year(s: &str) -> bool {
    s.split(|c: char| !c.is_ascii_digit())
        .any(|run| run.len() == 4)
}

/// Classify a canonical `YYYY-MM-DD` due date against today's UTC date.
///
/// Absent or unparseable dates are `low`.
pub fn compute_urgency(due_date_iso: Option<&str>) -> UrgencyLevel {
    compute_urgency_on(due_date_iso, Utc::now().date_naive())
}

/// Like [`compute_urgency`] with an explicit "today".
pub fn compute_urgency_on(due_date_iso: Option<&str>, today: NaiveDate) -> UrgencyLevel {
    let Some(raw) = due_date_iso.map(str::trim).filter(|s| !s.is_empty()) else {
        return UrgencyLevel::Low;
    };

    let parsed = NaiveDate::parse_from_str(raw, ISO_FORMAT).ok().or_else(|| {
        raw.get(..10)
            .and_then(|p| NaiveDate::parse_from_str(p, ISO_FORMAT).ok())
    });

    match parsed {
        Some(due) => urgency_for_delta((due - today).num_days()),
        None => {
            debug!(raw, "due date is not ISO-8601, defaulting urgency to low");
            UrgencyLevel::Low
        }
    }
}

/// Urgency for a number of days remaining (negative when overdue).
pub fn urgency_for_delta(delta_days: i64) -> UrgencyLevel {
    if delta_days <= HIGH_URGENCY_DAYS {
        UrgencyLevel::High
    } else if delta_days <= MEDIUM_URGENCY_DAYS {
        UrgencyLevel::Medium
    } else {
        UrgencyLevel::Low
    }
}
