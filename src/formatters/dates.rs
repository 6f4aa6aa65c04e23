// 📅 Date Parser + day-count helpers
// Robust recogniser for the date shapes found in the court datasets.
//
// Stages (first success wins, nothing ever panics):
//   1. Fixed formats, tried in order, exact match only
//   2. "YYYY-M" / "YYYY/M" split with range checks
//   3. General inference, day-before-month for ambiguous input

use crate::error::{FormatError, FormatResult};
use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::str::FromStr;

// ============================================================================
// MONTH TABLES (fixed Spanish locale, never the host's)
// ============================================================================

pub const MONTHS_ES: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

pub const MONTHS_ES_SHORT: [&str; 12] = [
    "Ene", "Feb", "Mar", "Abr", "May", "Jun",
    "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const MONTHS_EN_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Spanish month name, 1-based ("Diciembre" for 12)
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTHS_ES.get(month.checked_sub(1)? as usize).copied()
}

pub fn month_short_name(month: u32) -> Option<&'static str> {
    MONTHS_ES_SHORT.get(month.checked_sub(1)? as usize).copied()
}

/// Month number from a full or abbreviated name, Spanish or English,
/// case-insensitive. "Setiembre", "Set" and "Sept" are accepted as well.
pub fn month_from_name(name: &str) -> Option<u32> {
    month_from_full_name(name).or_else(|| month_from_short_name(name))
}

fn month_from_full_name(name: &str) -> Option<u32> {
    if name.eq_ignore_ascii_case("setiembre") {
        return Some(9);
    }
    lookup_month(&MONTHS_ES, name).or_else(|| lookup_month(&MONTHS_EN, name))
}

fn month_from_short_name(name: &str) -> Option<u32> {
    if name.eq_ignore_ascii_case("set") || name.eq_ignore_ascii_case("sept") {
        return Some(9);
    }
    lookup_month(&MONTHS_ES_SHORT, name).or_else(|| lookup_month(&MONTHS_EN_SHORT, name))
}

fn lookup_month(table: &[&str; 12], name: &str) -> Option<u32> {
    table
        .iter()
        .position(|candidate| candidate.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

// ============================================================================
// INPUT
// ============================================================================

/// Anything a dataset cell can hold that may be a date
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateInput<'a> {
    Missing,
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(&'a str),
}

impl<'a> From<&'a str> for DateInput<'a> {
    fn from(text: &'a str) -> Self {
        DateInput::Text(text)
    }
}

impl<'a> From<&'a String> for DateInput<'a> {
    fn from(text: &'a String) -> Self {
        DateInput::Text(text.as_str())
    }
}

impl From<NaiveDate> for DateInput<'_> {
    fn from(date: NaiveDate) -> Self {
        DateInput::Date(date)
    }
}

impl From<NaiveDateTime> for DateInput<'_> {
    fn from(datetime: NaiveDateTime) -> Self {
        DateInput::DateTime(datetime)
    }
}

impl From<DateTime<Utc>> for DateInput<'_> {
    fn from(datetime: DateTime<Utc>) -> Self {
        DateInput::DateTime(datetime.naive_utc())
    }
}

impl<'a, T: Into<DateInput<'a>>> From<Option<T>> for DateInput<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(DateInput::Missing, Into::into)
    }
}

// ============================================================================
// FIXED FORMATS
// ============================================================================

/// One strptime-style pattern. Month-only patterns resolve to day 1.
struct DateFormat {
    pattern: &'static str,
    month_only: bool,
    /// Name lookup for `%B`/`%b`, resolved before chrono sees the text
    month_name: Option<fn(&str) -> Option<u32>>,
}

impl DateFormat {
    const fn full(pattern: &'static str) -> Self {
        DateFormat { pattern, month_only: false, month_name: None }
    }

    const fn month(pattern: &'static str) -> Self {
        DateFormat { pattern, month_only: true, month_name: None }
    }

    const fn named(pattern: &'static str, lookup: fn(&str) -> Option<u32>) -> Self {
        DateFormat { pattern, month_only: true, month_name: Some(lookup) }
    }
}

/// Order matters: "31-12-2024" must meet "%d-%m-%Y" before any month-first reading.
const FIXED_FORMATS: &[DateFormat] = &[
    DateFormat::full("%Y-%m-%d"),
    DateFormat::full("%d/%m/%Y"),
    DateFormat::full("%d-%m-%Y"),
    DateFormat::month("%m/%Y"),
    DateFormat::full("%Y/%m/%d"),
    DateFormat::month("%Y-%m"),
    DateFormat::full("%Y-%m-%d %H:%M:%S"),
    DateFormat::full("%d/%m/%Y %H:%M:%S"),
    DateFormat::named("%B %Y", month_from_full_name),
    DateFormat::named("%b %Y", month_from_short_name),
    DateFormat::month("%Y/%m"),
    DateFormat::month("%m-%Y"),
];

impl DateFormat {
    /// Exact match of the whole input against the pattern
    fn parse(&self, input: &str) -> Option<NaiveDate> {
        // Month names go through the Spanish tables, chrono only knows English
        let (text, pattern) = match self.month_name {
            Some(lookup) => (Cow::Owned(numeric_month(input, lookup)?), "%m %Y"),
            None => (Cow::Borrowed(input), self.pattern),
        };

        if !matches_shape(&text, pattern) {
            return None;
        }

        let mut parsed = Parsed::new();
        format::parse(&mut parsed, &text, StrftimeItems::new(pattern)).ok()?;
        if self.month_only {
            parsed.set_day(1).ok()?;
        }
        if pattern.contains("%H") {
            parsed.to_naive_time().ok()?;
        }

        parsed.to_naive_date().ok()
    }
}

/// "Diciembre 2024" → "12 2024"
fn numeric_month(input: &str, lookup: fn(&str) -> Option<u32>) -> Option<String> {
    let mut parts = input.split_whitespace();
    let (name, year) = (parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }

    Some(format!("{} {}", lookup(name)?, year))
}

/// Same layout of digit runs, separators and spaces as the pattern, with
/// every `%Y` run exactly four digits wide. chrono alone takes "24" as a
/// year and skips blanks before numbers.
fn matches_shape(text: &str, pattern: &str) -> bool {
    let mut text_shape = String::with_capacity(text.len());
    let mut widths = Vec::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c.is_ascii_digit() {
            let mut width = 1;
            while chars.next_if(char::is_ascii_digit).is_some() {
                width += 1;
            }
            widths.push(width);
            text_shape.push('#');
        } else if c.is_whitespace() {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            text_shape.push(' ');
        } else {
            text_shape.push(c);
        }
    }

    let mut pattern_shape = String::with_capacity(pattern.len());
    let mut specs = Vec::new();
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '%' {
            let Some(spec) = chars.next() else {
                return false;
            };
            specs.push(spec);
            pattern_shape.push('#');
        } else if c.is_whitespace() {
            while chars.next_if(|c| c.is_whitespace()).is_some() {}
            pattern_shape.push(' ');
        } else {
            pattern_shape.push(c);
        }
    }

    text_shape == pattern_shape
        && specs
            .iter()
            .zip(&widths)
            .all(|(spec, width)| *spec != 'Y' || *width == 4)
}

// ============================================================================
// PARSER
// ============================================================================

/// Parse a date-like value, `None` when it cannot be recognised.
///
/// # Examples:
/// ```
/// use chrono::NaiveDate;
/// use tribunal_admin::parse_date;
///
/// assert_eq!(parse_date("31/12/2024"), NaiveDate::from_ymd_opt(2024, 12, 31));
/// assert_eq!(parse_date("12/2024"), NaiveDate::from_ymd_opt(2024, 12, 1));
/// assert_eq!(parse_date(None::<&str>), None);
/// ```
pub fn parse_date<'a>(input: impl Into<DateInput<'a>>) -> Option<NaiveDate> {
    match input.into() {
        DateInput::Missing => None,
        DateInput::Date(date) => Some(date),
        DateInput::DateTime(datetime) => Some(datetime.date()),
        DateInput::Text(text) => try_parse_date(text).ok(),
    }
}

/// Text-only parser with an explicit failure
pub fn try_parse_date(text: &str) -> FormatResult<NaiveDate> {
    let s = text.trim();
    if s.is_empty() {
        return Err(FormatError::InvalidDate(text.to_string()));
    }

    if let Some(date) = FIXED_FORMATS.iter().find_map(|format| format.parse(s)) {
        return Ok(date);
    }

    if let Some(date) = split_year_month(s) {
        tracing::debug!(input = s, "date resolved by year-month split");
        return Ok(date);
    }

    if let Some(date) = infer_date(s) {
        tracing::debug!(input = s, %date, "date resolved by inference");
        return Ok(date);
    }

    Err(FormatError::InvalidDate(text.to_string()))
}

/// "2024-3" / "2024 / 03" → first day of that month
fn split_year_month(s: &str) -> Option<NaiveDate> {
    if !s.contains(['/', '-']) {
        return None;
    }

    let normalized = s.replace('/', "-");
    let parts: Vec<&str> = normalized.split('-').collect();
    let [year, month] = parts.as_slice() else {
        return None;
    };

    let year: i32 = year.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    if !(1900..=2100).contains(&year) || !(1..=12).contains(&month) {
        return None;
    }

    NaiveDate::from_ymd_opt(year, month, 1)
}

// ============================================================================
// INFERENCE FALLBACK
// ============================================================================

/// Words that may sit between date parts ("31 de diciembre de 2024")
const FILLER_WORDS: [&str; 3] = ["de", "del", "of"];

const TIME_PATTERNS: [&str; 3] = ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"];

/// Last resort for free-form input: ISO timestamps, RFC 2822, "31.12.24",
/// "20241231", "31 de diciembre de 2024", "Dec 31, 2024"...
fn infer_date(s: &str) -> Option<NaiveDate> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Some(datetime.date_naive());
    }
    if let Ok(datetime) = DateTime::parse_from_rfc2822(s) {
        return Some(datetime.date_naive());
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(datetime.date());
        }
    }

    // A time-of-day chunk ("10:30", "10:30:00.000") must be valid, then is dropped
    let mut date_chunks = Vec::new();
    for chunk in s.split_whitespace() {
        if !chunk.contains(':') {
            date_chunks.push(chunk);
        } else if !TIME_PATTERNS
            .iter()
            .any(|pattern| NaiveTime::parse_from_str(chunk, pattern).is_ok())
        {
            return None;
        }
    }
    let date_part = date_chunks.join(" ");

    let mut numbers: Vec<&str> = Vec::new();
    let mut named_month = None;
    for token in date_part
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        if token.bytes().all(|b| b.is_ascii_digit()) {
            numbers.push(token);
        } else if FILLER_WORDS.iter().any(|w| w.eq_ignore_ascii_case(token)) {
            continue;
        } else if named_month.is_none() {
            named_month = Some(month_from_name(token)?);
        } else {
            return None;
        }
    }

    match named_month {
        Some(month) => infer_with_month_name(month, &numbers),
        None => infer_numeric(&numbers),
    }
}

fn infer_with_month_name(month: u32, numbers: &[&str]) -> Option<NaiveDate> {
    match numbers {
        [year] if year.len() == 4 => NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1),
        [a, b] => {
            // The year is the four-digit token (or the one that cannot be a day)
            let (day, year) = if a.len() == 4 || a.parse::<u32>().ok()? > 31 {
                (b, a)
            } else {
                (a, b)
            };
            NaiveDate::from_ymd_opt(parse_year(year)?, month, day.parse().ok()?)
        }
        _ => None,
    }
}

fn infer_numeric(numbers: &[&str]) -> Option<NaiveDate> {
    match numbers {
        [compact] if compact.len() == 8 => NaiveDate::from_ymd_opt(
            compact[..4].parse().ok()?,
            compact[4..6].parse().ok()?,
            compact[6..].parse().ok()?,
        ),
        [year] if year.len() == 4 => NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1),
        [a, b] => {
            let (month, year) = if a.len() == 4 { (b, a) } else { (a, b) };
            if year.len() != 4 {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        [a, b, c] if a.len() == 4 => {
            let year = a.parse().ok()?;
            let (b, c): (u32, u32) = (b.parse().ok()?, c.parse().ok()?);
            NaiveDate::from_ymd_opt(year, b, c).or_else(|| NaiveDate::from_ymd_opt(year, c, b))
        }
        [a, b, c] => {
            // Day first; month first only when day-first is impossible
            let year = parse_year(c)?;
            let (a, b): (u32, u32) = (a.parse().ok()?, b.parse().ok()?);
            NaiveDate::from_ymd_opt(year, b, a).or_else(|| NaiveDate::from_ymd_opt(year, a, b))
        }
        _ => None,
    }
}

/// Four-digit years as-is; two-digit years pivot at 70 (69 → 2069, 70 → 1970)
fn parse_year(token: &str) -> Option<i32> {
    let value: i32 = token.parse().ok()?;
    match token.len() {
        4 => Some(value),
        2 if value < 70 => Some(2000 + value),
        2 => Some(1900 + value),
        _ => None,
    }
}

// ============================================================================
// DAY COUNTS & RENDERING
// ============================================================================

/// Days in the month containing `date`: next month's first day minus this
/// month's first day, so leap years and December roll over naturally.
pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = date.with_day(1).unwrap_or(date);
    match first.checked_add_months(Months::new(1)) {
        Some(next) => (next - first).num_days() as u32,
        // December of the last representable year
        None => 31,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateStyle {
    /// 31/12/2024
    #[default]
    Long,
    /// 31/12/24
    Short,
    /// 31 de Diciembre de 2024
    Text,
}

impl FromStr for DateStyle {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "largo" | "long" => Ok(DateStyle::Long),
            "corto" | "short" => Ok(DateStyle::Short),
            "texto" | "text" => Ok(DateStyle::Text),
            other => Err(anyhow::anyhow!("Unknown date style: {}", other)),
        }
    }
}

pub fn format_date_ar(date: NaiveDate, style: DateStyle) -> String {
    match style {
        DateStyle::Long => date.format("%d/%m/%Y").to_string(),
        DateStyle::Short => date.format("%d/%m/%y").to_string(),
        DateStyle::Text => format!(
            "{} de {} de {}",
            date.day(),
            month_name(date.month()).unwrap_or_default(),
            date.year()
        ),
    }
}

/// "12/2024" (month not padded), as shown in the latest-data banner
pub fn format_month_year(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.year())
}
