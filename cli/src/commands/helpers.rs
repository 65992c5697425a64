use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use tabled::{
    Table, Tabled,
    settings::{Alignment, Modify, Style, object::Columns},
};

use fitsphere_core::models::{Category, Entry};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Parse "HH:MM" or "HH:MM:SS"; defaults to the current minute.
pub(crate) fn parse_time(time_str: Option<String>) -> Result<NaiveTime> {
    match time_str {
        None => {
            let now = Local::now().time();
            NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).context("Invalid local time")
        }
        Some(s) => NaiveTime::parse_from_str(&s, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(&s, "%H:%M:%S"))
            .with_context(|| format!("Invalid time '{s}'. Use HH:MM (24-hour)")),
    }
}

pub(crate) fn parse_timestamp(
    date: Option<String>,
    time: Option<String>,
) -> Result<NaiveDateTime> {
    Ok(parse_date(date)?.and_time(parse_time(time)?))
}

pub(crate) fn parse_category(s: &str) -> Result<Category> {
    s.parse()
}

/// Ask for a y/N answer on stderr. Anything but "y"/"yes" declines.
pub(crate) fn prompt_confirm(question: &str) -> Result<bool> {
    eprint!("{question} [y/N]: ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let Some(line) = stdin.lock().lines().next() else {
        return Ok(false);
    };
    let answer = line?.trim().to_lowercase();
    Ok(matches!(answer.as_str(), "y" | "yes"))
}

pub(crate) fn print_entries_table(category: Category, entries: &[Entry]) {
    #[derive(Tabled)]
    struct EntryRow {
        #[tabled(rename = "ID")]
        id: String,
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Time")]
        time: String,
        #[tabled(rename = "Label")]
        label: String,
        #[tabled(rename = "Value")]
        value: String,
    }

    let unit = category.info().unit;
    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            id: e.id.clone(),
            date: e.timestamp.format("%Y-%m-%d").to_string(),
            time: e.timestamp.format("%H:%M").to_string(),
            label: truncate(&e.label, 30),
            value: format!("{} {unit}", category.format_value(no_neg_zero(e.value))),
        })
        .collect();

    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(4..5)).with(Alignment::right()))
        .to_string();
    println!("{table}");
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn no_neg_zero(v: f64) -> f64 {
    if v == 0.0 { 0.0 } else { v }
}

pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let end = s.char_indices().nth(max - 3).map_or(s.len(), |(i, _)| i);
        format!("{}...", &s[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_none() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(None).unwrap(), today);
    }

    #[test]
    fn test_parse_date_keywords() {
        let today = Local::now().date_naive();
        assert_eq!(parse_date(Some("today".to_string())).unwrap(), today);
        assert_eq!(
            parse_date(Some("yesterday".to_string())).unwrap(),
            today - chrono::Duration::days(1)
        );
        assert_eq!(
            parse_date(Some("tomorrow".to_string())).unwrap(),
            today + chrono::Duration::days(1)
        );
    }

    #[test]
    fn test_parse_date_iso() {
        let date = parse_date(Some("2024-01-15".to_string())).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_date_invalid() {
        assert!(parse_date(Some("nope".to_string())).is_err());
    }

    #[test]
    fn test_parse_time() {
        assert_eq!(
            parse_time(Some("07:30".to_string())).unwrap(),
            NaiveTime::from_hms_opt(7, 30, 0).unwrap()
        );
        assert_eq!(
            parse_time(Some("21:05:09".to_string())).unwrap(),
            NaiveTime::from_hms_opt(21, 5, 9).unwrap()
        );
        assert!(parse_time(Some("25:00".to_string())).is_err());
        assert!(parse_time(Some("noon".to_string())).is_err());
        assert_eq!(parse_time(None).unwrap().second(), 0);
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp(Some("2024-03-10".to_string()), Some("08:15".to_string())).unwrap();
        assert_eq!(ts.to_string(), "2024-03-10 08:15:00");
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(parse_category("Weight").unwrap(), Category::Weight);
        assert!(parse_category("protein").is_err());
    }

    #[test]
    fn test_json_error() {
        assert_eq!(json_error("bad \"input\""), r#"{"error":"bad \"input\""}"#);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world this is long", 10), "hello w...");
        assert_eq!(truncate("Crème fraîche", 10), "Crème f...");
    }

    #[test]
    fn test_no_neg_zero() {
        assert_eq!(no_neg_zero(-0.0).to_bits(), 0.0_f64.to_bits());
        assert_eq!(no_neg_zero(5.0), 5.0);
        assert_eq!(no_neg_zero(-3.0), -3.0);
    }
}
