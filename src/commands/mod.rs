mod auth;
mod config_cmd;
mod exercise;
mod report;
mod sync_cmd;
mod wellness;

pub use auth::AuthCommand;
pub use config_cmd::ConfigCommand;
pub use exercise::ExerciseCommand;
pub use report::ReportCommand;
pub use sync_cmd::SyncCommand;
pub use wellness::WellnessCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub(crate) fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", s))
}

/// Resolve an optional from/to pair: `to` defaults to today, `from` to
/// seven days before `to`.
pub(crate) fn resolve_range(
    from: &Option<String>,
    to: &Option<String>,
) -> Result<(NaiveDate, NaiveDate), String> {
    let today = Local::now().date_naive();
    let to_date = match to {
        Some(d) => parse_date(d)?,
        None => today,
    };
    let from_date = match from {
        Some(d) => parse_date(d)?,
        None => to_date - chrono::Duration::days(7),
    };
    Ok((from_date, to_date))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2025-03-10").unwrap(),
            NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
        );
        assert!(parse_date("10/03/2025").is_err());
    }

    #[test]
    fn test_resolve_range_defaults_to_last_week() {
        let (from, to) = resolve_range(&None, &None).unwrap();
        assert_eq!(to - from, chrono::Duration::days(7));
    }

    #[test]
    fn test_resolve_range_explicit() {
        let (from, to) = resolve_range(
            &Some("2025-03-01".to_string()),
            &Some("2025-03-15".to_string()),
        )
        .unwrap();
        assert_eq!(from, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());
    }
}
