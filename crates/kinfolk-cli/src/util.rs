use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use kinfolk_config::AppConfig;
use kinfolk_core::dto::ContactRow;
use kinfolk_core::rules::dates::DATE_FORMAT;
use kinfolk_core::rules::{birthday_badge, BirthdayBadge};
use std::env;
use std::io::{self, Read};
use std::path::PathBuf;

use crate::error::invalid_input;

pub fn parse_date_arg(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| invalid_input(format!("invalid date {input:?}: expected YYYY-MM-DD")))
}

/// `--root`, then the configured root, then the working directory.
pub fn resolve_root(cli_root: Option<PathBuf>, config: &AppConfig) -> Result<PathBuf> {
    if let Some(root) = cli_root.or_else(|| config.root.clone()) {
        if root.as_os_str().is_empty() {
            return Err(invalid_input("root path cannot be empty"));
        }
        return Ok(root);
    }
    env::current_dir().with_context(|| "resolve working directory")
}

pub fn read_text_from_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    let trimmed = buffer.trim_end_matches(['\r', '\n']);
    Ok(trimmed.to_string())
}

pub fn badge_marker(days_until: Option<i64>) -> &'static str {
    match birthday_badge(days_until) {
        Some(BirthdayBadge::Today) => "🎂",
        Some(BirthdayBadge::ThisWeek) => "•",
        None => " ",
    }
}

pub fn format_row(row: &ContactRow) -> String {
    let age = row.age.map(|age| age.to_string()).unwrap_or_default();
    let days = row
        .days_until_birthday
        .map(|days| days.to_string())
        .unwrap_or_default();
    format!(
        "{} {:<24} {:>3}  {:<14} {:>4}  {:<14} {}",
        badge_marker(row.days_until_birthday),
        row.name,
        age,
        row.formatted_birthday,
        days,
        row.relationship,
        row.last_interaction.as_deref().unwrap_or("")
    )
}

pub fn header_line() -> String {
    format!(
        "  {:<24} {:>3}  {:<14} {:>4}  {:<14} {}",
        "NAME", "AGE", "BIRTHDAY", "DAYS", "TYPE", "LAST INTERACTION"
    )
}

#[cfg(test)]
mod tests {
    use super::{badge_marker, parse_date_arg};

    #[test]
    fn badge_marker_follows_window() {
        assert_eq!(badge_marker(Some(0)), "🎂");
        assert_eq!(badge_marker(Some(3)), "•");
        assert_eq!(badge_marker(Some(7)), "•");
        assert_eq!(badge_marker(Some(8)), " ");
        assert_eq!(badge_marker(None), " ");
    }

    #[test]
    fn parse_date_arg_rejects_other_formats() {
        assert!(parse_date_arg("2024-02-29").is_ok());
        assert!(parse_date_arg("2023-02-29").is_err());
        assert!(parse_date_arg("02/03/2024").is_err());
    }
}
