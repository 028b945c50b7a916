use chrono::{Datelike, Local, NaiveDate};
use std::fmt;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    parse_date(trimmed)
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// The anniversary of `date` in `year`. Feb 29 falls on Feb 28 in non-leap years.
pub fn occurrence_in_year(date: NaiveDate, year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, date.month(), date.day()).or_else(|| {
        if date.month() == 2 && date.day() == 29 {
            NaiveDate::from_ymd_opt(year, 2, 28)
        } else {
            None
        }
    })
}

/// The next anniversary on or after `today`.
pub fn next_occurrence(date: NaiveDate, today: NaiveDate) -> Option<NaiveDate> {
    let current = occurrence_in_year(date, today.year())?;
    if current >= today {
        return Some(current);
    }
    occurrence_in_year(date, today.year() + 1)
}

pub fn age_on(birthday: NaiveDate, today: NaiveDate) -> u32 {
    if birthday >= today {
        return 0;
    }
    let mut years = today.year() - birthday.year();
    if let Some(occurrence) = occurrence_in_year(birthday, today.year()) {
        if today < occurrence {
            years -= 1;
        }
    }
    years.max(0) as u32
}

pub fn age(birthday: &str, today: NaiveDate) -> Option<u32> {
    parse_birthday(birthday).map(|date| age_on(date, today))
}

/// `"June 15"` for a valid date, empty for empty input, the input itself otherwise.
pub fn formatted_birthday(birthday: &str) -> String {
    if birthday.trim().is_empty() {
        return String::new();
    }
    match parse_birthday(birthday) {
        Some(date) => date.format("%B %-d").to_string(),
        None => birthday.to_string(),
    }
}

pub fn days_until_birthday(birthday: &str, today: NaiveDate) -> Option<i64> {
    let date = parse_birthday(birthday)?;
    let next = next_occurrence(date, today)?;
    Some((next - today).num_days())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetailedAge {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl fmt::Display for DetailedAge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}",
            plural(self.years, "year"),
            plural(self.months, "month")
        )?;
        if self.days > 0 {
            write!(f, ", {}", plural(self.days, "day"))?;
        }
        f.write_str(" old")
    }
}

fn plural(count: u32, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Calendar age. A negative day difference borrows the length of the month before
/// `today`'s month, a negative month difference borrows a year.
pub fn detailed_age(birthday: &str, today: NaiveDate) -> Option<DetailedAge> {
    let date = parse_birthday(birthday)?;
    if date >= today {
        return Some(DetailedAge::default());
    }

    let mut years = i64::from(today.year() - date.year());
    let mut months = i64::from(today.month()) - i64::from(date.month());
    let mut days = i64::from(today.day()) - i64::from(date.day());

    if days < 0 {
        months -= 1;
        days += days_in_previous_month(today);
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }

    Some(DetailedAge {
        years: years.max(0) as u32,
        months: months.max(0) as u32,
        days: days.max(0) as u32,
    })
}

fn days_in_previous_month(today: NaiveDate) -> i64 {
    today
        .with_day(1)
        .and_then(|first| first.pred_opt())
        .map(|last| i64::from(last.day()))
        .unwrap_or(30)
}
