use crate::dto::ContactRow;
use crate::error::CoreError;
use crate::rules::dates::parse_birthday;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum SortColumn {
    Name,
    Birthday,
    Relationship,
    Age,
    FormattedBirthday,
    DaysUntilBirthday,
    LastInteraction,
}

impl SortColumn {
    pub const ALL: [SortColumn; 7] = [
        SortColumn::Name,
        SortColumn::Birthday,
        SortColumn::Relationship,
        SortColumn::Age,
        SortColumn::FormattedBirthday,
        SortColumn::DaysUntilBirthday,
        SortColumn::LastInteraction,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortColumn::Name => "name",
            SortColumn::Birthday => "birthday",
            SortColumn::Relationship => "relationship",
            SortColumn::Age => "age",
            SortColumn::FormattedBirthday => "formatted_birthday",
            SortColumn::DaysUntilBirthday => "days_until_birthday",
            SortColumn::LastInteraction => "last_interaction",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SortColumn::Name => "Name",
            SortColumn::Birthday => "Birthday",
            SortColumn::Relationship => "Relationship",
            SortColumn::Age => "Age",
            SortColumn::FormattedBirthday => "Date",
            SortColumn::DaysUntilBirthday => "Days",
            SortColumn::LastInteraction => "Last interaction",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `days_until_birthday`, `days-until-birthday` and `daysUntilBirthday`.
impl FromStr for SortColumn {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let folded: String = raw
            .trim()
            .chars()
            .filter(|ch| *ch != '_' && *ch != '-')
            .map(|ch| ch.to_ascii_lowercase())
            .collect();
        SortColumn::ALL
            .into_iter()
            .find(|column| column.as_str().replace('_', "") == folded)
            .ok_or_else(|| CoreError::InvalidSortColumn(raw.to_string()))
    }
}

impl TryFrom<String> for SortColumn {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Ascending => "asc",
            SortDirection::Descending => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = CoreError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            _ => Err(CoreError::InvalidSortDirection(raw.to_string())),
        }
    }
}

impl TryFrom<String> for SortDirection {
    type Error = CoreError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortConfig {
    pub column: SortColumn,
    pub direction: SortDirection,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            column: SortColumn::DaysUntilBirthday,
            direction: SortDirection::Ascending,
        }
    }
}

impl SortConfig {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self { column, direction }
    }

    /// Same column flips direction; another column is selected ascending.
    pub fn toggle(&mut self, column: SortColumn) {
        if self.column == column {
            self.direction = self.direction.flipped();
        } else {
            self.column = column;
            self.direction = SortDirection::Ascending;
        }
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum SortKey {
    Text(String),
    Number(i64),
    MonthDay(u32, u32),
}

fn sort_key(row: &ContactRow, column: SortColumn) -> Option<SortKey> {
    match column {
        SortColumn::Name => Some(SortKey::Text(row.name.to_lowercase())),
        SortColumn::Relationship => non_empty_text(&row.relationship),
        SortColumn::LastInteraction => row.last_interaction.as_deref().and_then(non_empty_text),
        SortColumn::Age => row.age.map(|age| SortKey::Number(i64::from(age))),
        SortColumn::DaysUntilBirthday => row.days_until_birthday.map(SortKey::Number),
        SortColumn::Birthday | SortColumn::FormattedBirthday => {
            parse_birthday(&row.birthday).map(|date| SortKey::MonthDay(date.month(), date.day()))
        }
    }
}

fn non_empty_text(value: &str) -> Option<SortKey> {
    if value.trim().is_empty() {
        None
    } else {
        Some(SortKey::Text(value.to_lowercase()))
    }
}

fn tie_break(a: &ContactRow, b: &ContactRow) -> Ordering {
    a.name
        .to_lowercase()
        .cmp(&b.name.to_lowercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.path.cmp(&b.path))
}

/// Rows without a value for the column go last in both directions.
pub fn compare_rows(a: &ContactRow, b: &ContactRow, sort: SortConfig) -> Ordering {
    match (sort_key(a, sort.column), sort_key(b, sort.column)) {
        (Some(left), Some(right)) => sort
            .direction
            .apply(left.cmp(&right).then_with(|| tie_break(a, b))),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => tie_break(a, b),
    }
}

pub fn sort_rows(rows: &mut [ContactRow], sort: SortConfig) {
    rows.sort_by(|a, b| compare_rows(a, b, sort));
}

/// Case-insensitive substring match on the name. An empty query keeps every row.
pub fn filter_rows(rows: Vec<ContactRow>, query: &str) -> Vec<ContactRow> {
    if query.is_empty() {
        return rows;
    }
    let needle = query.to_lowercase();
    rows.into_iter()
        .filter(|row| row.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{filter_rows, sort_rows, SortColumn, SortConfig, SortDirection};
    use crate::dto::ContactRow;
    use crate::error::CoreError;
    use std::path::PathBuf;

    fn row(name: &str, birthday: &str, relationship: &str, days: Option<i64>) -> ContactRow {
        ContactRow {
            name: name.to_string(),
            birthday: birthday.to_string(),
            relationship: relationship.to_string(),
            age: None,
            formatted_birthday: String::new(),
            days_until_birthday: days,
            last_interaction: None,
            path: PathBuf::from(format!("{name}.md")),
        }
    }

    fn names(rows: &[ContactRow]) -> Vec<&str> {
        rows.iter().map(|row| row.name.as_str()).collect()
    }

    fn sample() -> Vec<ContactRow> {
        vec![
            row("bob", "1980-12-01", "", Some(40)),
            row("Alice", "1995-01-20", "Family", Some(3)),
            row("carol", "", "colleague", None),
            row("Dave", "2001-01-05", "family", Some(3)),
        ]
    }

    #[test]
    fn toggle_flips_then_resets() {
        let mut sort = SortConfig::default();
        sort.toggle(SortColumn::DaysUntilBirthday);
        assert_eq!(sort.direction, SortDirection::Descending);
        sort.toggle(SortColumn::Name);
        assert_eq!(sort, SortConfig::new(SortColumn::Name, SortDirection::Ascending));
        sort.toggle(SortColumn::Name);
        assert_eq!(sort.direction, SortDirection::Descending);
    }

    #[test]
    fn name_sort_is_case_insensitive() {
        let mut rows = sample();
        sort_rows(&mut rows, SortConfig::new(SortColumn::Name, SortDirection::Ascending));
        assert_eq!(names(&rows), vec!["Alice", "bob", "carol", "Dave"]);
    }

    #[test]
    fn missing_values_stay_last_in_both_directions() {
        let mut rows = sample();
        let asc = SortConfig::new(SortColumn::DaysUntilBirthday, SortDirection::Ascending);
        sort_rows(&mut rows, asc);
        assert_eq!(names(&rows), vec!["Alice", "Dave", "bob", "carol"]);

        let desc = SortConfig::new(SortColumn::DaysUntilBirthday, SortDirection::Descending);
        sort_rows(&mut rows, desc);
        assert_eq!(names(&rows), vec!["bob", "Dave", "Alice", "carol"]);

        let rel = SortConfig::new(SortColumn::Relationship, SortDirection::Descending);
        sort_rows(&mut rows, rel);
        assert_eq!(names(&rows), vec!["Dave", "Alice", "carol", "bob"]);
    }

    #[test]
    fn descending_reverses_non_null_prefix() {
        for column in SortColumn::ALL {
            let mut asc = sample();
            sort_rows(&mut asc, SortConfig::new(column, SortDirection::Ascending));
            let mut desc = sample();
            sort_rows(&mut desc, SortConfig::new(column, SortDirection::Descending));
            assert_eq!(asc.len(), desc.len());

            let with_value = |rows: &[ContactRow]| -> Vec<String> {
                rows.iter()
                    .filter(|row| super::sort_key(row, column).is_some())
                    .map(|row| row.name.clone())
                    .collect()
            };
            let mut reversed = with_value(&asc);
            reversed.reverse();
            assert_eq!(with_value(&desc), reversed, "column {column}");
        }
    }

    #[test]
    fn birthday_sorts_by_month_and_day() {
        let mut rows = sample();
        sort_rows(&mut rows, SortConfig::new(SortColumn::Birthday, SortDirection::Ascending));
        assert_eq!(names(&rows), vec!["Dave", "Alice", "bob", "carol"]);
    }

    #[test]
    fn filter_matches_name_substring() {
        let rows = filter_rows(sample(), "AR");
        assert_eq!(names(&rows), vec!["carol"]);
        assert_eq!(filter_rows(sample(), "").len(), 4);
        assert!(filter_rows(sample(), "zzz").is_empty());
    }

    #[test]
    fn column_and_direction_parse() {
        assert_eq!(
            "daysUntilBirthday".parse::<SortColumn>(),
            Ok(SortColumn::DaysUntilBirthday)
        );
        assert_eq!("last-interaction".parse::<SortColumn>(), Ok(SortColumn::LastInteraction));
        assert_eq!(
            "path".parse::<SortColumn>(),
            Err(CoreError::InvalidSortColumn("path".into()))
        );
        assert_eq!("DESC".parse::<SortDirection>(), Ok(SortDirection::Descending));
    }
}
