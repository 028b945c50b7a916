use crate::dto::ContactRow;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BirthdayReminders {
    pub today: Vec<String>,
    pub tomorrow: Vec<String>,
}

impl BirthdayReminders {
    pub fn is_empty(&self) -> bool {
        self.today.is_empty() && self.tomorrow.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if !self.today.is_empty() {
            out.push(format!("It's {}'s birthday today!", join_names(&self.today)));
        }
        if !self.tomorrow.is_empty() {
            out.push(format!(
                "It's {}'s birthday tomorrow!",
                join_names(&self.tomorrow)
            ));
        }
        out
    }
}

pub fn birthday_reminders(rows: &[ContactRow]) -> BirthdayReminders {
    let mut reminders = BirthdayReminders::default();
    for row in rows {
        match row.days_until_birthday {
            Some(0) => reminders.today.push(row.name.clone()),
            Some(1) => reminders.tomorrow.push(row.name.clone()),
            _ => {}
        }
    }
    reminders
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BirthdayBadge {
    Today,
    ThisWeek,
}

pub const BADGE_WINDOW_DAYS: i64 = 7;

pub fn birthday_badge(days_until: Option<i64>) -> Option<BirthdayBadge> {
    match days_until? {
        0 => Some(BirthdayBadge::Today),
        1..=BADGE_WINDOW_DAYS => Some(BirthdayBadge::ThisWeek),
        _ => None,
    }
}

pub fn countdown_text(days_until: i64) -> String {
    match days_until {
        0 => "Birthday today!".to_string(),
        1 => "Birthday tomorrow!".to_string(),
        days => format!("{days} days until birthday"),
    }
}

/// `"a"`, `"a and b"`, `"a, b and c"`.
pub fn join_names(names: &[String]) -> String {
    match names {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    }
}
