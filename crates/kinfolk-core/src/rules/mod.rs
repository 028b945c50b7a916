pub mod almanac;
pub mod dates;
pub mod reminders;
pub mod sort;

pub use almanac::Almanac;
pub use dates::{
    age, days_until_birthday, detailed_age, formatted_birthday, local_today, parse_birthday,
    DetailedAge,
};
pub use reminders::{birthday_badge, birthday_reminders, BirthdayBadge, BirthdayReminders};
pub use sort::{compare_rows, filter_rows, sort_rows, SortColumn, SortConfig, SortDirection};
