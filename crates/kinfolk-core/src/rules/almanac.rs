use chrono::{Datelike, NaiveDate};
use serde::Serialize;

const CHINESE_ANIMALS: [&str; 12] = [
    "Rat", "Ox", "Tiger", "Rabbit", "Dragon", "Snake", "Horse", "Goat", "Monkey", "Rooster",
    "Dog", "Pig",
];

const BIRTHSTONES: [&str; 12] = [
    "Garnet",
    "Amethyst",
    "Aquamarine",
    "Diamond",
    "Emerald",
    "Pearl",
    "Ruby",
    "Peridot",
    "Sapphire",
    "Opal",
    "Topaz",
    "Turquoise",
];

/// Last (month, day) of each sign, in calendar order starting with Capricorn's January tail.
const ZODIAC_ENDS: [(u32, u32, &str); 13] = [
    (1, 19, "Capricorn"),
    (2, 18, "Aquarius"),
    (3, 20, "Pisces"),
    (4, 19, "Aries"),
    (5, 20, "Taurus"),
    (6, 20, "Gemini"),
    (7, 22, "Cancer"),
    (8, 22, "Leo"),
    (9, 22, "Virgo"),
    (10, 22, "Libra"),
    (11, 21, "Scorpio"),
    (12, 21, "Sagittarius"),
    (12, 31, "Capricorn"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Almanac {
    pub zodiac: &'static str,
    pub chinese_zodiac: &'static str,
    pub season: &'static str,
    pub birthstone: &'static str,
}

impl Almanac {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            zodiac: zodiac_sign(date.month(), date.day()),
            chinese_zodiac: chinese_zodiac(date.year()),
            season: season(date.month(), date.day()),
            birthstone: birthstone(date.month()),
        }
    }
}

pub fn zodiac_sign(month: u32, day: u32) -> &'static str {
    ZODIAC_ENDS
        .iter()
        .find(|(end_month, end_day, _)| (month, day) <= (*end_month, *end_day))
        .map(|(_, _, sign)| *sign)
        .unwrap_or("Capricorn")
}

pub fn chinese_zodiac(year: i32) -> &'static str {
    CHINESE_ANIMALS[(year - 4).rem_euclid(12) as usize]
}

/// Northern hemisphere.
pub fn season(month: u32, day: u32) -> &'static str {
    match (month, day) {
        (3, 20..) | (4, _) | (5, _) | (6, ..=20) => "Spring",
        (6, _) | (7, _) | (8, _) | (9, ..=21) => "Summer",
        (9, _) | (10, _) | (11, _) | (12, ..=20) => "Autumn",
        _ => "Winter",
    }
}

pub fn birthstone(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|index| BIRTHSTONES.get(index as usize))
        .copied()
        .unwrap_or("Unknown")
}
