//! Filter Module
//! Month and day-of-week filters chosen by the user.

use std::fmt;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Number of months covered by the data set (January through June).
pub const FILTERABLE_MONTHS: u32 = 6;

/// English name of a month number (1 = January).
pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// English name of a weekday, Monday first.
pub fn day_name(weekday: chrono::Weekday) -> &'static str {
    DAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Month filter: either every month or a single month number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonthFilter {
    #[default]
    All,
    Month(u32),
}

impl MonthFilter {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        if input == "all" {
            return Some(MonthFilter::All);
        }
        MONTH_NAMES
            .iter()
            .take(FILTERABLE_MONTHS as usize)
            .position(|name| name.to_lowercase() == input)
            .map(|idx| MonthFilter::Month(idx as u32 + 1))
    }
}

impl fmt::Display for MonthFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthFilter::All => f.write_str("all"),
            MonthFilter::Month(m) => f.write_str(month_name(*m).unwrap_or("unknown")),
        }
    }
}

/// Day filter: either every day or a single weekday name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayFilter {
    #[default]
    All,
    Day(&'static str),
}

impl DayFilter {
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        if input == "all" {
            return Some(DayFilter::All);
        }
        DAY_NAMES
            .iter()
            .find(|name| name.to_lowercase() == input)
            .map(|name| DayFilter::Day(*name))
    }
}

impl fmt::Display for DayFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayFilter::All => f.write_str("all"),
            DayFilter::Day(d) => f.write_str(d),
        }
    }
}

/// Month and day filters applied to a city's trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TripFilter {
    pub month: MonthFilter,
    pub day: DayFilter,
}
