//! Data Processor Module
//! Derives time and route columns from trip records and applies the user's filters.

use crate::data::filter::{day_name, DayFilter, MonthFilter, TripFilter};
use crate::data::loader::{END_STATION, START_STATION, START_TIME};
use chrono::{Datelike, NaiveDateTime, Timelike};
use polars::prelude::*;
use thiserror::Error;
use tracing::debug;

pub const MONTH: &str = "month";
pub const DAY_OF_WEEK: &str = "day_of_week";
pub const START_HOUR: &str = "start_hour";
pub const TRIP: &str = "trip";

const TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%m/%d/%Y %H:%M",
];

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Row {row}: cannot parse start time \"{value}\"")]
    InvalidTimestamp { row: usize, value: String },
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Handles derived columns and filtering of trip tables.
pub struct TripProcessor;

impl TripProcessor {
    /// Append `month`, `day_of_week`, `start_hour` and `trip` columns.
    ///
    /// Null start times or stations yield null derived values.
    pub fn with_derived_columns(df: &DataFrame) -> Result<DataFrame, ProcessorError> {
        let start_time = df.column(START_TIME)?.cast(&DataType::String)?;
        let start_ca = start_time.as_materialized_series().str()?;

        let n = df.height();
        let mut months: Vec<Option<u32>> = Vec::with_capacity(n);
        let mut days: Vec<Option<&'static str>> = Vec::with_capacity(n);
        let mut hours: Vec<Option<u32>> = Vec::with_capacity(n);

        for (idx, value) in start_ca.into_iter().enumerate() {
            let Some(raw) = value else {
                months.push(None);
                days.push(None);
                hours.push(None);
                continue;
            };
            let ts = parse_timestamp(raw).ok_or_else(|| ProcessorError::InvalidTimestamp {
                row: idx + 1,
                value: raw.to_string(),
            })?;
            months.push(Some(ts.month()));
            days.push(Some(day_name(ts.weekday())));
            hours.push(Some(ts.hour()));
        }

        let start_station = df.column(START_STATION)?.cast(&DataType::String)?;
        let end_station = df.column(END_STATION)?.cast(&DataType::String)?;
        let trips: Vec<Option<String>> = start_station
            .as_materialized_series()
            .str()?
            .into_iter()
            .zip(end_station.as_materialized_series().str()?.into_iter())
            .map(|pair| match pair {
                (Some(from), Some(to)) => Some(format!("{from} --> {to}")),
                _ => None,
            })
            .collect();

        let mut out = df.clone();
        out.with_column(Column::new(MONTH.into(), months))?;
        out.with_column(Column::new(DAY_OF_WEEK.into(), days))?;
        out.with_column(Column::new(START_HOUR.into(), hours))?;
        out.with_column(Column::new(TRIP.into(), trips))?;

        Ok(out)
    }

    /// Keep only trips matching the month and day filters.
    pub fn apply_filter(df: &DataFrame, filter: &TripFilter) -> Result<DataFrame, ProcessorError> {
        let mut lazy = df.clone().lazy();

        if let MonthFilter::Month(month) = filter.month {
            lazy = lazy.filter(col(MONTH).eq(lit(month)));
        }
        if let DayFilter::Day(day) = filter.day {
            lazy = lazy.filter(col(DAY_OF_WEEK).eq(lit(day)));
        }

        let filtered = lazy.collect()?;
        debug!(
            before = df.height(),
            after = filtered.height(),
            month = %filter.month,
            day = %filter.day,
            "filter applied"
        );
        Ok(filtered)
    }

    /// Rows `offset..offset + rows` of the table, clamped to its height.
    pub fn page(df: &DataFrame, offset: usize, rows: usize) -> DataFrame {
        df.slice(offset as i64, rows)
    }
}
