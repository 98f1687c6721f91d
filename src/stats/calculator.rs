//! Statistics Calculator Module
//! Computes popular times, stations, trip durations and user demographics.

use crate::data::filter::month_name;
use crate::data::loader::{
    BIRTH_YEAR, END_STATION, GENDER, START_STATION, TRIP_DURATION, USER_TYPE,
};
use crate::data::processor::{DAY_OF_WEEK, MONTH, START_HOUR, TRIP};
use crate::data::{City, TripFilter};
use polars::prelude::*;
use serde::Serialize;
use statrs::statistics::{Data, Median};
use std::collections::HashMap;
use std::hash::Hash;

/// A value together with how many trips share it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popular<T> {
    pub value: T,
    pub count: usize,
}

/// Most frequent times of travel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStats {
    pub month: Popular<String>,
    pub day_of_week: Popular<String>,
    pub start_hour: Popular<u32>,
}

/// Most popular stations and trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationStats {
    pub start_station: Popular<String>,
    pub end_station: Popular<String>,
    pub trip: Popular<String>,
}

/// Trip duration summary, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub trip_count: usize,
    pub total: f64,
    pub mean: f64,
    pub median: f64,
    pub shortest: f64,
    pub longest: f64,
}

/// Gender and birth year breakdown, for cities that record them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demographics {
    pub genders: Vec<Popular<String>>,
    pub earliest_birth_year: Option<i32>,
    pub most_recent_birth_year: Option<i32>,
    pub most_common_birth_year: Option<Popular<i32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserStats {
    pub user_types: Vec<Popular<String>>,
    /// `None` when the city's data has no gender or birth year columns.
    pub demographics: Option<Demographics>,
}

/// Every statistic for one city and filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct TripReport {
    pub city: City,
    pub month: String,
    pub day: String,
    pub trip_count: usize,
    pub time: Option<TimeStats>,
    pub stations: Option<StationStats>,
    pub durations: Option<DurationStats>,
    pub users: Option<UserStats>,
}

/// Mode of the non-null values; ties go to the smallest value.
pub fn most_common<T, I>(values: I) -> Option<Popular<T>>
where
    T: Ord + Hash + Copy,
    I: IntoIterator<Item = Option<T>>,
{
    let mut counts: HashMap<T, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
        .map(|(value, count)| Popular { value, count })
}

/// Counts of each non-null value, most frequent first.
pub fn value_counts<'a, I>(values: I) -> Vec<Popular<String>>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut counted: Vec<Popular<String>> = counts
        .into_iter()
        .map(|(value, count)| Popular {
            value: value.to_string(),
            count,
        })
        .collect();
    counted.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    counted
}

/// Non-null, non-NaN values of a numeric column as `f64`.
fn float_values(df: &DataFrame, name: &str) -> PolarsResult<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column
        .as_materialized_series()
        .f64()?
        .into_iter()
        .flatten()
        .filter(|v| !v.is_nan())
        .collect())
}

fn popular_string(df: &DataFrame, name: &str) -> PolarsResult<Option<Popular<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.as_materialized_series().str()?;
    Ok(most_common(values.into_iter()).map(|p| Popular {
        value: p.value.to_string(),
        count: p.count,
    }))
}

fn popular_u32(df: &DataFrame, name: &str) -> PolarsResult<Option<Popular<u32>>> {
    let column = df.column(name)?.cast(&DataType::UInt32)?;
    let values = column.as_materialized_series().u32()?;
    Ok(most_common(values.into_iter()))
}

fn counts_of(df: &DataFrame, name: &str) -> PolarsResult<Vec<Popular<String>>> {
    let column = df.column(name)?.cast(&DataType::String)?;
    let values = column.as_materialized_series().str()?;
    Ok(value_counts(values.into_iter()))
}

/// Handles statistics over a filtered trip table.
///
/// Each section returns `Ok(None)` when the table holds no trips.
pub struct StatsCalculator;

impl StatsCalculator {
    /// Most common month, day of week and start hour.
    pub fn time_stats(df: &DataFrame) -> PolarsResult<Option<TimeStats>> {
        let (Some(month), Some(day_of_week), Some(start_hour)) = (
            popular_u32(df, MONTH)?,
            popular_string(df, DAY_OF_WEEK)?,
            popular_u32(df, START_HOUR)?,
        ) else {
            return Ok(None);
        };

        let month = Popular {
            value: month_name(month.value).unwrap_or("Unknown").to_string(),
            count: month.count,
        };

        Ok(Some(TimeStats {
            month,
            day_of_week,
            start_hour,
        }))
    }

    /// Most common start station, end station and start-to-end trip.
    pub fn station_stats(df: &DataFrame) -> PolarsResult<Option<StationStats>> {
        let (Some(start_station), Some(end_station), Some(trip)) = (
            popular_string(df, START_STATION)?,
            popular_string(df, END_STATION)?,
            popular_string(df, TRIP)?,
        ) else {
            return Ok(None);
        };

        Ok(Some(StationStats {
            start_station,
            end_station,
            trip,
        }))
    }

    /// Total, mean, median and extreme trip durations.
    pub fn duration_stats(df: &DataFrame) -> PolarsResult<Option<DurationStats>> {
        use statrs::statistics::Statistics;

        let durations = float_values(df, TRIP_DURATION)?;
        if durations.is_empty() {
            return Ok(None);
        }

        let total = durations.iter().sum::<f64>();
        let mean = durations.iter().mean();
        let shortest = durations.iter().copied().fold(f64::INFINITY, f64::min);
        let longest = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let trip_count = durations.len();
        let median = Data::new(durations).median();

        Ok(Some(DurationStats {
            trip_count,
            total,
            mean,
            median,
            shortest,
            longest,
        }))
    }

    /// User type counts, plus gender and birth year when the data has them.
    pub fn user_stats(df: &DataFrame) -> PolarsResult<Option<UserStats>> {
        if df.height() == 0 {
            return Ok(None);
        }

        let user_types = counts_of(df, USER_TYPE)?;

        let demographics = if df.column(GENDER).is_ok() && df.column(BIRTH_YEAR).is_ok() {
            Some(Self::demographics(df)?)
        } else {
            None
        };

        Ok(Some(UserStats {
            user_types,
            demographics,
        }))
    }

    fn demographics(df: &DataFrame) -> PolarsResult<Demographics> {
        let genders = counts_of(df, GENDER)?;
        let years: Vec<i32> = float_values(df, BIRTH_YEAR)?
            .into_iter()
            .map(|y| y as i32)
            .collect();

        Ok(Demographics {
            genders,
            earliest_birth_year: years.iter().copied().min(),
            most_recent_birth_year: years.iter().copied().max(),
            most_common_birth_year: most_common(years.iter().copied().map(Some)),
        })
    }

    /// Compute all four sections in parallel.
    pub fn compute_report(
        df: &DataFrame,
        city: City,
        filter: &TripFilter,
    ) -> PolarsResult<TripReport> {
        let ((time, stations), (durations, users)) = rayon::join(
            || rayon::join(|| Self::time_stats(df), || Self::station_stats(df)),
            || rayon::join(|| Self::duration_stats(df), || Self::user_stats(df)),
        );

        Ok(TripReport {
            city,
            month: filter.month.to_string(),
            day: filter.day.to_string(),
            trip_count: df.height(),
            time: time?,
            stations: stations?,
            durations: durations?,
            users: users?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::START_TIME;
    use crate::data::{DayFilter, MonthFilter, TripProcessor};

    fn chicago_trips() -> DataFrame {
        let raw = df!(
            START_TIME => [
                "2017-06-05 08:10:00", // Monday
                "2017-06-06 08:45:00", // Tuesday
                "2017-06-12 17:00:00", // Monday
                "2017-01-02 08:00:00", // Monday
            ],
            TRIP_DURATION => [300.0, 600.0, 900.0, 1200.0],
            START_STATION => ["Clark St", "Clark St", "Lake St", "Lake St"],
            END_STATION => ["Lake St", "State St", "Clark St", "State St"],
            USER_TYPE => [Some("Subscriber"), Some("Customer"), Some("Subscriber"), None],
            GENDER => [Some("Male"), Some("Female"), None, Some("Male")],
            BIRTH_YEAR => [Some(1980.0), Some(1992.0), None, Some(1980.0)],
        )
        .unwrap();
        TripProcessor::with_derived_columns(&raw).unwrap()
    }

    #[test]
    fn mode_prefers_highest_count_then_smallest_value() {
        let picked = most_common(vec![Some(3), Some(1), Some(3), Some(1), None, None, None]);
        assert_eq!(picked, Some(Popular { value: 1, count: 2 }));

        let empty: Vec<Option<u32>> = vec![None, None];
        assert_eq!(most_common(empty), None);
    }

    #[test]
    fn value_counts_sorted_by_count() {
        let counts = value_counts(vec![Some("b"), Some("a"), Some("b"), None, Some("c")]);
        let pairs: Vec<_> = counts.iter().map(|p| (p.value.as_str(), p.count)).collect();
        assert_eq!(pairs, vec![("b", 2), ("a", 1), ("c", 1)]);
    }

    #[test]
    fn popular_times() {
        let stats = StatsCalculator::time_stats(&chicago_trips()).unwrap().unwrap();
        assert_eq!(stats.month, Popular { value: "June".to_string(), count: 3 });
        assert_eq!(stats.day_of_week.value, "Monday");
        assert_eq!(stats.start_hour, Popular { value: 8, count: 3 });
    }

    #[test]
    fn popular_stations() {
        let stats = StatsCalculator::station_stats(&chicago_trips()).unwrap().unwrap();
        // Clark St and Lake St tie on starts; the smaller name wins.
        assert_eq!(stats.start_station.value, "Clark St");
        assert_eq!(stats.end_station.value, "State St");
        assert_eq!(stats.trip.value, "Clark St --> Lake St");
    }

    #[test]
    fn trip_durations() {
        let stats = StatsCalculator::duration_stats(&chicago_trips()).unwrap().unwrap();
        assert_eq!(stats.trip_count, 4);
        assert_eq!(stats.total, 3000.0);
        assert_eq!(stats.mean, 750.0);
        assert_eq!(stats.median, 750.0);
        assert_eq!(stats.shortest, 300.0);
        assert_eq!(stats.longest, 1200.0);
    }

    #[test]
    fn user_demographics() {
        let stats = StatsCalculator::user_stats(&chicago_trips()).unwrap().unwrap();
        let types: Vec<_> = stats.user_types.iter().map(|p| (p.value.as_str(), p.count)).collect();
        assert_eq!(types, vec![("Subscriber", 2), ("Customer", 1)]);

        let demo = stats.demographics.unwrap();
        assert_eq!(demo.genders[0], Popular { value: "Male".to_string(), count: 2 });
        assert_eq!(demo.earliest_birth_year, Some(1980));
        assert_eq!(demo.most_recent_birth_year, Some(1992));
        assert_eq!(demo.most_common_birth_year, Some(Popular { value: 1980, count: 2 }));
    }

    #[test]
    fn washington_has_no_demographics() {
        let trips = chicago_trips().drop(GENDER).unwrap().drop(BIRTH_YEAR).unwrap();
        let stats = StatsCalculator::user_stats(&trips).unwrap().unwrap();
        assert!(stats.demographics.is_none());
    }

    #[test]
    fn empty_selection_yields_no_sections() {
        let filter = TripFilter {
            month: MonthFilter::Month(3),
            day: DayFilter::All,
        };
        let empty = TripProcessor::apply_filter(&chicago_trips(), &filter).unwrap();
        let report = StatsCalculator::compute_report(&empty, City::Chicago, &filter).unwrap();

        assert_eq!(report.trip_count, 0);
        assert!(report.time.is_none());
        assert!(report.stations.is_none());
        assert!(report.durations.is_none());
        assert!(report.users.is_none());
    }

    #[test]
    fn report_serializes_to_json() {
        let filter = TripFilter {
            month: MonthFilter::Month(6),
            day: DayFilter::Day("Monday"),
        };
        let trips = TripProcessor::apply_filter(&chicago_trips(), &filter).unwrap();
        let report = StatsCalculator::compute_report(&trips, City::Chicago, &filter).unwrap();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["city"], "chicago");
        assert_eq!(json["month"], "June");
        assert_eq!(json["day"], "Monday");
        assert_eq!(json["trip_count"], 2);
        assert_eq!(json["durations"]["total"], 1200.0);
    }
}
