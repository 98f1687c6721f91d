//! Stats module - Trip statistics

mod calculator;

pub use calculator::{
    Demographics, DurationStats, Popular, StationStats, StatsCalculator, TimeStats, TripReport,
    UserStats,
};
