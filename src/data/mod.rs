//! Data module - CSV loading, filtering and derived columns

mod city;
pub mod filter;
pub mod loader;
pub mod processor;

pub use city::City;
pub use filter::{DayFilter, MonthFilter, TripFilter};
pub use loader::DataLoader;
pub use processor::TripProcessor;
