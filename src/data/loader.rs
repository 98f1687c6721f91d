//! CSV Data Loader Module
//! Handles loading a city's trip records using Polars.

use crate::data::City;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub const START_TIME: &str = "Start Time";
pub const TRIP_DURATION: &str = "Trip Duration";
pub const START_STATION: &str = "Start Station";
pub const END_STATION: &str = "End Station";
pub const USER_TYPE: &str = "User Type";
pub const GENDER: &str = "Gender";
pub const BIRTH_YEAR: &str = "Birth Year";

/// Columns every city file must provide.
pub const REQUIRED_COLUMNS: [&str; 5] =
    [START_TIME, TRIP_DURATION, START_STATION, END_STATION, USER_TYPE];

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Data file not found: {}", .0.display())]
    MissingFile(PathBuf),
    #[error("Column \"{column}\" is missing from {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },
}

/// Loads city trip files from a data directory.
pub struct DataLoader {
    data_dir: PathBuf,
}

impl DataLoader {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path of the CSV file holding a city's trips.
    pub fn path_for(&self, city: City) -> PathBuf {
        self.data_dir.join(city.file_name())
    }

    /// Load all trips recorded for a city.
    pub fn load_city(&self, city: City) -> Result<DataFrame, LoaderError> {
        let path = self.path_for(city);
        info!(%city, path = %path.display(), "loading trip data");
        self.load_csv(&path)
    }

    /// Load a CSV file and check it carries the trip columns.
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame, LoaderError> {
        if !path.is_file() {
            return Err(LoaderError::MissingFile(path.to_path_buf()));
        }

        let df = LazyCsvReader::new(path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        if let Some(column) = REQUIRED_COLUMNS
            .iter()
            .find(|name| df.column(name).is_err())
        {
            return Err(LoaderError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            });
        }

        debug!(rows = df.height(), columns = df.width(), "csv loaded");
        Ok(df)
    }
}
