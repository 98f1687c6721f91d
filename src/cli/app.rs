//! Bikeshare Explorer Main Application
//! Ties prompts, loading, filtering and the report sections into the session loop.

use crate::cli::prompt::{Preset, PromptError, Prompter};
use crate::cli::report::{self, section};
use crate::data::loader::GENDER;
use crate::data::{City, DataLoader, TripFilter, TripProcessor};
use crate::stats::{StatsCalculator, TripReport};
use anyhow::Context;
use polars::prelude::*;
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::{info, warn};

/// How the statistics are written out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Session settings taken from the command line.
#[derive(Debug, Clone)]
pub struct Settings {
    pub preset: Preset,
    pub page_size: usize,
    pub format: OutputFormat,
    /// Run a single report without any questions.
    pub batch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: Preset::default(),
            page_size: report::DEFAULT_PAGE_SIZE,
            format: OutputFormat::Text,
            batch: false,
        }
    }
}

/// Interactive bikeshare session.
pub struct BikeshareApp<R, W> {
    loader: DataLoader,
    prompter: Prompter<R, W>,
    settings: Settings,
}

impl<R: BufRead, W: Write> BikeshareApp<R, W> {
    pub fn new(loader: DataLoader, prompter: Prompter<R, W>, settings: Settings) -> Self {
        Self {
            loader,
            prompter,
            settings,
        }
    }

    /// Run reports until the user declines to restart or input ends.
    pub fn run(&mut self) -> anyhow::Result<()> {
        match self.run_sessions() {
            Err(err) if matches!(err.downcast_ref::<PromptError>(), Some(PromptError::Closed)) => {
                info!("input closed, exiting");
                Ok(())
            }
            other => other,
        }
    }

    fn run_sessions(&mut self) -> anyhow::Result<()> {
        // Preset answers apply to the first report only.
        let mut preset = Some(self.settings.preset);

        loop {
            let (city, filter) = match preset.take() {
                Some(preset) if self.settings.batch => (
                    preset.city.context("batch mode needs a city")?,
                    TripFilter {
                        month: preset.month.unwrap_or_default(),
                        day: preset.day.unwrap_or_default(),
                    },
                ),
                Some(preset) => self.prompter.get_filters(&preset)?,
                None => self.prompter.get_filters(&Preset::default())?,
            };

            let trips = self.load_trips(city, &filter)?;

            // Raw rows are paged in text mode only.
            match self.settings.format {
                OutputFormat::Text => {
                    if !self.settings.batch {
                        let page_size = self.settings.page_size;
                        report::display_raw_data(&mut self.prompter, &trips, page_size)?;
                    }
                    self.write_text_report(&trips, city)?;
                }
                OutputFormat::Json => self.write_json_report(&trips, city, &filter)?,
            }

            if self.settings.batch
                || !self
                    .prompter
                    .confirm("Would you like to restart? Enter \"yes\" or \"no\".")?
            {
                return Ok(());
            }
        }
    }

    /// Load a city's trips, derive the time columns and apply the filters.
    ///
    /// Progress lines go to the output only for text reports; JSON output
    /// carries nothing but the report.
    fn load_trips(&mut self, city: City, filter: &TripFilter) -> anyhow::Result<DataFrame> {
        let text = self.settings.format == OutputFormat::Text;
        if text {
            writeln!(
                self.prompter.output(),
                "\nOK, loading data for \"{}\" city and filtering by month=\"{}\" and day=\"{}\"...",
                city,
                filter.month,
                filter.day
            )?;
        }
        let started = Instant::now();

        let raw = self
            .loader
            .load_city(city)
            .with_context(|| format!("loading trips for {city}"))?;
        if city.has_demographics() && raw.column(GENDER).is_err() {
            warn!(%city, "expected gender and birth year columns are missing");
        }
        let trips = TripProcessor::with_derived_columns(&raw)
            .with_context(|| format!("preparing trips for {city}"))?;
        let filtered = TripProcessor::apply_filter(&trips, filter)?;

        info!(
            %city,
            loaded = raw.height(),
            selected = filtered.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "trips ready"
        );
        if text {
            writeln!(
                self.prompter.output(),
                "{} of {} trips selected.",
                filtered.height(),
                raw.height()
            )?;
            self.prompter.separator()?;
        }
        Ok(filtered)
    }

    fn write_text_report(&mut self, trips: &DataFrame, city: City) -> anyhow::Result<()> {
        let out = self.prompter.output();

        section(
            out,
            "Calculating The Most Frequent Times of Travel",
            || StatsCalculator::time_stats(trips),
            report::write_time_stats,
        )?;
        section(
            out,
            "Calculating The Most Popular Stations and Trip",
            || StatsCalculator::station_stats(trips),
            report::write_station_stats,
        )?;
        section(
            out,
            "Calculating Trip Duration",
            || StatsCalculator::duration_stats(trips),
            report::write_duration_stats,
        )?;
        section(
            out,
            "Calculating User Stats",
            || StatsCalculator::user_stats(trips),
            |out, stats| report::write_user_stats(out, stats, city),
        )?;
        Ok(())
    }

    fn write_json_report(
        &mut self,
        trips: &DataFrame,
        city: City,
        filter: &TripFilter,
    ) -> anyhow::Result<()> {
        let report: TripReport = StatsCalculator::compute_report(trips, city, filter)?;
        let json = serde_json::to_string_pretty(&report)?;
        writeln!(self.prompter.output(), "{json}")?;
        Ok(())
    }

    /// The prompter's output, e.g. to inspect what was written.
    pub fn output(&mut self) -> &mut W {
        self.prompter.output()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DayFilter, MonthFilter};
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    const CHICAGO_CSV: &str = "\
,Start Time,End Time,Trip Duration,Start Station,End Station,User Type,Gender,Birth Year
1,2017-06-23 15:09:32,2017-06-23 15:14:53,321,Wood St & Hubbard St,Damen Ave & Chicago Ave,Subscriber,Male,1992.0
2,2017-05-25 18:19:03,2017-05-25 18:45:53,1610,Theater on the Lake,Sheffield Ave & Waveland Ave,Subscriber,Female,1992.0
3,2017-01-04 08:27:49,2017-01-04 08:34:45,416,May St & Taylor St,Wood St & Taylor St,Subscriber,Male,1981.0
4,2017-03-06 13:49:38,2017-03-06 13:55:28,350,Christiana Ave & Lawrence Ave,St. Louis Ave & Balmoral Ave,Subscriber,Male,1986.0
5,2017-01-17 14:53:07,2017-01-17 15:02:01,534,Clark St & Randolph St,Desplaines St & Jackson Blvd,Customer,,
6,2017-06-26 09:01:20,2017-06-26 09:11:06,586,Clinton St & Washington Blvd,Canal St & Taylor St,Subscriber,Male,1990.0
";

    type TestApp = BikeshareApp<Cursor<Vec<u8>>, Vec<u8>>;

    fn app_with(answers: &str, settings: Settings) -> (TempDir, TestApp) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("chicago.csv"), CHICAGO_CSV).unwrap();
        let prompter = Prompter::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new());
        let app = BikeshareApp::new(DataLoader::new(dir.path()), prompter, settings);
        (dir, app)
    }

    fn output_of(app: &mut TestApp) -> String {
        String::from_utf8(app.output().clone()).unwrap()
    }

    #[test]
    fn interactive_session_prints_every_section() {
        let (_dir, mut app) = app_with("chicago\njanuary\nall\nno\n", Settings::default());
        app.run().unwrap();

        let text = output_of(&mut app);
        assert!(text.contains("2 of 6 trips selected."));
        assert!(text.contains("Displaying data..."));
        assert!(text.contains("Most common month is January."));
        assert!(text.contains("Most common start hour is 8 o'clock."));
        assert!(text.contains("Total travel time is 950 seconds"));
        assert!(text.contains("Earliest year of birth is 1981"));
        assert!(text.contains("Would you like to restart?"));
    }

    #[test]
    fn restart_runs_another_report() {
        let answers = "chicago\nall\nall\nno\nyes\nchicago\njune\nmonday\nno\n";
        let (_dir, mut app) = app_with(answers, Settings::default());
        app.run().unwrap();

        let text = output_of(&mut app);
        assert_eq!(text.matches("Hello! Let's explore").count(), 2);
        assert!(text.contains("1 of 6 trips selected."));
    }

    #[test]
    fn presets_only_answer_the_first_round() {
        let settings = Settings {
            preset: Preset {
                city: Some(City::Chicago),
                ..Preset::default()
            },
            ..Settings::default()
        };
        let answers = "june\nall\nyes\nchicago\njanuary\nall\nno\n";
        let (_dir, mut app) = app_with(answers, settings);
        app.run().unwrap();

        let text = output_of(&mut app);
        let (first, second) = text.split_at(text.find("Would you like to restart?").unwrap());
        assert!(!first.contains("Would you like to see data for"));
        assert!(first.contains("2 of 6 trips selected."));
        assert!(second.contains("Would you like to see data for"));
        assert!(second.contains("2 of 6 trips selected."));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let (_dir, mut app) = app_with("chicago\n", Settings::default());
        assert!(app.run().is_ok());
    }

    #[test]
    fn batch_json_report_needs_no_input() {
        let settings = Settings {
            preset: Preset {
                city: Some(City::Chicago),
                month: Some(MonthFilter::Month(6)),
                day: Some(DayFilter::All),
            },
            format: OutputFormat::Json,
            batch: true,
            ..Settings::default()
        };
        let (_dir, mut app) = app_with("", settings);
        app.run().unwrap();

        let text = output_of(&mut app);
        let report: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(report["trip_count"], 2);
        assert_eq!(report["durations"]["total"], 907.0);
        assert_eq!(report["users"]["user_types"][0]["value"], "Subscriber");
    }

    #[test]
    fn interactive_json_skips_raw_rows() {
        let settings = Settings {
            format: OutputFormat::Json,
            page_size: 1,
            ..Settings::default()
        };
        let (_dir, mut app) = app_with("chicago\nall\nall\nno\n", settings);
        app.run().unwrap();

        let text = output_of(&mut app);
        assert!(!text.contains("Displaying data..."));
        assert!(!text.contains("see more raw data"));
        assert!(!text.contains("trips selected."));
        assert!(text.contains("\"trip_count\": 6"));
    }

    #[test]
    fn missing_city_file_is_an_error() {
        let settings = Settings {
            preset: Preset {
                city: Some(City::Washington),
                ..Preset::default()
            },
            batch: true,
            ..Settings::default()
        };
        let (_dir, mut app) = app_with("", settings);
        let err = app.run().unwrap_err();
        assert!(format!("{err:#}").contains("washington.csv"));
    }
}
