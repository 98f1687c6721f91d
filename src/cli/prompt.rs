//! Prompt Module
//! Console questions and the validation loops for city, month and day.

use crate::data::{City, DayFilter, MonthFilter, TripFilter};
use std::io::{self, BufRead, Write};
use thiserror::Error;
use tracing::debug;

pub const SEPARATOR_WIDTH: usize = 40;

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Console I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("Input closed")]
    Closed,
}

/// Answers supplied up front, e.g. on the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct Preset {
    pub city: Option<City>,
    pub month: Option<MonthFilter>,
    pub day: Option<DayFilter>,
}

/// Asks questions on `output` and reads answers from `input`.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Where reports and prompts are written.
    pub fn output(&mut self) -> &mut W {
        &mut self.output
    }

    /// Ask once; returns the trimmed, lower-cased answer.
    pub fn ask(&mut self, question: &str) -> Result<String, PromptError> {
        writeln!(self.output, "\n{question}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim().to_lowercase())
    }

    /// Repeat the question until `parse` accepts the answer.
    pub fn choose<T>(
        &mut self,
        question: &str,
        parse: impl Fn(&str) -> Option<T>,
    ) -> Result<T, PromptError> {
        loop {
            let answer = self.ask(question)?;
            if let Some(value) = parse(&answer) {
                return Ok(value);
            }
            debug!(%answer, "rejected answer");
        }
    }

    /// Yes/no question; only `yes` counts as yes.
    pub fn confirm(&mut self, question: &str) -> Result<bool, PromptError> {
        Ok(self.ask(question)? == "yes")
    }

    /// Greet the user and collect the city and filters, skipping preset answers.
    pub fn get_filters(&mut self, preset: &Preset) -> Result<(City, TripFilter), PromptError> {
        writeln!(self.output, "Hello! Let's explore some US bikeshare data!")?;

        let city = match preset.city {
            Some(city) => city,
            None => self.choose(
                "Would you like to see data for \"Chicago\", \"New York City\", or \"Washington\"?",
                City::parse,
            )?,
        };

        let month = match preset.month {
            Some(month) => month,
            None => self.choose(
                "For which month - \"January\", \"February\", \"March\", \"April\", \"May\", \
                 \"June\", or \"all\" to apply no month filter?",
                MonthFilter::parse,
            )?,
        };

        let day = match preset.day {
            Some(day) => day,
            None => self.choose(
                "For which day - \"Monday\", \"Tuesday\", \"Wednesday\", \"Thursday\", \
                 \"Friday\", \"Saturday\", \"Sunday\", or \"all\" to apply no day filter?",
                DayFilter::parse,
            )?,
        };

        self.separator()?;
        Ok((city, TripFilter { month, day }))
    }

    pub fn separator(&mut self) -> io::Result<()> {
        writeln!(self.output, "{}", "-".repeat(SEPARATOR_WIDTH))
    }
}
