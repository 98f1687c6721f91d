//! Report Module
//! Text rendering of the statistics sections and paging of raw trip rows.

use crate::cli::prompt::{Prompter, SEPARATOR_WIDTH};
use crate::data::{City, TripProcessor};
use crate::stats::{DurationStats, Popular, StationStats, TimeStats, UserStats};
use polars::prelude::*;
use std::io::{self, BufRead, Write};
use std::time::Instant;

const NO_TRIPS: &str = "No trips match the selected filters.";

/// Default number of raw rows shown per page.
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// Render seconds as `1d 2h 3m 4s`, dropping leading zero units.
pub fn humanize_seconds(seconds: f64) -> String {
    let total = seconds.max(0.0).round() as u64;
    let (days, rem) = (total / 86_400, total % 86_400);
    let (hours, rem) = (rem / 3_600, rem % 3_600);
    let (minutes, secs) = (rem / 60, rem % 60);

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{days}d"));
    }
    if days > 0 || hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if days > 0 || hours > 0 || minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.push(format!("{secs}s"));
    parts.join(" ")
}

fn write_counts<W: Write>(out: &mut W, counts: &[Popular<String>]) -> io::Result<()> {
    let width = counts.iter().map(|p| p.value.len()).max().unwrap_or(0) + 4;
    for p in counts {
        writeln!(out, "{:<width$}{}", p.value, p.count)?;
    }
    Ok(())
}

/// Run one report section: heading, body, elapsed time and separator.
pub fn section<W, T>(
    out: &mut W,
    heading: &str,
    compute: impl FnOnce() -> PolarsResult<Option<T>>,
    render: impl FnOnce(&mut W, &T) -> io::Result<()>,
) -> anyhow::Result<()>
where
    W: Write,
{
    writeln!(out, "\n{heading}...\n")?;
    let started = Instant::now();

    match compute()? {
        Some(stats) => render(out, &stats)?,
        None => writeln!(out, "{NO_TRIPS}")?,
    }

    write_footer(out, started)?;
    Ok(())
}

fn write_footer<W: Write>(out: &mut W, started: Instant) -> io::Result<()> {
    writeln!(
        out,
        "\nThis took {} seconds.",
        started.elapsed().as_secs_f64()
    )?;
    writeln!(out, "{}", "-".repeat(SEPARATOR_WIDTH))
}

pub fn write_time_stats<W: Write>(out: &mut W, stats: &TimeStats) -> io::Result<()> {
    writeln!(out, "Most common month is {}.", stats.month.value)?;
    writeln!(out, "Most common day of week is {}.", stats.day_of_week.value)?;
    writeln!(
        out,
        "Most common start hour is {} o'clock.",
        stats.start_hour.value
    )
}

pub fn write_station_stats<W: Write>(out: &mut W, stats: &StationStats) -> io::Result<()> {
    writeln!(
        out,
        "Most commonly used start station is \"{}\"",
        stats.start_station.value
    )?;
    writeln!(
        out,
        "Most commonly used end station is \"{}\"",
        stats.end_station.value
    )?;
    writeln!(
        out,
        "Most common trip from start to end is \"{}\"",
        stats.trip.value
    )
}

pub fn write_duration_stats<W: Write>(out: &mut W, stats: &DurationStats) -> io::Result<()> {
    writeln!(
        out,
        "Total travel time is {} seconds ({}).",
        stats.total,
        humanize_seconds(stats.total)
    )?;
    writeln!(
        out,
        "Average travel time is {:.2} seconds ({}).",
        stats.mean,
        humanize_seconds(stats.mean)
    )?;
    writeln!(out, "Median travel time is {:.2} seconds.", stats.median)?;
    writeln!(
        out,
        "Shortest trip took {} seconds, longest took {} seconds, over {} trips.",
        stats.shortest, stats.longest, stats.trip_count
    )
}

pub fn write_user_stats<W: Write>(out: &mut W, stats: &UserStats, city: City) -> io::Result<()> {
    writeln!(out, "User Types:")?;
    write_counts(out, &stats.user_types)?;

    let Some(demo) = &stats.demographics else {
        return writeln!(
            out,
            "\n\"Gender\" and \"Birth Year\" statistics are unavailable for {city}."
        );
    };

    writeln!(out, "\nGender:")?;
    write_counts(out, &demo.genders)?;

    match (
        demo.earliest_birth_year,
        demo.most_recent_birth_year,
        &demo.most_common_birth_year,
    ) {
        (Some(earliest), Some(recent), Some(common)) => {
            writeln!(out, "\nEarliest year of birth is {earliest}")?;
            writeln!(out, "Most recent year of birth is {recent}")?;
            writeln!(out, "Most common year of birth is {}", common.value)
        }
        _ => writeln!(out, "\nNo birth years recorded for the selected trips."),
    }
}

/// Show raw trip rows a page at a time while the user asks for more.
pub fn display_raw_data<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    df: &DataFrame,
    page_size: usize,
) -> anyhow::Result<()> {
    let page_size = page_size.max(1);
    let started = Instant::now();
    writeln!(prompter.output(), "\nDisplaying data...\n")?;

    let mut offset = 0;
    loop {
        let page = TripProcessor::page(df, offset, page_size);
        writeln!(prompter.output(), "{page}")?;

        offset += page_size;
        if offset >= df.height() {
            break;
        }
        if !prompter.confirm("Would you like to see more raw data? Enter \"yes\" or \"no\".")? {
            break;
        }
    }

    write_footer(prompter.output(), started)?;
    Ok(())
}
