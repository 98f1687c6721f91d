//! Bikeshare Explorer - US Bikeshare Trip Data Explorer
//!
//! Loads trip records for Chicago, New York City or Washington, filters them by
//! month and day of week, and prints statistics on the selected trips.

mod cli;
mod data;
mod stats;

use clap::{Parser, ValueEnum};
use cli::{BikeshareApp, OutputFormat, Preset, Prompter, Settings, DEFAULT_PAGE_SIZE};
use data::{City, DataLoader, DayFilter, MonthFilter};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

fn parse_city(s: &str) -> Result<City, String> {
    City::parse(s).ok_or_else(|| {
        let names: Vec<String> = City::ALL.iter().map(|c| c.name().to_lowercase()).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

fn parse_month(s: &str) -> Result<MonthFilter, String> {
    MonthFilter::parse(s).ok_or_else(|| "expected january..june or all".to_string())
}

fn parse_day(s: &str) -> Result<DayFilter, String> {
    DayFilter::parse(s).ok_or_else(|| "expected monday..sunday or all".to_string())
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("page size must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Explore US bikeshare trip data.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Directory holding chicago.csv, new_york_city.csv and washington.csv
    #[arg(long, env = "BIKESHARE_DATA_DIR", default_value = ".")]
    data_dir: PathBuf,

    /// City to analyze instead of asking
    #[arg(long, value_parser = parse_city)]
    city: Option<City>,

    /// Month filter (january..june or all) instead of asking
    #[arg(long, value_parser = parse_month)]
    month: Option<MonthFilter>,

    /// Day filter (monday..sunday or all) instead of asking
    #[arg(long, value_parser = parse_day)]
    day: Option<DayFilter>,

    /// Raw trip rows shown per page
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, value_parser = parse_page_size)]
    page_size: usize,

    #[arg(long, value_enum, default_value = "text")]
    format: FormatArg,

    /// Print one report without prompting; month and day default to all
    #[arg(long, default_value_t = false, requires = "city")]
    batch: bool,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    tracing::debug!(?cli, "starting");

    let settings = Settings {
        preset: Preset {
            city: cli.city,
            month: cli.month,
            day: cli.day,
        },
        page_size: cli.page_size,
        format: cli.format.into(),
        batch: cli.batch,
    };

    let prompter = Prompter::new(io::stdin().lock(), io::stdout().lock());
    let mut app = BikeshareApp::new(DataLoader::new(cli.data_dir), prompter, settings);
    app.run()
}
