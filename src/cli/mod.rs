//! CLI module - Console prompts, report rendering and the session loop

mod app;
mod prompt;
mod report;

pub use app::{BikeshareApp, OutputFormat, Settings};
pub use prompt::{Preset, Prompter};
pub use report::DEFAULT_PAGE_SIZE;
