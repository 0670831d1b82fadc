use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use scout_core::{Msg, SearchParameters};

/// Command-line arguments accepted by the `taskscout` binary.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(
    name = "taskscout",
    version,
    about = "Run a remote search task, wait for it and export its results"
)]
pub struct CliArgs {
    /// Search query, e.g. "ai" or "machine learning".
    pub query: String,

    /// Optional location identifier.
    #[arg(long, default_value = "")]
    pub location: String,

    #[arg(long, value_name = "YYYY-MM-DD")]
    pub start_date: Option<NaiveDate>,

    #[arg(long, value_name = "YYYY-MM-DD")]
    pub end_date: Option<NaiveDate>,

    #[arg(long, default_value_t = 5)]
    pub max_results: u32,

    /// Only look at recent posts.
    #[arg(long)]
    pub recent_only: bool,

    /// API token sent as a bearer credential.
    #[arg(long, env = "SCOUT_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Remote task to start.
    #[arg(long, env = "SCOUT_TASK_ID")]
    pub task_id: Option<String>,

    #[arg(long, env = "SCOUT_BASE_URL", value_name = "URL")]
    pub base_url: Option<String>,

    /// RON configuration file; `./taskscout.ron` is used when present.
    #[arg(short, long, value_name = "FILE", env = "SCOUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Save the results as search_results.csv.
    #[arg(long)]
    pub csv: bool,

    /// Copy the results to the clipboard. On Linux the command then waits
    /// until the text is pasted or taken by a clipboard manager.
    #[arg(long)]
    pub copy: bool,

    /// Directory the CSV file is written to.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Quote CSV fields containing commas, quotes or newlines.
    #[arg(long)]
    pub quoted_csv: bool,

    /// Seconds between status checks.
    #[arg(long, value_name = "SECS")]
    pub interval_secs: Option<u64>,

    /// Give up after this many status checks.
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,

    /// Give up after waiting this long for the run.
    #[arg(long, value_name = "SECS")]
    pub max_wait_secs: Option<u64>,

    /// Also write the log to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    pub fn params(&self) -> SearchParameters {
        SearchParameters {
            query: self.query.clone(),
            location: self.location.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            max_results: self.max_results,
            recent_only: self.recent_only,
        }
    }

    /// The form edits that reproduce these parameters in a fresh state.
    pub fn form_messages(&self) -> Vec<Msg> {
        let params = self.params();
        vec![
            Msg::QueryChanged(params.query),
            Msg::LocationChanged(params.location),
            Msg::StartDateChanged(params.start_date),
            Msg::EndDateChanged(params.end_date),
            Msg::MaxResultsChanged(params.max_results),
            Msg::RecentOnlyChanged(params.recent_only),
        ]
    }
}
