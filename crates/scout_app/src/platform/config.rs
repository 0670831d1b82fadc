//! Configuration resolution for taskscout.
//!
//! Values come from, in order of precedence: command-line flags and their
//! environment variables, the RON config file, and built-in defaults. The API
//! token is only ever taken from the flag or `SCOUT_API_TOKEN`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use scout_core::CsvDialect;
use scout_engine::{ApiSettings, Backoff, RetryPolicy, DEFAULT_BASE_URL};
use scout_logging::scout_info;
use serde::Deserialize;
use thiserror::Error;

use super::cli::CliArgs;

const DEFAULT_CONFIG_FILE: &str = "taskscout.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API token: pass --token or set SCOUT_API_TOKEN")]
    MissingToken,
    #[error("no task id: pass --task-id, set SCOUT_TASK_ID or add task_id to the config file")]
    MissingTaskId,
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config file {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid poll settings: {0}")]
    Poll(String),
    #[error("invalid request settings: {0}")]
    Request(String),
}

/// Shape of `taskscout.ron`. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub task_id: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub csv_dialect: Option<CsvDialect>,
    pub request_timeout_secs: Option<u64>,
    pub poll: PollConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PollConfig {
    pub interval_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub max_wait_secs: Option<u64>,
    /// Growth factor for the delay between checks; absent means fixed.
    pub backoff_factor: Option<f64>,
    pub max_interval_secs: Option<u64>,
}

/// Fully resolved settings for one run of the binary.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api: ApiSettings,
    pub policy: RetryPolicy,
    pub output_dir: PathBuf,
    pub csv_dialect: CsvDialect,
}

impl FileConfig {
    pub fn parse(path: &Path, text: &str) -> Result<Self, ConfigError> {
        ron::from_str(text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
    }

    /// Loads the file named on the command line, or the default file if it
    /// exists. An explicitly named file must exist.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&path, &text)?;
        scout_info!("Loaded configuration from {:?}", path);
        Ok(config)
    }
}

impl AppConfig {
    pub fn resolve(args: &CliArgs, file: FileConfig) -> Result<Self, ConfigError> {
        let token = non_empty(args.token.clone()).ok_or(ConfigError::MissingToken)?;
        let task_id = non_empty(args.task_id.clone())
            .or_else(|| non_empty(file.task_id.clone()))
            .ok_or(ConfigError::MissingTaskId)?;
        let base_url = non_empty(args.base_url.clone())
            .or(file.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut api = ApiSettings::new(token, task_id).with_base_url(base_url);
        if let Some(secs) = file.request_timeout_secs {
            if secs == 0 {
                return Err(ConfigError::Request(
                    "request_timeout_secs must be at least one second".into(),
                ));
            }
            api.request_timeout = Duration::from_secs(secs);
        }

        let csv_dialect = if args.quoted_csv {
            CsvDialect::Quoted
        } else {
            file.csv_dialect.unwrap_or_default()
        };

        Ok(Self {
            api,
            policy: resolve_policy(args, &file.poll)?,
            output_dir: args
                .output_dir
                .clone()
                .or(file.output_dir)
                .unwrap_or_else(|| PathBuf::from(".")),
            csv_dialect,
        })
    }
}

fn resolve_policy(args: &CliArgs, poll: &PollConfig) -> Result<RetryPolicy, ConfigError> {
    let mut policy = RetryPolicy::default();

    if let Some(secs) = args.interval_secs.or(poll.interval_secs) {
        if secs == 0 {
            return Err(ConfigError::Poll("interval must be at least one second".into()));
        }
        policy.interval = Duration::from_secs(secs);
    }
    policy.max_attempts = args.max_attempts.or(poll.max_attempts);
    if policy.max_attempts == Some(0) {
        return Err(ConfigError::Poll("max_attempts must be at least one".into()));
    }
    policy.max_wait = args
        .max_wait_secs
        .or(poll.max_wait_secs)
        .map(Duration::from_secs);
    if policy.max_wait == Some(Duration::ZERO) {
        return Err(ConfigError::Poll("max_wait must be at least one second".into()));
    }

    if let Some(factor) = poll.backoff_factor {
        if !factor.is_finite() || factor < 1.0 {
            return Err(ConfigError::Poll(format!(
                "backoff_factor must be at least 1.0, got {factor}"
            )));
        }
        let max_interval = poll
            .max_interval_secs
            .map(Duration::from_secs)
            .unwrap_or(policy.interval * 10);
        policy.backoff = Backoff::Exponential {
            factor,
            max_interval,
        };
    }

    Ok(policy)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
