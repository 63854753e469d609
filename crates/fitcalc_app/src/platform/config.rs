//! RON configuration for the terminal client.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Command-line flags override whatever the file says.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use clap::ValueEnum;
use engine_logging::LogDestination;
use fitcalc_stream::StreamSettings;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use super::cli::Cli;

pub const CONFIG_FILENAME: &str = "fitcalc.ron";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("unknown log level {0:?}")]
    LogLevel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub stream_path: String,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: Option<u64>,
    pub log_destination: LogTarget,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        let stream = StreamSettings::default();
        Self {
            base_url: stream.base_url,
            stream_path: stream.stream_path,
            connect_timeout_secs: stream.connect_timeout.as_secs(),
            idle_timeout_secs: stream.idle_timeout.map(|d| d.as_secs()),
            log_destination: LogTarget::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load `explicit`, or `./fitcalc.ron` if it exists, or the defaults.
    /// Also returns the path that was read.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let path = PathBuf::from(CONFIG_FILENAME);
                if !path.exists() {
                    return Ok((Self::default(), None));
                }
                path
            }
        };
        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        Ok((config, Some(path)))
    }

    pub fn parse(content: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(content)
    }

    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(base_url) = &cli.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(target) = cli.log {
            self.log_destination = target;
        }
    }

    /// Configured level, raised by `-v` flags.
    pub fn level_filter(&self, verbose: u8) -> Result<LevelFilter, ConfigError> {
        let configured = LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))?;
        let requested = match verbose {
            0 => LevelFilter::Off,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };
        Ok(configured.max(requested))
    }

    pub fn stream_settings(&self) -> StreamSettings {
        StreamSettings {
            base_url: self.base_url.clone(),
            stream_path: self.stream_path.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            idle_timeout: self.idle_timeout_secs.map(Duration::from_secs),
        }
    }
}
