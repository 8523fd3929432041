use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use composer_engine::{ApiSettings, ComposerSettings};
use composer_logging::LogDestination;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

/// Settings read from `composer.ron`. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub video_timeout_secs: u64,
    pub parse_poll_interval_secs: u64,
    /// How long to wait for reference files to finish parsing before giving up.
    pub parse_wait_limit_secs: u64,
    /// Upper bound on waiting for any single command to report back.
    pub event_wait_limit_secs: u64,
    pub video_prompt: String,
    pub log_level: String,
    pub log_to: LogTarget,
    pub log_file: PathBuf,
    pub state_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        let api = ApiSettings::default();
        let composer = ComposerSettings::default();
        Self {
            base_url: api.base_url,
            connect_timeout_secs: api.connect_timeout.as_secs(),
            request_timeout_secs: api.request_timeout.as_secs(),
            video_timeout_secs: api.video_timeout.as_secs(),
            parse_poll_interval_secs: composer.parse_poll_interval.as_secs(),
            parse_wait_limit_secs: 600,
            event_wait_limit_secs: 900,
            video_prompt: composer.video_prompt,
            log_level: "info".to_string(),
            log_to: LogTarget::File,
            log_file: PathBuf::from("./composer.log"),
            state_dir: PathBuf::from("."),
        }
    }
}

/// Where the configuration came from; reported once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ConfigSource {
    File(PathBuf),
    Missing(PathBuf),
    Invalid { path: PathBuf, reason: String },
}

impl AppConfig {
    pub fn api_settings(&self) -> ApiSettings {
        ApiSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            video_timeout: Duration::from_secs(self.video_timeout_secs),
        }
    }

    pub fn composer_settings(&self) -> ComposerSettings {
        ComposerSettings {
            video_prompt: self.video_prompt.clone(),
            parse_poll_interval: Duration::from_secs(self.parse_poll_interval_secs.max(1)),
        }
    }

    pub fn level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }

    pub fn parse_wait_limit(&self) -> Duration {
        Duration::from_secs(self.parse_wait_limit_secs)
    }

    pub fn event_wait_limit(&self) -> Duration {
        Duration::from_secs(self.event_wait_limit_secs)
    }
}

/// Loads the configuration, falling back to defaults when the file is
/// absent or cannot be parsed.
pub(crate) fn load(path: &Path) -> (AppConfig, ConfigSource) {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return (AppConfig::default(), ConfigSource::Missing(path.to_path_buf()));
        }
        Err(err) => {
            return (
                AppConfig::default(),
                ConfigSource::Invalid {
                    path: path.to_path_buf(),
                    reason: err.to_string(),
                },
            );
        }
    };

    match ron::from_str::<AppConfig>(&content) {
        Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
        Err(err) => (
            AppConfig::default(),
            ConfigSource::Invalid {
                path: path.to_path_buf(),
                reason: err.to_string(),
            },
        ),
    }
}
