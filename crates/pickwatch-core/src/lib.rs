//! Shared configuration types for the pickup monitor.
//!
//! Two layers: [`AppConfig`] is read from environment variables and tunes the
//! runtime (timeouts, retry budget, pacing windows), while the task file
//! ([`TasksFile`]) describes what to watch and where to send alerts.

pub mod app_config;
pub mod config;
pub mod country;
pub mod tasks;

use thiserror::Error;

pub use app_config::{AppConfig, PacingWindow};
pub use config::{load_app_config, load_app_config_from_env};
pub use country::Country;
pub use tasks::{load_tasks, parse_tasks, DeviceTarget, MonitorTask, PushChannelConfig, TasksFile};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read tasks file {path}: {source}")]
    TasksFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse tasks file: {0}")]
    TasksFileParse(#[from] serde_yaml::Error),

    #[error("invalid task configuration: {0}")]
    Validation(String),
}
