use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use crate::{ConfigError, Country};

/// One monitoring configuration: a storefront, a pickup location, and the
/// products to watch there. Read once per poll cycle and never mutated.
#[derive(Clone, Deserialize)]
pub struct MonitorTask {
    pub name: Option<String>,
    pub country: Country,
    /// Overrides the storefront root derived from `country`.
    pub base_url: Option<String>,
    pub location: String,
    pub cookie: Option<String>,
    /// Six-field cron expression (with seconds) for the scheduler.
    pub cron: String,
    pub devices: Vec<DeviceTarget>,
}

impl MonitorTask {
    /// Storefront root for this task, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| self.country.base_url(), |s| s.trim_end_matches('/'))
    }

    /// The configured cookie, or `None` when it is absent or blank.
    #[must_use]
    pub fn cookie(&self) -> Option<&str> {
        self.cookie.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Label used in logs and CLI filters.
    #[must_use]
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => format!("{}:{}", self.country, self.location),
        }
    }
}

impl std::fmt::Debug for MonitorTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorTask")
            .field("name", &self.name)
            .field("country", &self.country)
            .field("base_url", &self.base_url)
            .field("location", &self.location)
            .field("cookie", &self.cookie().map(|_| "[redacted]"))
            .field("cron", &self.cron)
            .field("devices", &self.devices)
            .finish()
    }
}

/// A product to watch and where to send alerts about it.
#[derive(Debug, Clone, Deserialize)]
pub struct DeviceTarget {
    /// Retailer part number. Opaque; only checked for non-emptiness.
    pub device_code: String,
    /// Store name fragments. Empty means every store.
    #[serde(default)]
    pub store_whitelist: Vec<String>,
    #[serde(default)]
    pub push: Vec<PushChannelConfig>,
}

/// Credentials for one push channel. Every configured channel receives
/// every notification for its device.
#[derive(Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushChannelConfig {
    Bark {
        url: String,
        token: String,
        sound: Option<String>,
    },
    Feishu {
        webhook: String,
        secret: String,
    },
}

impl PushChannelConfig {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            PushChannelConfig::Bark { .. } => "bark",
            PushChannelConfig::Feishu { .. } => "feishu",
        }
    }
}

impl std::fmt::Debug for PushChannelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PushChannelConfig::Bark { url, sound, .. } => f
                .debug_struct("Bark")
                .field("url", url)
                .field("token", &"[redacted]")
                .field("sound", sound)
                .finish(),
            PushChannelConfig::Feishu { .. } => f
                .debug_struct("Feishu")
                .field("webhook", &"[redacted]")
                .field("secret", &"[redacted]")
                .finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TasksFile {
    pub tasks: Vec<MonitorTask>,
}

/// Load and validate the task configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_tasks(path: &Path) -> Result<TasksFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::TasksFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_tasks(&content)
}

/// Parse and validate task configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the text is not valid YAML for the schema or
/// fails validation.
pub fn parse_tasks(content: &str) -> Result<TasksFile, ConfigError> {
    let tasks_file: TasksFile = serde_yaml::from_str(content)?;
    validate_tasks(&tasks_file)?;
    Ok(tasks_file)
}

fn validate_tasks(tasks_file: &TasksFile) -> Result<(), ConfigError> {
    if tasks_file.tasks.is_empty() {
        return Err(ConfigError::Validation(
            "at least one task must be configured".to_string(),
        ));
    }

    let mut seen_names = HashSet::new();

    for task in &tasks_file.tasks {
        let label = task.label();

        if let Some(name) = &task.name {
            if !seen_names.insert(name.trim().to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate task name: '{name}'"
                )));
            }
        }

        if task.location.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "task '{label}' has an empty location"
            )));
        }

        if task.cron.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "task '{label}' has an empty cron expression"
            )));
        }

        for device in &task.devices {
            validate_device(&label, device)?;
        }
    }

    Ok(())
}

fn validate_device(task_label: &str, device: &DeviceTarget) -> Result<(), ConfigError> {
    if device.device_code.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "task '{task_label}' has a device with an empty device_code"
        )));
    }

    for channel in &device.push {
        let complete = match channel {
            PushChannelConfig::Bark { url, token, .. } => {
                !url.trim().is_empty() && !token.trim().is_empty()
            }
            PushChannelConfig::Feishu { webhook, secret } => {
                !webhook.trim().is_empty() && !secret.trim().is_empty()
            }
        };
        if !complete {
            return Err(ConfigError::Validation(format!(
                "device '{}' in task '{task_label}' has an incomplete {} channel",
                device.device_code,
                channel.kind()
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;
