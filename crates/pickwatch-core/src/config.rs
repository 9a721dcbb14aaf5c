use crate::app_config::{AppConfig, PacingWindow};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or fails validation.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value cannot be parsed or fails validation.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable has a default, so an empty environment yields a working
/// config that matches the retailer pacing the monitor was tuned against.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_window = |prefix: &str,
                        default_min: &str,
                        default_max: &str|
     -> Result<PacingWindow, ConfigError> {
        let min_var = format!("{prefix}_MIN_MS");
        let max_var = format!("{prefix}_MAX_MS");
        let min_ms = parse_u64(&min_var, default_min)?;
        let max_ms = parse_u64(&max_var, default_max)?;
        if min_ms > max_ms {
            return Err(ConfigError::InvalidEnvVar {
                var: min_var,
                reason: format!("{min_ms} is greater than {max_var}={max_ms}"),
            });
        }
        Ok(PacingWindow::new(min_ms, max_ms))
    };

    let tasks_path = PathBuf::from(or_default("PICKWATCH_TASKS_PATH", "./config/tasks.yaml"));
    let log_level = or_default("PICKWATCH_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("PICKWATCH_REQUEST_TIMEOUT_SECS", "30")?;

    let max_attempts = parse_u32("PICKWATCH_MAX_ATTEMPTS", "3")?;
    if max_attempts == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "PICKWATCH_MAX_ATTEMPTS".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let retry_backoff = parse_window("PICKWATCH_RETRY_BACKOFF", "5000", "15000")?;
    let device_jitter = parse_window("PICKWATCH_DEVICE_JITTER", "5000", "12000")?;

    Ok(AppConfig {
        tasks_path,
        log_level,
        request_timeout_secs,
        max_attempts,
        retry_backoff,
        device_jitter,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
