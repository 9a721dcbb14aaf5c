use std::path::PathBuf;

/// An inclusive `[min_ms, max_ms]` window a random delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingWindow {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl PacingWindow {
    #[must_use]
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    /// A window that never sleeps. Useful in tests.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0, 0)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub tasks_path: PathBuf,
    pub log_level: String,
    pub request_timeout_secs: u64,
    /// Total attempts per fetch, including the first one.
    pub max_attempts: u32,
    pub retry_backoff: PacingWindow,
    pub device_jitter: PacingWindow,
}
