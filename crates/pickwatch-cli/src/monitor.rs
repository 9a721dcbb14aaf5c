//! One monitoring pass over a task's devices.
//!
//! Devices are checked strictly one after another with a random pause in
//! between; requests are never issued in parallel. A failure while checking
//! one device is logged and the pass moves on to the next.

use pickwatch_core::{AppConfig, DeviceTarget, MonitorTask};
use pickwatch_notify::{pickup_message, status_line, Notifier, NOTIFICATION_TITLE};
use pickwatch_scraper::{
    build_request, evaluate, Evaluation, FetchOutcome, Jitter, ScraperError, StoreClient,
};

/// What one device check observed. Only used for logging and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct DeviceReport {
    pub stores: usize,
    pub available: usize,
    pub delivered: usize,
    pub failed: usize,
}

pub(crate) struct Monitor {
    client: StoreClient,
    notifier: Notifier,
    device_jitter: Jitter,
}

impl Monitor {
    pub(crate) fn new(client: StoreClient, notifier: Notifier, device_jitter: Jitter) -> Self {
        Self {
            client,
            notifier,
            device_jitter,
        }
    }

    pub(crate) fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = StoreClient::new(
            config.request_timeout_secs,
            config.max_attempts,
            Jitter::new(config.retry_backoff),
        )?;
        let notifier = Notifier::new(config.request_timeout_secs)?;
        Ok(Self::new(
            client,
            notifier,
            Jitter::new(config.device_jitter),
        ))
    }

    pub(crate) fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Check every device of `task` in order. Never fails; all results are
    /// observable through logs and push notifications.
    pub(crate) async fn run_task(&self, task: &MonitorTask) {
        let label = task.label();
        tracing::info!(task = %label, devices = task.devices.len(), "monitor pass starting");

        for (index, device) in task.devices.iter().enumerate() {
            if index > 0 {
                let delay = self.device_jitter.sleep().await;
                tracing::debug!(
                    task = %label,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "paused between devices"
                );
            }

            match self.check_device(task, device).await {
                Ok(report) => tracing::debug!(
                    task = %label,
                    device = %device.device_code,
                    stores = report.stores,
                    available = report.available,
                    delivered = report.delivered,
                    failed = report.failed,
                    "device check complete"
                ),
                Err(e) => tracing::error!(
                    task = %label,
                    device = %device.device_code,
                    error = %e,
                    "device check failed"
                ),
            }
        }
    }

    /// Fetch, evaluate, and notify for a single device.
    pub(crate) async fn check_device(
        &self,
        task: &MonitorTask,
        device: &DeviceTarget,
    ) -> Result<DeviceReport, ScraperError> {
        let request = build_request(
            task.base_url(),
            &task.location,
            &device.device_code,
            task.cookie(),
        )?;

        let response = match self.client.fetch(&request).await {
            FetchOutcome::Success(response) => response,
            // The client already logged why; nothing to evaluate this cycle.
            FetchOutcome::RateLimited { .. }
            | FetchOutcome::HardFailure { .. }
            | FetchOutcome::Exhausted { .. } => return Ok(DeviceReport::default()),
        };

        let stores = match evaluate(&response, &device.device_code, &device.store_whitelist) {
            Evaluation::MissingStores => {
                tracing::info!(
                    device = %device.device_code,
                    country = %task.country,
                    "response has no store list; the device code may be wrong for this storefront \
                     (only CN and JP storefronts are supported, and part numbers differ per country)"
                );
                tracing::debug!(pickup_message = ?response.pickup_message(), "raw pickup message");
                return Ok(DeviceReport::default());
            }
            Evaluation::NoNearbyStores => {
                tracing::info!(
                    location = %task.location,
                    "no Apple Store near the configured location; check that it is correct"
                );
                return Ok(DeviceReport::default());
            }
            Evaluation::Stores(stores) => stores,
        };

        let mut report = DeviceReport {
            stores: stores.len(),
            ..DeviceReport::default()
        };

        for store in &stores {
            if !store.is_available {
                tracing::info!("{}", status_line(store));
                continue;
            }

            report.available += 1;
            let message = pickup_message(store, &task.location);
            tracing::info!("{message}");

            let summary = self
                .notifier
                .dispatch(NOTIFICATION_TITLE, &message, &device.push)
                .await;
            report.delivered += summary.delivered;
            report.failed += summary.failed;
        }

        Ok(report)
    }
}

#[cfg(test)]
#[path = "monitor_test.rs"]
mod tests;
