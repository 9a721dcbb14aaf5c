use std::time::Duration;

use pickwatch_core::PushChannelConfig;
use reqwest::Client;

use crate::error::NotifyError;
use crate::{bark, feishu};

/// Per-dispatch delivery counts, used only for logging.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed: usize,
}

/// Sends notifications through configured push channels.
pub struct Notifier {
    client: Client,
}

impl Notifier {
    /// # Errors
    ///
    /// Returns [`NotifyError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }

    /// Send through a single channel.
    ///
    /// # Errors
    ///
    /// Propagates the channel's delivery error.
    pub async fn send(
        &self,
        channel: &PushChannelConfig,
        title: &str,
        body: &str,
    ) -> Result<(), NotifyError> {
        match channel {
            PushChannelConfig::Bark { url, token, sound } => {
                bark::send(&self.client, url, token, sound.as_deref(), title, body).await
            }
            PushChannelConfig::Feishu { webhook, secret } => {
                feishu::send(&self.client, webhook, secret, title, body).await
            }
        }
    }

    /// Send to every channel in order. A failing channel is logged and
    /// skipped; it never prevents delivery to the rest.
    pub async fn dispatch(
        &self,
        title: &str,
        body: &str,
        channels: &[PushChannelConfig],
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for (index, channel) in channels.iter().enumerate() {
            match self.send(channel, title, body).await {
                Ok(()) => {
                    tracing::debug!(channel = channel.kind(), index, "notification delivered");
                    summary.delivered += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        channel = channel.kind(),
                        index,
                        error = %e,
                        "notification delivery failed"
                    );
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}
