//! HTTP client for the storefront fulfillment endpoint.
//!
//! Each attempt is classified as success, throttled, or rejected. Throttling
//! (403/429/541) and transport or JSON failures consume one attempt and are
//! retried after a random backoff; any other non-2xx status is a definitive
//! rejection and ends the fetch immediately.

use std::time::Duration;

use reqwest::Client;

use crate::error::ScraperError;
use crate::pacing::Jitter;
use crate::request::FulfillmentRequest;
use crate::types::FulfillmentResponse;

/// Statuses the storefront's bot protection answers with when it throttles.
const RATE_LIMIT_STATUSES: [u16; 3] = [403, 429, 541];

const MAX_REDIRECTS: usize = 10;

/// Result of a fetch, or of a single attempt within one.
///
/// [`StoreClient::fetch`] only ever returns `Success`, `HardFailure`, or
/// `Exhausted`; `RateLimited` describes one attempt and drives the retry loop.
#[derive(Debug)]
pub enum FetchOutcome {
    Success(Box<FulfillmentResponse>),
    RateLimited { status: u16 },
    HardFailure { status: u16 },
    Exhausted { attempts: u32 },
}

fn is_rate_limited(status: u16) -> bool {
    RATE_LIMIT_STATUSES.contains(&status)
}

/// Executes fulfillment requests with a bounded, randomly paced retry loop.
pub struct StoreClient {
    client: Client,
    max_attempts: u32,
    backoff: Jitter,
}

impl StoreClient {
    /// Creates a client with the given per-request timeout, total attempt
    /// budget (including the first try), and inter-attempt backoff.
    ///
    /// The underlying client sets no `User-Agent` and no compression
    /// headers; its only default header is `Accept`, which every
    /// [`FulfillmentRequest`] overrides. The wire header set is therefore
    /// exactly the request's own.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed (e.g., invalid TLS config).
    pub fn new(timeout_secs: u64, max_attempts: u32, backoff: Jitter) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self {
            client,
            max_attempts: max_attempts.max(1),
            backoff,
        })
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Fetches and parses one fulfillment response.
    ///
    /// Never returns an error: every failure mode is folded into the
    /// returned [`FetchOutcome`].
    pub async fn fetch(&self, request: &FulfillmentRequest) -> FetchOutcome {
        tracing::debug!(url = %request.url, "fulfillment request");
        tracing::debug!(headers = ?request.redacted_headers(), "fulfillment request headers");

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let delay = self.backoff.sample();
                tracing::debug!(
                    attempt = attempt + 1,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "waiting before retry"
                );
                tokio::time::sleep(delay).await;
            }

            match self.attempt(request).await {
                Ok(FetchOutcome::RateLimited { status }) => {
                    tracing::warn!(
                        status,
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        "request throttled by storefront; retrying"
                    );
                }
                Ok(FetchOutcome::HardFailure { status }) => {
                    tracing::info!(status, url = %request.url, "request rejected; not retrying, try again later");
                    return FetchOutcome::HardFailure { status };
                }
                Ok(outcome) => return outcome,
                Err(err) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_attempts = self.max_attempts,
                        error = %err,
                        "request failed; retrying"
                    );
                }
            }
        }

        tracing::info!(
            attempts = self.max_attempts,
            "retry budget exhausted; requests are too frequent, consider a sparser cron schedule"
        );
        FetchOutcome::Exhausted {
            attempts: self.max_attempts,
        }
    }

    /// One GET. `Err` is the transient path: transport failure or a 2xx body
    /// that is not JSON.
    async fn attempt(&self, request: &FulfillmentRequest) -> Result<FetchOutcome, ScraperError> {
        let response = self
            .client
            .get(&request.url)
            .headers(request.headers.clone())
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            let body = response.text().await?;
            let parsed = serde_json::from_str::<FulfillmentResponse>(&body).map_err(|e| {
                ScraperError::Deserialize {
                    context: format!("fulfillment response from {}", request.url),
                    source: e,
                }
            })?;
            return Ok(FetchOutcome::Success(Box::new(parsed)));
        }

        if is_rate_limited(status.as_u16()) {
            return Ok(FetchOutcome::RateLimited {
                status: status.as_u16(),
            });
        }

        Ok(FetchOutcome::HardFailure {
            status: status.as_u16(),
        })
    }
}
