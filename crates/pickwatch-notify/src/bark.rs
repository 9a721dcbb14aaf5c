//! Bark push (<https://github.com/Finb/Bark>): `POST {server}/push`.

use reqwest::Client;
use serde::Serialize;

use crate::error::NotifyError;

const CHANNEL: &str = "bark";
const GROUP: &str = "Apple Monitor";
const DEFAULT_SOUND: &str = "glass";
const SUCCESS_CODE: i64 = 200;

#[derive(Debug, Serialize)]
struct BarkPayload<'a> {
    device_key: &'a str,
    title: &'a str,
    body: &'a str,
    category: &'a str,
    group: &'a str,
    sound: &'a str,
}

/// Send one Bark notification.
///
/// # Errors
///
/// - [`NotifyError::Http`] on transport failure.
/// - [`NotifyError::UnexpectedStatus`] on a non-2xx response.
/// - [`NotifyError::Rejected`] when the server answers with a non-200 `code`.
pub async fn send(
    client: &Client,
    server_url: &str,
    device_key: &str,
    sound: Option<&str>,
    title: &str,
    body: &str,
) -> Result<(), NotifyError> {
    let url = format!("{}/push", server_url.trim().trim_end_matches('/'));
    let payload = BarkPayload {
        device_key,
        title,
        body,
        category: title,
        group: GROUP,
        sound: sound.filter(|s| !s.trim().is_empty()).unwrap_or(DEFAULT_SOUND),
    };

    let response = client.post(&url).json(&payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NotifyError::UnexpectedStatus {
            channel: CHANNEL,
            status: status.as_u16(),
        });
    }

    // Older self-hosted servers answer with an empty or non-JSON body.
    let text = response.text().await?;
    let Ok(reply) = serde_json::from_str::<serde_json::Value>(&text) else {
        return Ok(());
    };
    match reply.get("code").and_then(serde_json::Value::as_i64) {
        Some(code) if code != SUCCESS_CODE => Err(NotifyError::Rejected {
            channel: CHANNEL,
            code,
            message: reply
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }),
        _ => Ok(()),
    }
}
