//! FeiShu (Lark) custom bot webhook with signature verification enabled.
//!
//! The signature is `base64(HMAC-SHA256(key = "{timestamp}\n{secret}", msg = ""))`
//! where `timestamp` is Unix seconds and must be within an hour of server time.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::{Hmac, Mac};
use reqwest::Client;
use serde::Serialize;
use sha2::Sha256;

use crate::error::NotifyError;

type HmacSha256 = Hmac<Sha256>;

const CHANNEL: &str = "feishu";

#[derive(Debug, Serialize)]
struct TextContent<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct FeishuPayload<'a> {
    timestamp: String,
    sign: String,
    msg_type: &'static str,
    content: TextContent<'a>,
}

/// Compute the webhook signature for `timestamp` (Unix seconds).
///
/// # Errors
///
/// Returns [`NotifyError::Signing`] if the HMAC cannot be keyed.
pub fn sign(timestamp: i64, secret: &str) -> Result<String, NotifyError> {
    let key = format!("{timestamp}\n{secret}");
    let mac = HmacSha256::new_from_slice(key.as_bytes()).map_err(|e| NotifyError::Signing {
        channel: CHANNEL,
        reason: e.to_string(),
    })?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Send a plain-text message to a FeiShu bot webhook.
///
/// The title is folded into the text; FeiShu text messages have no title.
///
/// # Errors
///
/// - [`NotifyError::Http`] on transport failure.
/// - [`NotifyError::UnexpectedStatus`] on a non-2xx response.
/// - [`NotifyError::Rejected`] when the bot answers with a non-zero `code`
///   (e.g. a signature mismatch).
pub async fn send(
    client: &Client,
    webhook: &str,
    secret: &str,
    title: &str,
    body: &str,
) -> Result<(), NotifyError> {
    let timestamp = chrono::Utc::now().timestamp();
    let text = format!("{title}\n{body}");
    let payload = FeishuPayload {
        timestamp: timestamp.to_string(),
        sign: sign(timestamp, secret)?,
        msg_type: "text",
        content: TextContent { text: &text },
    };

    let response = client.post(webhook.trim()).json(&payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(NotifyError::UnexpectedStatus {
            channel: CHANNEL,
            status: status.as_u16(),
        });
    }

    let reply = response.json::<serde_json::Value>().await?;
    // Current API uses `code`/`msg`; older bots answer `StatusCode`/`StatusMessage`.
    let code = reply
        .get("code")
        .or_else(|| reply.get("StatusCode"))
        .and_then(serde_json::Value::as_i64)
        .unwrap_or(0);
    if code == 0 {
        return Ok(());
    }

    let message = reply
        .get("msg")
        .or_else(|| reply.get("StatusMessage"))
        .and_then(serde_json::Value::as_str)
        .unwrap_or_default()
        .to_string();
    Err(NotifyError::Rejected {
        channel: CHANNEL,
        code,
        message,
    })
}
