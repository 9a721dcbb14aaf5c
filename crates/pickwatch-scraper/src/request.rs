//! Construction of the fulfillment-messages request.
//!
//! The header set reproduces one desktop Chrome session exactly. The endpoint
//! sits behind bot detection that fingerprints header sets, so nothing beyond
//! these headers (and the `Cookie`, when configured) may be sent.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, REFERER, USER_AGENT,
};

use crate::error::ScraperError;

const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";
const BROWSER_ACCEPT: &str = "*/*";
const BROWSER_ACCEPT_LANGUAGE: &str = "zh-CN,zh-TW;q=0.9";
const SEC_CH_UA: &str = "\"Google Chrome\";v=\"143\"";
const SEC_CH_UA_MOBILE: &str = "?0";
const SEC_CH_UA_PLATFORM: &str = "\"macOS\"";
const SEC_FETCH_DEST: &str = "empty";
const SEC_FETCH_MODE: &str = "cors";
const SEC_FETCH_SITE: &str = "same-origin";

/// Product page the request claims to originate from.
const REFERER_PATH: &str = "/shop/buy-iphone/iphone-17-pro";
const FULFILLMENT_PATH: &str = "/shop/fulfillment-messages";

/// RFC 3986 unreserved characters stay literal; everything else is encoded.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A fully-specified GET: the URL plus the complete header set to send.
#[derive(Debug, Clone)]
pub struct FulfillmentRequest {
    pub url: String,
    pub headers: HeaderMap,
}

impl FulfillmentRequest {
    /// Header pairs for debug logging, with the cookie value masked.
    #[must_use]
    pub fn redacted_headers(&self) -> Vec<(String, String)> {
        self.headers
            .iter()
            .map(|(name, value)| {
                let shown = if *name == COOKIE {
                    "[redacted]".to_string()
                } else {
                    value.to_str().unwrap_or("<non-ascii>").to_string()
                };
                (name.as_str().to_string(), shown)
            })
            .collect()
    }
}

/// Builds the pickup-availability request for one part at one location.
///
/// Pure: no I/O and no retry state.
///
/// # Errors
///
/// - [`ScraperError::InvalidBaseUrl`] if `base_url` does not form a valid URL.
/// - [`ScraperError::InvalidHeader`] if the cookie contains bytes that cannot
///   appear in a header value.
pub fn build_request(
    base_url: &str,
    location: &str,
    device_code: &str,
    cookie: Option<&str>,
) -> Result<FulfillmentRequest, ScraperError> {
    let base_url = base_url.trim_end_matches('/');
    let url = fulfillment_url(base_url, location, device_code)?;
    let headers = browser_headers(base_url, cookie)?;
    Ok(FulfillmentRequest { url, headers })
}

fn fulfillment_url(
    base_url: &str,
    location: &str,
    device_code: &str,
) -> Result<String, ScraperError> {
    let params = [
        ("pl", "true"),
        ("mts.0", "regular"),
        ("parts.0", device_code),
        ("location", location),
    ];
    let query = params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                utf8_percent_encode(k, QUERY_VALUE),
                utf8_percent_encode(v, QUERY_VALUE)
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let url = format!("{base_url}{FULFILLMENT_PATH}?{query}");
    reqwest::Url::parse(&url).map_err(|e| ScraperError::InvalidBaseUrl {
        base_url: base_url.to_owned(),
        reason: e.to_string(),
    })?;
    Ok(url)
}

fn browser_headers(base_url: &str, cookie: Option<&str>) -> Result<HeaderMap, ScraperError> {
    let mut headers = HeaderMap::with_capacity(11);
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));

    let referer = HeaderValue::from_str(&format!("{base_url}{REFERER_PATH}")).map_err(|e| {
        ScraperError::InvalidHeader {
            name: "referer",
            reason: e.to_string(),
        }
    })?;
    headers.insert(REFERER, referer);

    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua"),
        HeaderValue::from_static(SEC_CH_UA),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-mobile"),
        HeaderValue::from_static(SEC_CH_UA_MOBILE),
    );
    headers.insert(
        HeaderName::from_static("sec-ch-ua-platform"),
        HeaderValue::from_static(SEC_CH_UA_PLATFORM),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-dest"),
        HeaderValue::from_static(SEC_FETCH_DEST),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-mode"),
        HeaderValue::from_static(SEC_FETCH_MODE),
    );
    headers.insert(
        HeaderName::from_static("sec-fetch-site"),
        HeaderValue::from_static(SEC_FETCH_SITE),
    );

    if let Some(cookie) = cookie.map(str::trim).filter(|c| !c.is_empty()) {
        let value = HeaderValue::from_str(cookie).map_err(|e| ScraperError::InvalidHeader {
            name: "cookie",
            reason: e.to_string(),
        })?;
        headers.insert(COOKIE, value);
    }

    Ok(headers)
}

#[cfg(test)]
#[path = "request_test.rs"]
mod tests;
