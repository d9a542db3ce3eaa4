//! Shared HTTP plumbing for the provider clients
//!
//! Every provider speaks JSON over HTTPS; this module owns client
//! construction and the mapping from transport and status failures to
//! [`ClientError`].

use super::factory::FactoryError;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use secreview_application::ClientError;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Build a reqwest client with JSON defaults and the per-request timeout.
pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client, FactoryError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .map_err(|e| FactoryError::HttpClient(e.to_string()))
}

/// Header value for a secret, marked sensitive so it is never printed.
pub(crate) fn secret_header(value: &str) -> Result<HeaderValue, FactoryError> {
    let mut header = HeaderValue::from_str(value)
        .map_err(|_| FactoryError::HttpClient("API key contains invalid characters".into()))?;
    header.set_sensitive(true);
    Ok(header)
}

/// POST a JSON body and decode the JSON response.
pub(crate) async fn post_json<T: Serialize>(
    request: RequestBuilder,
    body: &T,
) -> Result<Value, ClientError> {
    let response = request.json(body).send().await.map_err(transport_error)?;

    let status = response.status();
    let retry_after = parse_retry_after(response.headers());
    let text = response.text().await.map_err(transport_error)?;
    debug!(status = status.as_u16(), bytes = text.len(), "Provider responded");

    if !status.is_success() {
        return Err(status_error(status, &text, retry_after));
    }

    serde_json::from_str(&text).map_err(|e| {
        ClientError::InvalidResponse(format!("{}; body preview: {}", e, preview(&text, 300)))
    })
}

fn transport_error(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Timeout
    } else if e.is_decode() {
        ClientError::InvalidResponse(e.to_string())
    } else {
        ClientError::Connection(e.to_string())
    }
}

pub(crate) fn status_error(
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> ClientError {
    let message = error_message(body);
    match status.as_u16() {
        401 | 403 => ClientError::Authentication(message),
        429 => ClientError::RateLimited { retry_after },
        code => ClientError::Api {
            status: code,
            message,
        },
    }
}

/// `error.message` from a provider error body, else a preview of the body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| preview(body, 500))
}

/// `retry-after` in whole seconds; HTTP-date values are ignored.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Join a base URL and a path, tolerating a trailing `/v1` on the base.
pub(crate) fn versioned_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/v1") {
        format!("{}/{}", base, path)
    } else {
        format!("{}/v1/{}", base, path)
    }
}
