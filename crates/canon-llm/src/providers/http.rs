//! Status and transport error mapping shared by the HTTP providers.

use std::time::Duration;

use canon_core::errors::LlmError;
use reqwest::blocking::Client;
use reqwest::StatusCode;

/// Longest response body kept in an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

pub(crate) fn build_client(provider: &str, timeout: Duration) -> Result<Client, LlmError> {
    Client::builder()
        .timeout(timeout)
        .gzip(true)
        .build()
        .map_err(|e| LlmError::Connection {
            provider: provider.to_string(),
            reason: format!("client build failed: {e}"),
        })
}

/// 429 is a rate limit; every 5xx (including 529) is an overload. Both retry.
pub(crate) fn status_error(provider: &str, status: StatusCode, body: &str) -> LlmError {
    match status.as_u16() {
        429 => LlmError::RateLimited {
            provider: provider.to_string(),
        },
        code @ 500..=599 => LlmError::Overloaded {
            provider: provider.to_string(),
            status: code,
        },
        code => LlmError::Http {
            provider: provider.to_string(),
            status: code,
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        },
    }
}

/// Timeouts and refused connections are transient.
pub(crate) fn send_error(provider: &str, error: reqwest::Error) -> LlmError {
    LlmError::Connection {
        provider: provider.to_string(),
        reason: error.to_string(),
    }
}
