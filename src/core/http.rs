//! HTTP client utilities.
//!
//! Provides client construction and transport-error classification shared by
//! every provider client.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};

use crate::core::response::{ERR_NETWORK, ERR_TIMEOUT, ERR_UNKNOWN};
use crate::error::{NudgeError, Result};

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("nudge/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| NudgeError::Network(e.to_string()))
}

/// Map a transport error to an `(error_code, message)` pair.
#[must_use]
pub fn classify_transport_error(err: &reqwest::Error) -> (&'static str, String) {
    if err.is_timeout() {
        (ERR_TIMEOUT, "request timed out".to_string())
    } else if err.is_connect() {
        (ERR_NETWORK, "network connection failed".to_string())
    } else {
        (ERR_UNKNOWN, err.to_string())
    }
}
