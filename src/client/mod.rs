//! Device-management API client.
//!
//! Pushes converted device records to the device-management service.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use devload::client::DeviceApiClient;
//!
//! let client = DeviceApiClient::from_env()?;
//! let submitted = client.push_devices(&report.devices).await?;
//! ```

use std::env;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};
use crate::models::Device;

/// Environment variable naming the device-management API base URL.
pub const API_URL_VAR: &str = "DEVLOAD_API_URL";

/// Default number of attempts per push.
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay between attempts in milliseconds.
const RETRY_DELAY_MS: u64 = 1000;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Client for the device-management HTTP API.
#[derive(Clone)]
pub struct DeviceApiClient {
    base_url: String,
    timeout: Duration,
}

impl DeviceApiClient {
    /// Create a client with an explicit base URL.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create a client from the `DEVLOAD_API_URL` environment variable.
    pub fn from_env() -> ClientResult<Self> {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        let base_url =
            env::var(API_URL_VAR).map_err(|_| ClientError::MissingConfig(API_URL_VAR))?;
        Ok(Self::new(&base_url))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Push converted devices to the device-management API.
    ///
    /// Transport failures are retried; an HTTP error status is returned
    /// immediately with the response body as the message. Returns the
    /// number of submitted devices.
    pub async fn push_devices(&self, devices: &[Device]) -> ClientResult<usize> {
        let mut last_error = None;

        for attempt in 1..=DEFAULT_MAX_RETRIES {
            match self.try_push(devices).await {
                Ok(count) => return Ok(count),
                Err(err @ ClientError::HttpError(_)) => {
                    eprintln!(
                        "   ⚠️  Attempt {}/{} failed: {}",
                        attempt, DEFAULT_MAX_RETRIES, err
                    );
                    last_error = Some(err);

                    if attempt < DEFAULT_MAX_RETRIES {
                        eprintln!("   ↻ Retrying in {}ms...", RETRY_DELAY_MS);
                        tokio::time::sleep(Duration::from_millis(RETRY_DELAY_MS)).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        Err(last_error.unwrap_or_else(|| ClientError::HttpError("Unknown error".to_string())))
    }

    /// Single push attempt.
    async fn try_push(&self, devices: &[Device]) -> ClientResult<usize> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ClientError::HttpError(e.to_string()))?;

        let response = client
            .post(self.device_url())
            .json(devices)
            .send()
            .await
            .map_err(|e| ClientError::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(ClientError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        Ok(devices.len())
    }

    fn device_url(&self) -> String {
        format!("{}/api/v3/device", self.base_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = DeviceApiClient::new("http://edge-gateway:59881/");
        assert_eq!(client.base_url(), "http://edge-gateway:59881");
        assert_eq!(client.device_url(), "http://edge-gateway:59881/api/v3/device");
    }

    #[test]
    fn test_from_env() {
        env::set_var(API_URL_VAR, "http://edge-gateway:59881");
        let client = DeviceApiClient::from_env().unwrap();
        assert_eq!(client.base_url(), "http://edge-gateway:59881");

        env::remove_var(API_URL_VAR);
        assert!(DeviceApiClient::from_env().is_err());
    }
}
