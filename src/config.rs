//! Transport configuration.

use std::time::Duration;

use crate::core::ConfigError;
use crate::core::constants::{MAX_RETRIES, POLL_ACCEPT, POLL_TIMEOUT};
use crate::http::RetryPolicy;

/// Transport configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    /// How long a poll request may stay outstanding.
    pub poll_timeout: Duration,

    /// Retries allowed per send or close cycle.
    pub max_retries: u32,

    /// Timeout for handshake, send and close requests (`None` = engine default).
    pub request_timeout: Option<Duration>,

    /// `Accept` header sent with poll requests.
    pub poll_accept: String,

    /// Headers added to every request before the authentication hook runs.
    pub extra_headers: Vec<(String, String)>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            poll_timeout: POLL_TIMEOUT,
            max_retries: MAX_RETRIES,
            request_timeout: None,
            poll_accept: POLL_ACCEPT.to_string(),
            extra_headers: Vec::new(),
        }
    }
}

impl TransportConfig {
    /// Create a builder starting from the defaults.
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::new()
    }

    /// Retry policy for the send and close paths.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries)
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: TransportConfig::default(),
        }
    }

    /// Set the poll timeout.
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.config.poll_timeout = timeout;
        self
    }

    /// Set the retry budget for send and close cycles.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set the timeout for non-poll requests.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    /// Set the `Accept` header for poll requests.
    pub fn poll_accept(mut self, accept: impl Into<String>) -> Self {
        self.config.poll_accept = accept.into();
        self
    }

    /// Add a header to every request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<TransportConfig, ConfigError> {
        if self.config.poll_timeout.is_zero() {
            return Err(ConfigError::ZeroPollTimeout);
        }

        for (name, value) in &self.config.extra_headers {
            if name.is_empty() || !name.bytes().all(is_token_byte) {
                return Err(ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: "name is not an HTTP token",
                });
            }
            if value.bytes().any(|b| b == b'\r' || b == b'\n') {
                return Err(ConfigError::InvalidHeader {
                    name: name.clone(),
                    reason: "value contains a line break",
                });
            }
        }

        Ok(self.config)
    }
}

impl Default for TransportConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert_eq!(config.poll_timeout, Duration::from_secs(120));
        assert_eq!(config.max_retries, 6);
        assert_eq!(config.poll_accept, "application/octet-stream");
        assert!(config.request_timeout.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = TransportConfig::builder()
            .poll_timeout(Duration::from_secs(30))
            .max_retries(2)
            .request_timeout(Duration::from_secs(5))
            .header("X-Client", "unity")
            .build()
            .unwrap();

        assert_eq!(config.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.retry_policy().max_retries(), 2);
        assert_eq!(config.request_timeout, Some(Duration::from_secs(5)));
        assert_eq!(
            config.extra_headers,
            vec![("X-Client".to_string(), "unity".to_string())]
        );
    }

    #[test]
    fn test_zero_poll_timeout_rejected() {
        let err = TransportConfig::builder()
            .poll_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert_eq!(err, ConfigError::ZeroPollTimeout);
    }

    #[test]
    fn test_invalid_headers_rejected() {
        assert!(matches!(
            TransportConfig::builder().header("bad name", "v").build(),
            Err(ConfigError::InvalidHeader { .. })
        ));
        assert!(matches!(
            TransportConfig::builder().header("X-Ok", "a\r\nb").build(),
            Err(ConfigError::InvalidHeader { .. })
        ));
    }
}
