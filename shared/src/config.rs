//! Runtime API configuration supplied by the shell.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::endpoint::{UrlError, ValidatedUrl};
use crate::{AppError, ErrorKind, PROFILE_REQUEST_TIMEOUT_MS};

pub const MAX_TIMEOUT_MS: u64 = 300_000;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base URL: {0}")]
    InvalidBaseUrl(#[source] UrlError),

    #[error("request timeout must be between 1 and {max}ms, got {got}ms")]
    InvalidTimeout { got: u64, max: u64 },
}

impl From<ConfigError> for AppError {
    fn from(e: ConfigError) -> Self {
        AppError::new(ErrorKind::Configuration, e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    base_url: ValidatedUrl,
    request_timeout_ms: u64,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>, request_timeout_ms: u64) -> Result<Self, ConfigError> {
        let base_url = ValidatedUrl::new(base_url).map_err(ConfigError::InvalidBaseUrl)?;

        if request_timeout_ms == 0 || request_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::InvalidTimeout {
                got: request_timeout_ms,
                max: MAX_TIMEOUT_MS,
            });
        }

        Ok(Self {
            base_url,
            request_timeout_ms,
        })
    }

    pub fn base_url(&self) -> &ValidatedUrl {
        &self.base_url
    }

    pub fn request_timeout_ms(&self) -> u64 {
        self.request_timeout_ms
    }

    /// `<base>/users/{user_id}`
    pub fn user_url(&self, user_id: &str) -> Result<ValidatedUrl, UrlError> {
        self.base_url.join_segments(["users", user_id])
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: ValidatedUrl::default(),
            request_timeout_ms: PROFILE_REQUEST_TIMEOUT_MS,
        }
    }
}
