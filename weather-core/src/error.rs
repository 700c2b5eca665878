//! Error types for request normalization and forecast retrieval.
//!
//! Neither of these is meant to abort the answer pipeline: a
//! [`RequestError`] rides along on the request and turns into an apology,
//! and every [`ProviderError`] maps onto one.

use serde::Serialize;
use thiserror::Error;

/// Status attached to a `WeatherRequest` when it cannot be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum RequestError {
    #[error("the requested calendar date does not exist")]
    DateError,

    #[error("this kind of day or time is not supported yet")]
    NotImplemented,

    #[error("location not found")]
    LocationNotFound,

    #[error("weather service rejected the API key")]
    AuthError,

    #[error("weather service request limit exceeded")]
    RateLimited,

    #[error("weather service unreachable")]
    NoConnectivity,
}

impl RequestError {
    /// Apology suitable for reading out to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            RequestError::DateError => "Sorry, that date does not exist.",
            RequestError::NotImplemented => "Sorry, I can't handle that kind of date or time yet.",
            RequestError::LocationNotFound => "Sorry, I couldn't find that place.",
            RequestError::AuthError => {
                "Sorry, I can't reach the weather service. The API key seems to be invalid."
            }
            RequestError::RateLimited => {
                "Sorry, I've asked the weather service too often. Please try again later."
            }
            RequestError::NoConnectivity => {
                "Sorry, I can't reach the weather service right now. \
                 Check your internet connection."
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestError::DateError => "date_error",
            RequestError::NotImplemented => "not_implemented",
            RequestError::LocationNotFound => "location_not_found",
            RequestError::AuthError => "auth_error",
            RequestError::RateLimited => "rate_limited",
            RequestError::NoConnectivity => "no_connectivity",
        }
    }
}

/// Failures of the forecast provider call.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("weather service unreachable: {0}")]
    NoConnectivity(String),

    #[error("weather service rejected the API key")]
    Unauthorized,

    #[error("weather service request limit exceeded")]
    RateLimited,

    #[error("location not found: {0}")]
    LocationNotFound(String),
}

impl From<&ProviderError> for RequestError {
    fn from(err: &ProviderError) -> Self {
        match err {
            ProviderError::NoConnectivity(_) => RequestError::NoConnectivity,
            ProviderError::Unauthorized => RequestError::AuthError,
            ProviderError::RateLimited => RequestError::RateLimited,
            ProviderError::LocationNotFound(_) => RequestError::LocationNotFound,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        ProviderError::NoConnectivity(err.to_string())
    }
}
