//! Centralized error types for Mana Weather.
//!
//! Every error exposes a `user_message()` suitable for showing next to the
//! search box, while `Display` keeps the full technical context for logs.

use thiserror::Error;

/// Top-level application error type.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Location search error: {0}")]
    Search(#[from] SearchError),

    #[error("Geolocation error: {0}")]
    Geolocation(#[from] GeolocationError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Search(e) => e.user_message(),
            AppError::Geolocation(e) => e.user_message(),
        }
    }

    /// True for errors that must never reach the user (superseded work).
    pub fn is_silent(&self) -> bool {
        matches!(self, AppError::Search(SearchError::Cancelled))
    }
}

/// Network-related errors (HTTP, connectivity).
///
/// Carried inside lookup failures for logging; the user only ever sees the
/// search error's message.
#[derive(Debug, Clone, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Location search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A newer lookup superseded this one, or the search box went away.
    #[error("Lookup cancelled")]
    Cancelled,

    #[error("Lookup failed: {0}")]
    LookupFailed(String),
}

impl SearchError {
    pub fn user_message(&self) -> &'static str {
        match self {
            SearchError::Cancelled => "Search cancelled.",
            SearchError::LookupFailed(_) => "Failed to search locations",
        }
    }
}

/// Device geolocation errors.
#[derive(Debug, Error)]
pub enum GeolocationError {
    #[error("Location service unavailable")]
    Unavailable,
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeolocationError::Unavailable => {
                "Location error: no location available. Set [location] in the config."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
