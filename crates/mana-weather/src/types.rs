use mana_core::{AppError, GeolocationError, NetworkError, SearchError};
use serde::{Deserialize, Serialize};

/// One geocoding result, as normalised by the proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub country: String,
    #[serde(default)]
    pub state: Option<String>,
    pub display_name: String,
}

impl GeoLocation {
    /// Build a location with the proxy's `name, state, country` display format.
    pub fn from_parts(
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        country: impl Into<String>,
        state: Option<String>,
    ) -> Self {
        let name = name.into();
        let country = country.into();

        let mut parts = vec![name.as_str()];
        if let Some(s) = state.as_deref().filter(|s| !s.is_empty()) {
            parts.push(s);
        }
        if !country.is_empty() {
            parts.push(country.as_str());
        }
        let display_name = parts.join(", ");

        Self {
            name,
            lat,
            lon,
            country,
            state,
            display_name,
        }
    }
}

/// Body of `GET /api/geocode`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeocodingResponse {
    pub results: Vec<GeoLocation>,
}

/// Device coordinates from a geolocation provider.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Geocoding lookup errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LookupError {
    /// The cancellation signal fired before the lookup completed.
    #[error("Lookup cancelled")]
    Cancelled,
    #[error("Geocoding failed: {reason}")]
    Status { status: u16, reason: String },
    #[error("Geocoding failed: {0}")]
    Transport(NetworkError),
}

impl LookupError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

impl From<LookupError> for AppError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::Cancelled => AppError::Search(SearchError::Cancelled),
            other => AppError::Search(SearchError::LookupFailed(other.to_string())),
        }
    }
}

/// Location service errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum LocationError {
    #[error("Location service unavailable")]
    ServiceUnavailable,
}

impl From<LocationError> for AppError {
    fn from(e: LocationError) -> Self {
        match e {
            LocationError::ServiceUnavailable => {
                AppError::Geolocation(GeolocationError::Unavailable)
            }
        }
    }
}
