//! Device position for "use my location".
//!
//! A terminal has no platform geolocation, so the position comes from the
//! `[location]` table of the config when one is set.

use std::future::Future;

use mana_core::LocationConfig;

use crate::types::{LocationError, Position};

/// Supplies the device position asynchronously.
pub trait GeolocationProvider: Send + Sync {
    fn current_position(&self) -> impl Future<Output = Result<Position, LocationError>> + Send;
}

/// Position pinned in configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfiguredLocation {
    coordinates: Option<(f64, f64)>,
}

impl ConfiguredLocation {
    pub fn new(config: &LocationConfig) -> Self {
        Self {
            coordinates: config.coordinates(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.coordinates.is_some()
    }
}

impl GeolocationProvider for ConfiguredLocation {
    async fn current_position(&self) -> Result<Position, LocationError> {
        let (latitude, longitude) = self.coordinates.ok_or(LocationError::ServiceUnavailable)?;
        tracing::info!("Using configured location: {}, {}", latitude, longitude);
        Ok(Position {
            latitude,
            longitude,
        })
    }
}
