//! Geocoding and geolocation for Mana Weather.
//!
//! Talks to the weather proxy's geocoding endpoint and defines the wire
//! types shared with the location search.

pub mod geocode;
pub mod location;
pub mod types;

pub use geocode::{GeocodingClient, HttpGeocodingClient};
pub use location::{ConfiguredLocation, GeolocationProvider};
pub use types::*;
