use mana_weather::GeoLocation;

/// Receives the location the user confirmed. Fire-and-forget.
pub trait SelectionConsumer {
    fn on_location_chosen(&mut self, location: GeoLocation);
}

impl<F> SelectionConsumer for F
where
    F: FnMut(GeoLocation),
{
    fn on_location_chosen(&mut self, location: GeoLocation) {
        self(location);
    }
}
