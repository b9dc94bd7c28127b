use std::sync::Arc;
use std::time::Duration;

use mana_core::{AppError, SearchConfig};
use mana_weather::{GeoLocation, GeocodingClient, LookupError};
use tokio::sync::mpsc;

use crate::bounds::Bounds;
use crate::consumer::SelectionConsumer;
use crate::debounce::Debouncer;
use crate::request::RequestTracker;

/// Timing and threshold knobs for the search box.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub debounce: Duration,
    /// Queries shorter than this (in characters) never reach the geocoder.
    pub min_query_len: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_len: 2,
        }
    }
}

impl SearchSettings {
    pub fn from_config(config: &SearchConfig) -> Self {
        Self {
            debounce: Duration::from_millis(config.debounce_ms),
            min_query_len: config.min_query_len,
        }
    }
}

/// Everything a front-end needs to draw the search box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    /// Text currently in the input.
    pub query: String,
    /// Last value of `query` that stayed unchanged for the quiet period.
    pub debounced_query: String,
    pub candidates: Vec<GeoLocation>,
    pub loading: bool,
    pub error: Option<String>,
    pub dropdown_open: bool,
}

/// Completion of asynchronous work, delivered back to the owner of the search.
#[derive(Debug)]
pub enum SearchMessage {
    /// The debounce timer expired.
    QuerySettled { epoch: u64 },
    /// A geocoding lookup resolved.
    LookupDone {
        generation: u64,
        query: String,
        result: Result<Vec<GeoLocation>, LookupError>,
    },
}

/// Debounced, cancellable location search.
///
/// Input handlers (`on_text_change`, `select`, `dismiss`, ...) update state
/// synchronously. Timer expiry and lookup results arrive as [`SearchMessage`]s
/// on an internal channel; drive them with [`process_next`] or
/// [`process_pending`] from the same task that handles input.
///
/// Must be used inside a tokio runtime. Dropping the search cancels any
/// lookup still in flight.
///
/// [`process_next`]: LocationSearch::process_next
/// [`process_pending`]: LocationSearch::process_pending
pub struct LocationSearch<C: GeocodingClient> {
    client: Arc<C>,
    consumer: Box<dyn SelectionConsumer + Send>,
    settings: SearchSettings,
    state: SearchState,
    debouncer: Debouncer,
    requests: RequestTracker,
    bounds: Option<Bounds>,
    tx: mpsc::UnboundedSender<SearchMessage>,
    rx: mpsc::UnboundedReceiver<SearchMessage>,
}

impl<C: GeocodingClient> LocationSearch<C> {
    pub fn new(
        client: C,
        consumer: impl SelectionConsumer + Send + 'static,
        settings: SearchSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(client),
            consumer: Box::new(consumer),
            debouncer: Debouncer::new(settings.debounce),
            settings,
            state: SearchState::default(),
            requests: RequestTracker::default(),
            bounds: None,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &SearchState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.state.query
    }

    pub fn candidates(&self) -> &[GeoLocation] {
        &self.state.candidates
    }

    /// Candidates to render; empty while the dropdown is closed.
    pub fn visible_candidates(&self) -> &[GeoLocation] {
        if self.state.dropdown_open {
            &self.state.candidates
        } else {
            &[]
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    pub fn is_dropdown_open(&self) -> bool {
        self.state.dropdown_open
    }

    /// True when no timer is pending and no lookup is in flight.
    pub fn is_idle(&self) -> bool {
        !self.debouncer.is_armed() && !self.requests.in_flight()
    }

    /// The input text changed. Shown immediately; a lookup follows once the
    /// text has been stable for the debounce interval.
    pub fn on_text_change(&mut self, text: impl Into<String>) {
        self.state.query = text.into();
        self.debouncer.arm(&self.tx);
    }

    /// Confirm a candidate: the input shows its display name, the dropdown
    /// closes and the consumer is notified. Pending work is cancelled so the
    /// new input text does not start another search.
    pub fn select(&mut self, candidate: GeoLocation) {
        self.debouncer.disarm();
        if self.requests.revoke() {
            tracing::debug!("Cancelled in-flight lookup on selection");
        }

        self.state.loading = false;
        self.state.query = candidate.display_name.clone();
        self.state.debounced_query = candidate.display_name.clone();
        self.state.dropdown_open = false;

        tracing::info!(
            "Selected {} ({}, {})",
            candidate.display_name,
            candidate.lat,
            candidate.lon
        );
        self.consumer.on_location_chosen(candidate);
    }

    /// Select the candidate at `index`. Returns false if there is none.
    pub fn select_index(&mut self, index: usize) -> bool {
        match self.state.candidates.get(index).cloned() {
            Some(candidate) => {
                self.select(candidate);
                true
            }
            None => false,
        }
    }

    /// Close the dropdown, keeping the query and candidates.
    pub fn dismiss(&mut self) {
        self.state.dropdown_open = false;
    }

    /// Re-open a previously populated dropdown without searching again.
    pub fn on_focus(&mut self) {
        if !self.state.candidates.is_empty() {
            self.state.dropdown_open = true;
        }
    }

    /// Set (or clear) the screen area owned by the search box.
    pub fn set_bounds(&mut self, bounds: Option<Bounds>) {
        self.bounds = bounds;
    }

    /// A pointer was pressed somewhere on screen. Presses outside the
    /// component dismiss the dropdown.
    pub fn on_pointer_down(&mut self, x: f64, y: f64) {
        if let Some(bounds) = self.bounds {
            if !bounds.contains(x, y) {
                self.dismiss();
            }
        }
    }

    /// Wait for the next timer or lookup completion.
    pub async fn next_message(&mut self) -> Option<SearchMessage> {
        self.rx.recv().await
    }

    /// Wait for one message and apply it.
    pub async fn process_next(&mut self) {
        if let Some(message) = self.rx.recv().await {
            self.handle_message(message);
        }
    }

    /// Apply every message that has already arrived. Returns how many were handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
            handled += 1;
        }
        handled
    }

    pub fn handle_message(&mut self, message: SearchMessage) {
        match message {
            SearchMessage::QuerySettled { epoch } => {
                if !self.debouncer.accept(epoch) {
                    tracing::trace!(epoch, "Ignoring superseded debounce tick");
                    return;
                }
                if self.state.debounced_query == self.state.query {
                    return;
                }
                self.state.debounced_query = self.state.query.clone();
                self.on_query_settled();
            }
            SearchMessage::LookupDone {
                generation,
                query,
                result,
            } => self.on_lookup_done(generation, &query, result),
        }
    }

    fn on_query_settled(&mut self) {
        let query = self.state.debounced_query.clone();

        if query.chars().count() < self.settings.min_query_len {
            if self.requests.revoke() {
                tracing::debug!("Query {:?} too short, cancelled in-flight lookup", query);
            }
            self.state.candidates.clear();
            self.state.dropdown_open = false;
            self.state.loading = false;
            return;
        }

        let (generation, cancel) = self.requests.begin();
        self.state.loading = true;
        self.state.error = None;
        tracing::debug!(generation, "Looking up {:?}", query);

        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.search(&query, cancel).await;
            let _ = tx.send(SearchMessage::LookupDone {
                generation,
                query,
                result,
            });
        });
    }

    fn on_lookup_done(
        &mut self,
        generation: u64,
        query: &str,
        result: Result<Vec<GeoLocation>, LookupError>,
    ) {
        if !self.requests.finish(generation) {
            tracing::debug!(generation, "Discarding superseded lookup for {:?}", query);
            return;
        }

        self.state.loading = false;
        match result {
            Ok(candidates) => {
                tracing::debug!("{} candidates for {:?}", candidates.len(), query);
                self.state.dropdown_open = !candidates.is_empty();
                self.state.candidates = candidates;
            }
            Err(e) => {
                let err = AppError::from(e);
                if err.is_silent() {
                    tracing::debug!("Lookup for {:?} was cancelled by the client", query);
                    return;
                }
                tracing::warn!("Location search for {:?} failed: {}", query, err);
                self.state.error = Some(err.user_message().to_string());
                self.state.candidates.clear();
                self.state.dropdown_open = false;
            }
        }
    }
}

impl<C: GeocodingClient> Drop for LocationSearch<C> {
    fn drop(&mut self) {
        self.debouncer.disarm();
        if self.requests.revoke() {
            tracing::debug!("Search torn down with a lookup in flight");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_util::sync::CancellationToken;

    /// Resolves every query immediately with no candidates.
    struct EmptyClient;

    impl GeocodingClient for EmptyClient {
        async fn search(
            &self,
            _query: &str,
            _cancel: CancellationToken,
        ) -> Result<Vec<GeoLocation>, LookupError> {
            Ok(Vec::new())
        }
    }

    fn paris() -> GeoLocation {
        GeoLocation::from_parts("Paris", 48.8566, 2.3522, "FR", Some("Ile-de-France".into()))
    }

    fn search() -> LocationSearch<EmptyClient> {
        LocationSearch::new(EmptyClient, |_: GeoLocation| {}, SearchSettings::default())
    }

    #[test]
    fn test_settings_from_config() {
        let settings = SearchSettings::from_config(&SearchConfig {
            debounce_ms: 150,
            min_query_len: 3,
            result_limit: 5,
        });
        assert_eq!(settings.debounce, Duration::from_millis(150));
        assert_eq!(settings.min_query_len, 3);
    }

    #[tokio::test]
    async fn test_text_change_is_immediate() {
        let mut s = search();
        s.on_text_change("Pa");
        assert_eq!(s.query(), "Pa");
        assert_eq!(s.state().debounced_query, "");
        assert!(!s.is_idle());
    }

    #[tokio::test]
    async fn test_focus_reopens_only_with_candidates() {
        let mut s = search();
        s.on_focus();
        assert!(!s.is_dropdown_open());

        s.state.candidates = vec![paris()];
        s.on_focus();
        assert!(s.is_dropdown_open());
        assert_eq!(s.visible_candidates().len(), 1);

        s.dismiss();
        assert!(s.visible_candidates().is_empty());
        assert_eq!(s.candidates().len(), 1);
    }

    #[tokio::test]
    async fn test_pointer_without_bounds_is_ignored() {
        let mut s = search();
        s.state.candidates = vec![paris()];
        s.state.dropdown_open = true;

        s.on_pointer_down(-1000.0, -1000.0);
        assert!(s.is_dropdown_open());
    }

    #[tokio::test]
    async fn test_select_index_out_of_range() {
        let mut s = search();
        assert!(!s.select_index(0));
        assert_eq!(s.query(), "");
    }
}
