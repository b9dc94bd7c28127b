use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct ActiveLookup {
    generation: u64,
    cancel: CancellationToken,
}

/// Tracks the single authoritative lookup.
///
/// Starting a lookup revokes the previous one: its token is cancelled and its
/// generation no longer matches, so a late result is dropped on arrival.
#[derive(Debug, Default)]
pub(crate) struct RequestTracker {
    last_generation: u64,
    active: Option<ActiveLookup>,
}

impl RequestTracker {
    /// Revoke any outstanding lookup and mint a new authoritative one.
    pub(crate) fn begin(&mut self) -> (u64, CancellationToken) {
        self.revoke();
        self.last_generation += 1;

        let cancel = CancellationToken::new();
        self.active = Some(ActiveLookup {
            generation: self.last_generation,
            cancel: cancel.clone(),
        });
        (self.last_generation, cancel)
    }

    /// Cancel the outstanding lookup, if any. Returns whether one was revoked.
    pub(crate) fn revoke(&mut self) -> bool {
        match self.active.take() {
            Some(active) => {
                active.cancel.cancel();
                tracing::debug!(generation = active.generation, "Revoked lookup");
                true
            }
            None => false,
        }
    }

    /// Retire a finished lookup. Returns false if it was superseded.
    pub(crate) fn finish(&mut self, generation: u64) -> bool {
        if self.is_authoritative(generation) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_authoritative(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.generation == generation)
    }

    pub(crate) fn in_flight(&self) -> bool {
        self.active.is_some()
    }
}
