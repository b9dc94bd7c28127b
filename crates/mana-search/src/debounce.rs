use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

use crate::controller::SearchMessage;

/// Restartable quiet-period timer.
///
/// Each arm spawns a sleeper that posts `QuerySettled` with the current epoch.
/// A tick is only honoured if its epoch is still current, which covers ticks
/// that were already queued when the timer was restarted.
#[derive(Debug)]
pub(crate) struct Debouncer {
    delay: Duration,
    epoch: u64,
    timer: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            epoch: 0,
            timer: None,
        }
    }

    /// Start (or restart) the quiet period.
    pub(crate) fn arm(&mut self, tx: &UnboundedSender<SearchMessage>) {
        self.disarm();
        self.epoch += 1;

        let epoch = self.epoch;
        let delay = self.delay;
        let tx = tx.clone();
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(SearchMessage::QuerySettled { epoch });
        }));
    }

    pub(crate) fn disarm(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }

    /// Consume a tick. Returns false for ticks from a restarted or disarmed timer.
    pub(crate) fn accept(&mut self, epoch: u64) -> bool {
        if self.timer.is_some() && epoch == self.epoch {
            self.timer = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.timer.is_some()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.disarm();
    }
}
