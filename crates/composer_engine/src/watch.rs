use std::sync::Arc;
use std::time::Duration;

use composer_core::Msg;
use composer_logging::{composer_debug, composer_trace};
use futures_util::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::{SharedSession, StudioApi};

/// Polls the parse status of unsettled reference files and feeds the
/// results back as status updates.
#[derive(Clone)]
pub struct ParseStatusWatcher {
    api: Arc<dyn StudioApi>,
    session: SharedSession,
    interval: Duration,
}

impl ParseStatusWatcher {
    pub fn new(api: Arc<dyn StudioApi>, session: SharedSession, interval: Duration) -> Self {
        Self {
            api,
            session,
            interval,
        }
    }

    /// One polling round. Returns how many files reported a status.
    pub async fn poll_once(&self) -> usize {
        let ids = self
            .session
            .with(|session| session.registry().unsettled_ids());
        if ids.is_empty() {
            return 0;
        }
        composer_trace!("Polling parse status of {} file(s)", ids.len());

        let results = join_all(ids.iter().map(|id| self.api.get_reference_file(id))).await;
        let mut reported = 0;
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(file) => {
                    reported += 1;
                    self.session.dispatch(Msg::FileStatusChanged(file));
                }
                Err(err) => composer_debug!("Status poll for {} failed: {}", id, err),
            }
        }
        reported
    }

    pub async fn run(&self, cancel: CancellationToken) {
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {
                    self.poll_once().await;
                }
            }
        }
    }
}
