//! Search-as-you-type bookkeeping.
//!
//! Each keystroke takes a ticket; a response is only applied when its ticket is
//! still the newest one, so a slow early request can never overwrite a later
//! result.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::debug;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SearchTicket(u64);

#[derive(Debug)]
pub struct SearchTracker {
    latest: AtomicU64,
    debounce: Duration,
}

impl Default for SearchTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl SearchTracker {
    pub fn new(debounce: Duration) -> Self {
        Self {
            latest: AtomicU64::new(0),
            debounce,
        }
    }

    pub fn next_ticket(&self) -> SearchTicket {
        SearchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: SearchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Passes `result` through only for the newest ticket.
    pub fn accept<T>(&self, ticket: SearchTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!("Dropping stale search result #{}", ticket.0);
            None
        }
    }

    /// Waits out the debounce interval, then runs `request` unless a newer
    /// ticket was issued meanwhile. Stale results are dropped as well.
    pub async fn debounced<F, Fut, T>(&self, request: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let ticket = self.next_ticket();
        tokio::time::sleep(self.debounce).await;
        if !self.is_current(ticket) {
            debug!("Skipping superseded search #{}", ticket.0);
            return None;
        }
        let result = request().await;
        self.accept(ticket, result)
    }
}
