//! Single-flight coordination of token refreshes.
//!
//! When several requests observe 401 before any refresh completes, only
//! the first one starts a refresh; the others join it and all of them
//! observe the same outcome. The decision to join or start is taken under
//! a lock, so two callers cannot both see "nothing in flight".

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use super::error::RefreshFailure;

/// The new access token, or the single failure every joiner observes.
pub type RefreshOutcome = Result<String, RefreshFailure>;

pub type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

type Slot = Arc<Mutex<Option<(u64, SharedRefresh)>>>;

/// The in-flight refresh marker.
#[derive(Default)]
pub struct PendingRefresh {
    slot: Slot,
    next_id: AtomicU64,
}

/// A handle on the in-flight refresh.
pub struct RefreshTicket {
    pub outcome: SharedRefresh,
    /// True for the caller whose decision started this refresh.
    pub started: bool,
}

impl PendingRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Joins the in-flight refresh, or installs the one produced by `start`.
    ///
    /// `start` runs while the marker lock is held, so anything it reads is
    /// consistent with "no refresh in flight". The installed future removes
    /// the marker itself as soon as it resolves, before any joiner sees the
    /// outcome; a cancelled starter therefore cannot leave it behind, since
    /// any later joiner drives the same future to completion.
    pub fn join_or_start<F>(&self, start: F) -> RefreshTicket
    where
        F: FnOnce() -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some((_, in_flight)) = slot.as_ref() {
            return RefreshTicket {
                outcome: in_flight.clone(),
                started: false,
            };
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let refresh = start();
        // Weak: the slot owns this future, the future must not own the slot.
        let release = Arc::downgrade(&self.slot);
        let outcome = async move {
            let outcome = refresh.await;
            if let Some(release) = release.upgrade() {
                let mut slot = release.lock().unwrap_or_else(PoisonError::into_inner);
                if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
                    *slot = None;
                }
            }
            outcome
        }
        .boxed()
        .shared();

        *slot = Some((id, outcome.clone()));
        RefreshTicket {
            outcome,
            started: true,
        }
    }

    /// Forgets the in-flight refresh, so the next caller starts one against
    /// whatever session is current. Callers already holding a ticket still
    /// observe its outcome.
    pub fn reset(&self) {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub fn is_in_flight(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}
