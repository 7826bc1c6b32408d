//! External document store.
//!
//! The store owns the active `TrackDocument` and the track state carrying
//! the external update signal. Other collaborators (editing tools, the
//! renderer, the persistence layer) write to it directly; the history core
//! only sees the store through the `DocumentStore` trait and learns about
//! writes from the queued `StoreChange` notifications.
//!
//! Every write replaces a whole value and queues exactly one notification
//! tagged with a monotonically increasing `Revision`, so observers never see
//! a half-updated document and a writer can recognize the notification its
//! own write produced.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::document::{LayerHandle, TrackDocument};

/// Monotonic write counter of a store.
pub type Revision = u64;

/// Shared track state written by the external editing surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackState {
    /// The document was modified by something other than a restore and
    /// should be captured.
    pub update: bool,
}

/// A queued change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    /// The active document was replaced (or removed).
    Document { revision: Revision },
    /// The track state was replaced.
    TrackState { revision: Revision },
}

impl StoreChange {
    pub fn revision(&self) -> Revision {
        match self {
            StoreChange::Document { revision } | StoreChange::TrackState { revision } => *revision,
        }
    }
}

/// The externally owned document store as seen by the history core.
///
/// `set` and `set_track_state` are the only write primitives. Each returns
/// the revision of the notification it queued.
pub trait DocumentStore {
    /// The active document, if any.
    fn get(&self) -> Option<&TrackDocument>;

    /// Replaces the active document.
    fn set(&mut self, doc: TrackDocument) -> Revision;

    fn track_state(&self) -> TrackState;

    /// Replaces the track state.
    fn set_track_state(&mut self, state: TrackState) -> Revision;

    /// Pops the oldest undelivered change notification.
    fn poll_change(&mut self) -> Option<StoreChange>;
}

/// In-process `DocumentStore` with a FIFO notification queue.
#[derive(Debug, Default)]
pub struct TrackStore {
    document: Option<TrackDocument>,
    track_state: TrackState,
    revision: Revision,
    changes: VecDeque<StoreChange>,
}

impl TrackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest revision handed out.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Number of notifications not yet delivered.
    pub fn pending_changes(&self) -> usize {
        self.changes.len()
    }

    /// Applies an external edit to the active document and raises the
    /// update signal.
    ///
    /// Returns `false` without queuing anything when no document is active.
    pub fn edit(&mut self, f: impl FnOnce(&mut TrackDocument)) -> bool {
        let Some(mut doc) = self.document.clone() else {
            tracing::warn!("Ignoring edit: no active document");
            return false;
        };
        f(&mut doc);
        self.set(doc);
        self.set_track_state(TrackState { update: true });
        true
    }

    /// Replaces the renderer-owned layers without raising the update signal.
    pub fn set_layers(&mut self, layers: Vec<LayerHandle>) -> bool {
        let Some(doc) = &self.document else {
            return false;
        };
        let doc = TrackDocument {
            layers,
            update_layers: false,
            ..doc.clone()
        };
        self.set(doc);
        true
    }

    /// Removes the active document.
    pub fn clear_document(&mut self) -> Revision {
        self.document = None;
        self.notify(|revision| StoreChange::Document { revision })
    }

    fn notify(&mut self, change: impl FnOnce(Revision) -> StoreChange) -> Revision {
        self.revision += 1;
        self.changes.push_back(change(self.revision));
        self.revision
    }
}

impl DocumentStore for TrackStore {
    fn get(&self) -> Option<&TrackDocument> {
        self.document.as_ref()
    }

    fn set(&mut self, doc: TrackDocument) -> Revision {
        self.document = Some(doc);
        self.notify(|revision| StoreChange::Document { revision })
    }

    fn track_state(&self) -> TrackState {
        self.track_state
    }

    fn set_track_state(&mut self, state: TrackState) -> Revision {
        self.track_state = state;
        self.notify(|revision| StoreChange::TrackState { revision })
    }

    fn poll_change(&mut self) -> Option<StoreChange> {
        self.changes.pop_front()
    }
}
