//! Synchronization between the history stack and the external store.
//!
//! Two owners can trigger each other here: the store notifies on every
//! write, and the history writes restored snapshots back into the store.
//! Without a guard, the notification caused by a restore would be captured
//! as a brand new edit and wipe the redo history.
//!
//! The `EchoGuard` is the one-bit handshake that breaks the loop. A
//! write-back arms it with the revision of the write; the guard stays armed
//! until that exact notification comes back from the store. Any other
//! notification seen while armed is deferred and replayed only after the
//! guard is released, so an external change is never interleaved with the
//! write-back it follows.

use std::collections::VecDeque;

use crate::history::{HistoryConfig, HistorySummary, TrackHistory};
use crate::snapshot::Snapshot;
use crate::store::{DocumentStore, Revision, StoreChange, TrackState};

/// Suppress-next-echo token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EchoGuard {
    pending: Option<Revision>,
}

impl EchoGuard {
    /// Arms the guard for the notification of `revision`.
    pub fn arm(&mut self, revision: Revision) {
        self.pending = Some(revision);
    }

    pub fn is_armed(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes `change` if it is the awaited echo, releasing the guard.
    pub fn absorb(&mut self, change: &StoreChange) -> bool {
        if self.pending == Some(change.revision()) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn disarm(&mut self) {
        self.pending = None;
    }
}

/// What the coordinator did with one change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The document was captured as a new history entry.
    Captured,
    /// The notification was the echo of our own write-back.
    EchoAbsorbed,
    /// A write-back is in flight; the notification will be replayed later.
    Deferred,
    /// Nothing to capture.
    Ignored,
}

/// Mediates between the history stack and a `DocumentStore`.
#[derive(Debug)]
pub struct SyncCoordinator {
    history: TrackHistory,
    echo: EchoGuard,
    /// Notifications that arrived while the guard was armed.
    deferred: VecDeque<StoreChange>,
}

impl Default for SyncCoordinator {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl SyncCoordinator {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            history: TrackHistory::new(config),
            echo: EchoGuard::default(),
            deferred: VecDeque::new(),
        }
    }

    pub fn history(&self) -> &TrackHistory {
        &self.history
    }

    pub fn summary(&self) -> HistorySummary {
        self.history.summary()
    }

    /// Whether a write-back is waiting for its echo.
    pub fn is_write_pending(&self) -> bool {
        self.echo.is_armed()
    }

    /// Next notification to handle: deferred ones first once the guard is
    /// released, then whatever the store has queued.
    pub fn next_change<S: DocumentStore>(&mut self, store: &mut S) -> Option<StoreChange> {
        if !self.echo.is_armed() {
            if let Some(change) = self.deferred.pop_front() {
                return Some(change);
            }
        }
        store.poll_change()
    }

    /// Handles every notification the store has queued, including deferred
    /// ones released along the way. Returns how many were handled.
    pub fn flush<S: DocumentStore>(&mut self, store: &mut S) -> usize {
        let mut handled = 0;
        while let Some(change) = self.next_change(store) {
            self.handle_change(store, change);
            handled += 1;
        }
        handled
    }

    /// Reacts to one store notification.
    pub fn handle_change<S: DocumentStore>(
        &mut self,
        store: &mut S,
        change: StoreChange,
    ) -> ChangeOutcome {
        if self.echo.is_armed() {
            if self.echo.absorb(&change) {
                tracing::debug!("Write-back r{} observed, echo suppressed", change.revision());
                return ChangeOutcome::EchoAbsorbed;
            }
            self.deferred.push_back(change);
            return ChangeOutcome::Deferred;
        }
        self.capture_if_requested(store)
    }

    /// Steps the history back and writes the restored document to `store`.
    ///
    /// Notifications already queued in the store are handled first, so an
    /// edit made before the command is captured before it is undone.
    /// Returns `None` with the history untouched when undo is unavailable,
    /// when a previous write-back is still in flight, or when the store has
    /// no active document to restore onto.
    pub fn undo<S: DocumentStore>(&mut self, store: &mut S) -> Option<Snapshot> {
        self.flush(store);
        if !self.history.can_undo() || !self.ready_for_write_back(store) {
            return None;
        }
        let snapshot = self.history.undo()?;
        self.write_back(store, &snapshot);
        tracing::debug!("Undo: {} entries behind", self.history.past().len());
        Some(snapshot)
    }

    /// Steps the history forward and writes the restored document to
    /// `store`. Same availability rules as [`SyncCoordinator::undo`].
    pub fn redo<S: DocumentStore>(&mut self, store: &mut S) -> Option<Snapshot> {
        self.flush(store);
        if !self.history.can_redo() || !self.ready_for_write_back(store) {
            return None;
        }
        let snapshot = self.history.redo()?;
        self.write_back(store, &snapshot);
        tracing::debug!("Redo: {} entries ahead", self.history.future().len());
        Some(snapshot)
    }

    /// Drops the history and tells the store about the reset.
    ///
    /// The update signal is explicitly written as unset so the reset is not
    /// captured as an edit.
    pub fn clear<S: DocumentStore>(&mut self, store: &mut S) {
        self.history.clear();
        self.echo.disarm();
        self.deferred.clear();
        store.set_track_state(TrackState { update: false });
        tracing::debug!("History cleared");
    }

    /// Drains every queued and deferred notification without capturing.
    ///
    /// Used while nothing records history: a raised update signal is
    /// acknowledged and any in-flight write-back is forgotten. Returns how
    /// many notifications were dropped.
    pub fn discard<S: DocumentStore>(&mut self, store: &mut S) -> usize {
        if store.track_state().update {
            store.set_track_state(TrackState { update: false });
        }
        self.echo.disarm();
        let mut dropped = self.deferred.len();
        self.deferred.clear();
        while store.poll_change().is_some() {
            dropped += 1;
        }
        if dropped > 0 {
            tracing::debug!("Discarded {dropped} notifications");
        }
        dropped
    }

    fn capture_if_requested<S: DocumentStore>(&mut self, store: &mut S) -> ChangeOutcome {
        if !store.track_state().update {
            return ChangeOutcome::Ignored;
        }
        let outcome = match store.get() {
            Some(doc) => {
                self.history.push(Snapshot::capture(doc));
                tracing::debug!(
                    "Captured '{}' ({} entries behind)",
                    doc.name(),
                    self.history.past().len()
                );
                ChangeOutcome::Captured
            }
            None => {
                tracing::warn!("Update signal raised without an active document");
                ChangeOutcome::Ignored
            }
        };
        store.set_track_state(TrackState { update: false });
        outcome
    }

    fn ready_for_write_back<S: DocumentStore>(&self, store: &S) -> bool {
        if self.echo.is_armed() {
            tracing::debug!("Write-back already in flight");
            return false;
        }
        if store.get().is_none() {
            tracing::warn!("No active document to restore onto");
            return false;
        }
        true
    }

    fn write_back<S: DocumentStore>(&mut self, store: &mut S, snapshot: &Snapshot) {
        // Layers are read from the live document at this point, never from
        // the snapshot.
        let Some(live) = store.get() else {
            return;
        };
        let restored = snapshot.restore_onto(live);
        let revision = store.set(restored);
        // No notification is handled between `set` and arming: handling only
        // happens in `handle_change`.
        self.echo.arm(revision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{LayerHandle, TrackDocument};
    use crate::history::Sentinel;
    use crate::store::TrackStore;

    fn drain(sync: &mut SyncCoordinator, store: &mut TrackStore) -> Vec<ChangeOutcome> {
        let mut outcomes = Vec::new();
        while let Some(change) = sync.next_change(store) {
            outcomes.push(sync.handle_change(store, change));
        }
        outcomes
    }

    fn future_names(sync: &SyncCoordinator) -> Vec<String> {
        sync.history()
            .future()
            .map(|s| s.content().name.clone())
            .collect()
    }

    fn rename(store: &mut TrackStore, name: &str) {
        store.edit(|doc| doc.content.name = name.to_string());
    }

    fn opened_store() -> TrackStore {
        let mut store = TrackStore::new();
        store.set(TrackDocument::new_local("car"));
        store.set_track_state(TrackState { update: true });
        store
    }

    #[test]
    fn test_echo_guard() {
        let mut guard = EchoGuard::default();
        assert!(!guard.is_armed());
        guard.arm(4);
        assert!(!guard.absorb(&StoreChange::Document { revision: 3 }));
        assert!(guard.is_armed());
        assert!(guard.absorb(&StoreChange::Document { revision: 4 }));
        assert!(!guard.is_armed());
    }

    #[test]
    fn test_external_edit_is_captured_once() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        assert_eq!(sync.history().past().len(), 1);

        rename(&mut store, "a");
        let outcomes = drain(&mut sync, &mut store);
        assert_eq!(outcomes.iter().filter(|o| **o == ChangeOutcome::Captured).count(), 1);
        assert_eq!(sync.history().past().len(), 2);
        assert!(!store.track_state().update);
    }

    #[test]
    fn test_undo_echo_is_not_captured() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        rename(&mut store, "a");
        drain(&mut sync, &mut store);

        let before = sync.history().past().len();
        let snap = sync.undo(&mut store).expect("undo");
        assert!(sync.is_write_pending());
        assert_eq!(store.get().map(TrackDocument::name), Some(snap.content().name.as_str()));

        let outcomes = drain(&mut sync, &mut store);
        assert_eq!(outcomes, vec![ChangeOutcome::EchoAbsorbed]);
        assert!(!sync.is_write_pending());
        assert_eq!(sync.history().past().len(), before - 1);
        assert!(sync.history().can_redo());
    }

    /// Delivers notifications newest first, so a later edit can overtake
    /// the echo of a write-back.
    #[derive(Default)]
    struct LifoStore {
        inner: TrackStore,
        buffered: Vec<StoreChange>,
    }

    impl DocumentStore for LifoStore {
        fn get(&self) -> Option<&TrackDocument> {
            self.inner.get()
        }

        fn set(&mut self, doc: TrackDocument) -> Revision {
            self.inner.set(doc)
        }

        fn track_state(&self) -> TrackState {
            self.inner.track_state()
        }

        fn set_track_state(&mut self, state: TrackState) -> Revision {
            self.inner.set_track_state(state)
        }

        fn poll_change(&mut self) -> Option<StoreChange> {
            while let Some(change) = self.inner.poll_change() {
                self.buffered.push(change);
            }
            self.buffered.pop()
        }
    }

    #[test]
    fn test_edit_queued_before_undo_is_captured_first() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        rename(&mut store, "a");

        // "a" has not been handled yet; undo must capture it and step back
        // to the opened document instead of undoing past it.
        let snap = sync.undo(&mut store).expect("undo");
        assert_ne!(snap.content().name, "a");
        assert_eq!(future_names(&sync), vec!["a".to_string()]);
    }

    #[test]
    fn test_change_overtaking_echo_is_deferred_then_replayed() {
        let mut store = LifoStore::default();
        store.set(TrackDocument::new_local("car"));
        store.set_track_state(TrackState { update: true });
        let mut sync = SyncCoordinator::default();
        sync.flush(&mut store);
        store.inner.edit(|doc| doc.content.name = "a".to_string());
        sync.flush(&mut store);

        sync.undo(&mut store).expect("undo");
        store.inner.edit(|doc| doc.content.name = "b".to_string());

        let mut outcomes = Vec::new();
        while let Some(change) = sync.next_change(&mut store) {
            outcomes.push(sync.handle_change(&mut store, change));
        }
        assert_eq!(
            outcomes,
            vec![
                ChangeOutcome::Deferred,
                ChangeOutcome::Deferred,
                ChangeOutcome::EchoAbsorbed,
                ChangeOutcome::Captured,
                ChangeOutcome::Ignored,
                ChangeOutcome::Ignored,
            ]
        );
        assert_eq!(sync.history().current().content().name, "b");
        assert!(!sync.history().can_redo());
        assert!(!sync.is_write_pending());
    }

    #[test]
    fn test_restore_uses_layers_at_write_back_time() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        rename(&mut store, "a");
        drain(&mut sync, &mut store);

        let layers = vec![LayerHandle::new(9, "polyline")];
        store.set_layers(layers.clone());
        drain(&mut sync, &mut store);

        sync.undo(&mut store).expect("undo");
        let doc = store.get().expect("document");
        assert_eq!(doc.layers, layers);
        assert!(doc.update_layers);
        assert!(doc.get_routing);
    }

    #[test]
    fn test_consecutive_undos_each_complete_their_round_trip() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        rename(&mut store, "a");
        drain(&mut sync, &mut store);
        rename(&mut store, "b");
        drain(&mut sync, &mut store);

        let undone = sync.undo(&mut store).map(|s| s.content().name.clone());
        assert_eq!(undone, Some("a".to_string()));
        assert!(sync.is_write_pending());
        // The second undo observes the first echo before writing again.
        assert!(sync.undo(&mut store).is_some());
        assert_eq!(sync.history().past().len(), 1);
        assert!(sync.undo(&mut store).is_none());
        assert!(!sync.is_write_pending());
        assert_eq!(future_names(&sync), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_pending_write_blocks_second_write_back() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        rename(&mut store, "a");
        drain(&mut sync, &mut store);

        sync.echo.arm(u64::MAX);
        let before = sync.summary();
        assert!(sync.undo(&mut store).is_none());
        assert_eq!(sync.summary(), before);
    }

    #[test]
    fn test_undo_without_document_leaves_history() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        rename(&mut store, "a");
        drain(&mut sync, &mut store);

        store.clear_document();
        drain(&mut sync, &mut store);
        let before = sync.summary();
        assert!(sync.undo(&mut store).is_none());
        assert_eq!(sync.summary(), before);
    }

    #[test]
    fn test_clear_does_not_capture() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        rename(&mut store, "a");
        drain(&mut sync, &mut store);

        sync.clear(&mut store);
        assert!(!store.track_state().update);
        let outcomes = drain(&mut sync, &mut store);
        assert_eq!(outcomes, vec![ChangeOutcome::Ignored]);
        assert!(sync.history().past().is_empty());
        assert!(!sync.history().can_undo());
        assert!(!sync.history().can_redo());
    }

    #[test]
    fn test_discard_drops_notifications_without_capture() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        rename(&mut store, "a");

        // open (2) + rename (2) + the acknowledgement of the update signal
        assert_eq!(sync.discard(&mut store), 5);
        assert_eq!(store.pending_changes(), 0);
        assert!(!store.track_state().update);
        assert!(sync.history().past().is_empty());
        assert!(sync.history().current().is_sentinel());
    }

    #[test]
    fn test_discard_releases_pending_write_back() {
        let mut store = opened_store();
        let mut sync = SyncCoordinator::default();
        drain(&mut sync, &mut store);
        rename(&mut store, "a");
        drain(&mut sync, &mut store);

        assert!(sync.undo(&mut store).is_some());
        assert!(sync.is_write_pending());
        sync.discard(&mut store);
        assert!(!sync.is_write_pending());
        assert!(drain(&mut sync, &mut store).is_empty());
    }
}
