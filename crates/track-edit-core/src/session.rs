//! Editing session controller.
//!
//! Top-level entry point for the surrounding UI. Lifecycle signals (a track
//! opened, closed or persisted, the store reporting a change) and user
//! commands (undo, redo, clear, save) all come through here and are handled
//! to completion one at a time.

use serde::{Deserialize, Serialize};

use crate::document::{is_empty_track, TrackDocument};
use crate::history::{HistoryConfig, HistorySummary, TrackHistory};
use crate::snapshot::Snapshot;
use crate::store::{DocumentStore, TrackState};
use crate::sync::SyncCoordinator;

/// Kind of object selected on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectType {
    /// A track stored locally in the browser-side store; the only editable kind.
    LocalClientTrack,
    CloudTrack,
    Favorite,
    Weather,
    Poi,
}

/// Which commands the UI should enable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommandAvailability {
    pub undo: bool,
    pub redo: bool,
    pub save: bool,
    pub delete: bool,
    pub change_profile: bool,
    pub close: bool,
}

/// Drives one editing session at a time against an external store.
#[derive(Debug)]
pub struct SessionController {
    sync: SyncCoordinator,
    /// Kind of the active object, `None` when nothing is open.
    object_type: Option<ObjectType>,
    logged_in: bool,
    creating_track: bool,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl SessionController {
    pub fn new(config: &HistoryConfig) -> Self {
        Self {
            sync: SyncCoordinator::new(config),
            object_type: None,
            logged_in: false,
            creating_track: false,
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    /// Makes `doc` the active edit target.
    ///
    /// Any previous history and every notification still queued are
    /// discarded first. A local track's opened document is captured as the
    /// session's first entry, which is not itself undoable. Other object
    /// types record no history.
    pub fn open<S: DocumentStore>(
        &mut self,
        store: &mut S,
        doc: TrackDocument,
        object_type: ObjectType,
    ) {
        self.sync.discard(store);
        self.sync.clear(store);
        tracing::info!("Opening '{}' as {object_type:?}", doc.name());
        self.object_type = Some(object_type);
        store.set(doc);
        store.set_track_state(TrackState { update: true });
        self.pump(store);
    }

    /// Ends the session. The store keeps its document; only the history is
    /// dropped and the store is told about the reset.
    pub fn close<S: DocumentStore>(&mut self, store: &mut S) {
        if let Some(kind) = self.object_type.take() {
            tracing::info!("Closing {kind:?} session");
        }
        self.creating_track = false;
        self.sync.clear(store);
    }

    /// Passive hook: the store reported one or more changes.
    ///
    /// Changes are only captured while a local track is open; otherwise they
    /// are drained. Returns how many notifications were handled.
    pub fn on_external_change<S: DocumentStore>(&mut self, store: &mut S) -> usize {
        self.pump(store)
    }

    /// A save or delete finished and produced a new version of the active
    /// document. It is captured like any other external edit.
    pub fn on_persisted<S: DocumentStore>(&mut self, store: &mut S, doc: TrackDocument) {
        if self.object_type.is_none() {
            tracing::warn!("Ignoring persisted '{}': no active session", doc.name());
            return;
        }
        store.set(doc);
        store.set_track_state(TrackState { update: true });
        self.pump(store);
    }

    // ── User commands ──────────────────────────────────────────────────

    /// Undoes the last edit. Returns `None` when undo is unavailable.
    pub fn undo<S: DocumentStore>(&mut self, store: &mut S) -> Option<Snapshot> {
        if !self.history_commands_enabled() {
            return None;
        }
        self.sync.undo(store)
    }

    /// Redoes the last undone edit. Returns `None` when redo is unavailable.
    pub fn redo<S: DocumentStore>(&mut self, store: &mut S) -> Option<Snapshot> {
        if !self.history_commands_enabled() {
            return None;
        }
        self.sync.redo(store)
    }

    /// Drops the history while keeping the session open.
    pub fn clear<S: DocumentStore>(&mut self, store: &mut S) {
        self.sync.clear(store);
    }

    /// Raises the document's `save` flag so the UI opens its save dialog.
    ///
    /// Returns `false` when saving is not available.
    pub fn request_save<S: DocumentStore>(&mut self, store: &mut S) -> bool {
        self.pump(store);
        if !self.availability(store).save {
            return false;
        }
        let Some(doc) = store.get() else {
            return false;
        };
        let doc = TrackDocument {
            save: true,
            ..doc.clone()
        };
        store.set(doc);
        true
    }

    // ── State ──────────────────────────────────────────────────────────

    pub fn set_logged_in(&mut self, logged_in: bool) {
        self.logged_in = logged_in;
    }

    pub fn set_creating_track(&mut self, creating: bool) {
        self.creating_track = creating;
    }

    pub fn object_type(&self) -> Option<ObjectType> {
        self.object_type
    }

    pub fn is_undo_available(&self) -> bool {
        self.history_commands_enabled() && self.sync.history().can_undo()
    }

    pub fn is_redo_available(&self) -> bool {
        self.history_commands_enabled() && self.sync.history().can_redo()
    }

    pub fn is_write_pending(&self) -> bool {
        self.sync.is_write_pending()
    }

    pub fn history(&self) -> &TrackHistory {
        self.sync.history()
    }

    pub fn summary(&self) -> HistorySummary {
        self.sync.summary()
    }

    /// Command gating for the current object and document.
    pub fn availability<S: DocumentStore>(&self, store: &S) -> CommandAvailability {
        let Some(kind) = self.object_type else {
            return CommandAvailability {
                close: true,
                ..CommandAvailability::default()
            };
        };
        let local = kind == ObjectType::LocalClientTrack;
        let has_geometry = store.get().is_some_and(|doc| !is_empty_track(doc));
        CommandAvailability {
            undo: self.is_undo_available(),
            redo: self.is_redo_available(),
            save: local && self.logged_in && has_geometry,
            delete: !matches!(kind, ObjectType::Weather | ObjectType::Poi),
            change_profile: self.creating_track,
            close: true,
        }
    }

    fn history_commands_enabled(&self) -> bool {
        self.object_type == Some(ObjectType::LocalClientTrack)
    }

    /// Delivers queued store notifications: captured for a local track,
    /// dropped otherwise.
    fn pump<S: DocumentStore>(&mut self, store: &mut S) -> usize {
        if self.history_commands_enabled() {
            self.sync.flush(store)
        } else {
            self.sync.discard(store)
        }
    }
}
