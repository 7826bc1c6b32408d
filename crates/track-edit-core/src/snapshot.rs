/// Immutable captures of a track's editable content.
use std::sync::Arc;

use crate::document::{TrackContent, TrackDocument};
use crate::history::Sentinel;

/// A deep copy of a document's `TrackContent` at one point in time.
///
/// The content sits behind an `Arc` and is only ever exposed by shared
/// reference, so a stored snapshot cannot change and cloning it for
/// `undo`/`redo` results is cheap. Renderer layers and transient flags are
/// not part of a snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Arc<TrackContent>);

impl Snapshot {
    /// Captures the editable fields of `doc`.
    pub fn capture(doc: &TrackDocument) -> Self {
        Self(Arc::new(doc.content.clone()))
    }

    /// The canonical empty snapshot: default content.
    pub fn empty() -> Self {
        Self(Arc::new(TrackContent::default()))
    }

    pub fn content(&self) -> &TrackContent {
        &self.0
    }

    /// Builds the document to write back when this snapshot is restored.
    ///
    /// Content comes from the snapshot; `layers` come from `live`, the
    /// document currently in the store, never from an older capture. The
    /// routing flags are raised so the renderer and router recompute from
    /// the restored content. `save` is left as it is in `live`.
    pub fn restore_onto(&self, live: &TrackDocument) -> TrackDocument {
        TrackDocument {
            content: TrackContent::clone(&self.0),
            layers: live.layers.clone(),
            update_layers: true,
            get_routing: true,
            save: live.save,
        }
    }
}

impl Sentinel for Snapshot {
    fn sentinel() -> Self {
        Self::empty()
    }

    fn is_sentinel(&self) -> bool {
        *self.0 == TrackContent::default()
    }
}
