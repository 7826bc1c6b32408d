/// Editing-history synchronization engine for the track editor.
///
/// A `SessionController` keeps a linear undo/redo history of the active
/// track while the track itself lives in an external `DocumentStore` that
/// other collaborators also write to. The `SyncCoordinator` keeps the two
/// from re-triggering each other.
pub mod document;
pub mod favorites;
pub mod history;
pub mod local_tracks;
pub mod session;
pub mod snapshot;
pub mod store;
pub mod sync;

pub use document::{
    is_empty_track, LayerHandle, Segment, TrackContent, TrackDocument, TrackMetadata, TrackPoint,
    Waypoint,
};
pub use favorites::{FavoriteGroup, GroupToggle};
pub use history::{HistoryConfig, HistorySummary, Sentinel, TrackHistory};
pub use local_tracks::{LocalTrackStore, StoredTrack};
pub use session::{CommandAvailability, ObjectType, SessionController};
pub use snapshot::Snapshot;
pub use store::{DocumentStore, Revision, StoreChange, TrackState, TrackStore};
pub use sync::{ChangeOutcome, EchoGuard, SyncCoordinator};
