// Re-exports from track-edit-mod-history.
// Bridges the generic history crate with the track snapshot type.
pub use track_edit_mod_history::config::generate_local_track_name;
pub use track_edit_mod_history::{HistoryConfig, HistoryStack, HistorySummary, Sentinel};

use crate::snapshot::Snapshot;

/// History of track snapshots for one editing session.
pub type TrackHistory = HistoryStack<Snapshot>;
