/// Configuration and utility functions for the history system.
use std::sync::atomic::{AtomicU64, Ordering};

/// Maximum number of entries kept in `past` before the oldest real
/// entry is evicted.
const DEFAULT_MAX_DEPTH: usize = 10_000;

/// Smallest usable depth: the sentinel floor plus one real entry.
pub const MIN_MAX_DEPTH: usize = 2;

/// Configuration for the history system.
#[derive(Debug, Clone)]
pub struct HistoryConfig {
    /// Max entries in `past`, sentinel included.
    pub max_depth: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl HistoryConfig {
    /// Returns a config with `max_depth` clamped to `MIN_MAX_DEPTH`.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth: max_depth.max(MIN_MAX_DEPTH),
        }
    }
}

/// Counter for generating unique track names within a process lifetime.
static LOCAL_TRACK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generates a unique name for a newly created local track.
pub fn generate_local_track_name() -> String {
    let count = LOCAL_TRACK_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("local-track-{count}")
}
