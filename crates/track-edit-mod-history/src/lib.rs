/// Linear undo/redo history for a single edit target.
///
/// Provides a `HistoryStack` holding past, current and future entries, with
/// an explicit sentinel entry marking the true start of an editing session.
/// The stack never touches the document it describes; callers capture
/// entries and write restored entries back themselves.
pub mod config;
pub mod entry;
pub mod stack;

pub use config::HistoryConfig;
pub use entry::Sentinel;
pub use stack::{HistoryStack, HistorySummary};
