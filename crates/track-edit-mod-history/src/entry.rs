// Entry contract for values stored in a `HistoryStack`.

/// A history entry type with a canonical "nothing captured yet" value.
///
/// The sentinel is the value a stack starts from. Once the first real entry
/// is pushed the sentinel moves into `past` and forms a floor that undo
/// never crosses, so a freshly opened document with zero edits reports undo
/// as unavailable.
pub trait Sentinel {
    /// Returns the canonical empty entry.
    fn sentinel() -> Self;

    /// Whether this entry is the canonical empty entry.
    fn is_sentinel(&self) -> bool;
}
