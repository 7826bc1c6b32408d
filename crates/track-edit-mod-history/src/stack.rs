/// Linear undo/redo stack over immutable history entries.
///
/// `past` is ordered oldest to newest, `future` nearest to farthest. A
/// pristine stack holds the sentinel as `current` with nothing in `past`;
/// the first push moves the sentinel into `past` where it stays as the
/// session floor.
use std::collections::VecDeque;

use serde::Serialize;

use crate::config::{HistoryConfig, MIN_MAX_DEPTH};
use crate::entry::Sentinel;

/// Manages the undo/redo history of a single edit target.
///
/// Entries are expected to be cheap to clone (shared, immutable payloads):
/// `undo` and `redo` hand out a clone of the new `current`.
pub struct HistoryStack<S> {
    /// Entries before `current`, oldest first.
    past: Vec<S>,
    /// The entry describing the live document.
    current: S,
    /// Undone entries, most recently undone first.
    future: VecDeque<S>,
    /// Cap on `past.len()`; the sentinel floor is never evicted.
    max_depth: usize,
}

impl<S> std::fmt::Debug for HistoryStack<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryStack")
            .field("past_len", &self.past.len())
            .field("future_len", &self.future.len())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// Counts and availability flags of a `HistoryStack`, for UI gating and
/// diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistorySummary {
    pub past_len: usize,
    pub future_len: usize,
    pub can_undo: bool,
    pub can_redo: bool,
}

impl<S: Sentinel + Clone> Default for HistoryStack<S> {
    fn default() -> Self {
        Self::new(&HistoryConfig::default())
    }
}

impl<S: Sentinel + Clone> HistoryStack<S> {
    /// Creates a pristine stack: sentinel current, empty past and future.
    pub fn new(config: &HistoryConfig) -> Self {
        Self::with_max_depth(config.max_depth)
    }

    /// Creates a pristine stack with an explicit depth cap.
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            past: Vec::new(),
            current: S::sentinel(),
            future: VecDeque::new(),
            max_depth: max_depth.max(MIN_MAX_DEPTH),
        }
    }

    /// Records a new entry.
    ///
    /// The old `current` is appended to `past` and the redo history is
    /// dropped.
    pub fn push(&mut self, entry: S) {
        let previous = std::mem::replace(&mut self.current, entry);
        self.past.push(previous);
        self.future.clear();

        if self.past.len() > self.max_depth {
            let oldest = usize::from(self.has_floor());
            self.past.remove(oldest);
            tracing::debug!("History depth {} reached, evicted oldest entry", self.max_depth);
        }
    }

    /// Steps back one entry.
    ///
    /// Returns the new `current`, or `None` (state untouched) when nothing
    /// can be undone.
    pub fn undo(&mut self) -> Option<S> {
        if !self.can_undo() {
            return None;
        }
        let previous = self.past.pop()?;
        let undone = std::mem::replace(&mut self.current, previous);
        self.future.push_front(undone);
        Some(self.current.clone())
    }

    /// Steps forward one entry.
    ///
    /// Returns the new `current`, or `None` (state untouched) when the
    /// redo history is empty.
    pub fn redo(&mut self) -> Option<S> {
        let next = self.future.pop_front()?;
        let redone = std::mem::replace(&mut self.current, next);
        self.past.push(redone);
        Some(self.current.clone())
    }

    /// Returns to the pristine state.
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
        self.current = S::sentinel();
    }

    /// Whether undo is available.
    ///
    /// False when `past` is empty, or when it holds only the sentinel: the
    /// first captured entry is the document as opened, not an edit.
    pub fn can_undo(&self) -> bool {
        match self.past.as_slice() {
            [] => false,
            [only] => !only.is_sentinel(),
            _ => true,
        }
    }

    /// Whether redo is available.
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Entries before `current`, oldest first.
    pub fn past(&self) -> &[S] {
        &self.past
    }

    /// The entry describing the live document.
    pub fn current(&self) -> &S {
        &self.current
    }

    /// Undone entries, nearest first.
    pub fn future(&self) -> impl ExactSizeIterator<Item = &S> {
        self.future.iter()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            past_len: self.past.len(),
            future_len: self.future.len(),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    fn has_floor(&self) -> bool {
        self.past.first().is_some_and(Sentinel::is_sentinel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Entry(Option<&'static str>);

    impl Sentinel for Entry {
        fn sentinel() -> Self {
            Entry(None)
        }

        fn is_sentinel(&self) -> bool {
            self.0.is_none()
        }
    }

    const EMPTY: Entry = Entry(None);

    fn e(label: &'static str) -> Entry {
        Entry(Some(label))
    }

    fn future_of(stack: &HistoryStack<Entry>) -> Vec<Entry> {
        stack.future().cloned().collect()
    }

    fn stack() -> HistoryStack<Entry> {
        HistoryStack::with_max_depth(100)
    }

    // --- Basic transitions ---

    #[test]
    fn test_pristine_stack() {
        let s = stack();
        assert!(s.past().is_empty());
        assert_eq!(*s.current(), EMPTY);
        assert!(!s.can_undo());
        assert!(!s.can_redo());
    }

    #[test]
    fn test_push_grows_past_and_clears_future() {
        let mut s = stack();
        for (i, label) in ["a", "b", "c", "d"].into_iter().enumerate() {
            s.push(e(label));
            assert_eq!(s.past().len(), i + 1);
            assert!(!s.can_redo());
        }

        s.undo();
        assert!(s.can_redo());
        let before = s.past().len();
        s.push(e("x"));
        assert_eq!(s.past().len(), before + 1);
        assert_eq!(s.future().len(), 0);
    }

    #[test]
    fn test_first_capture_is_not_undoable() {
        let mut s = stack();
        s.push(e("opened"));
        assert_eq!(s.past(), &[EMPTY]);
        assert!(!s.can_undo());
        assert!(s.undo().is_none());
    }

    #[test]
    fn test_undo_two_captures() {
        let mut s = stack();
        s.push(e("s1"));
        s.push(e("s2"));

        assert_eq!(s.undo(), Some(e("s1")));
        assert_eq!(s.past(), &[EMPTY]);
        assert_eq!(future_of(&s), vec![e("s2")]);
        assert!(!s.can_undo());
        assert!(s.can_redo());
    }

    #[test]
    fn test_redo_after_undo() {
        let mut s = stack();
        s.push(e("s1"));
        s.push(e("s2"));
        s.undo();

        assert_eq!(s.redo(), Some(e("s2")));
        assert!(future_of(&s).is_empty());
        assert_eq!(s.past(), &[EMPTY, e("s1")]);
    }

    #[test]
    fn test_undo_then_redo_restores_current() {
        let mut s = stack();
        for label in ["a", "b", "c"] {
            s.push(e(label));
        }
        let before = s.current().clone();
        s.undo().expect("undo");
        assert_eq!(s.redo(), Some(before.clone()));
        assert_eq!(*s.current(), before);
    }

    #[test]
    fn test_future_is_nearest_first() {
        let mut s = stack();
        for label in ["a", "b", "c", "d"] {
            s.push(e(label));
        }
        s.undo();
        s.undo();
        assert_eq!(future_of(&s), vec![e("c"), e("d")]);
        assert_eq!(s.redo(), Some(e("c")));
        assert_eq!(s.redo(), Some(e("d")));
        assert!(s.redo().is_none());
    }

    // --- Unavailable transitions leave state untouched ---

    #[test]
    fn test_undo_when_unavailable_is_noop() {
        let mut s = stack();
        s.push(e("s1"));
        let past = s.past().to_vec();
        let current = s.current().clone();

        assert!(s.undo().is_none());
        assert!(s.undo().is_none());
        assert_eq!(s.past(), past.as_slice());
        assert_eq!(*s.current(), current);
        assert!(future_of(&s).is_empty());
    }

    #[test]
    fn test_redo_when_unavailable_is_noop() {
        let mut s = stack();
        s.push(e("s1"));
        s.push(e("s2"));
        assert!(s.redo().is_none());
        assert_eq!(*s.current(), e("s2"));
        assert_eq!(s.past().len(), 2);
    }

    #[test]
    fn test_undo_availability_matches_floor_rule() {
        let mut s = stack();
        for label in ["a", "b", "c"] {
            s.push(e(label));
        }
        while s.undo().is_some() {
            let floor_only = s.past().len() == 1 && s.past()[0].is_sentinel();
            assert_eq!(s.can_undo(), !floor_only);
        }
        assert_eq!(s.past(), &[EMPTY]);
    }

    // --- Clear ---

    #[test]
    fn test_clear_fresh_stack() {
        let mut s = stack();
        s.clear();
        assert!(!s.can_undo());
        assert!(!s.can_redo());
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut s = stack();
        s.push(e("a"));
        s.push(e("b"));
        s.undo();
        s.clear();
        assert!(s.past().is_empty());
        assert_eq!(*s.current(), EMPTY);
        assert_eq!(s.future().len(), 0);
        assert!(!s.can_undo());
        assert!(!s.can_redo());
    }

    // --- Depth cap ---

    #[test]
    fn test_max_depth_keeps_sentinel_floor() {
        let mut s = HistoryStack::with_max_depth(3);
        for label in ["a", "b", "c", "d", "e"] {
            s.push(e(label));
        }
        assert_eq!(s.past(), &[EMPTY, e("c"), e("d")]);
        assert_eq!(*s.current(), e("e"));
    }

    #[test]
    fn test_max_depth_clamped_to_minimum() {
        let s: HistoryStack<Entry> = HistoryStack::with_max_depth(0);
        assert_eq!(s.max_depth(), MIN_MAX_DEPTH);
    }

    #[test]
    fn test_summary() {
        let mut s = stack();
        s.push(e("a"));
        s.push(e("b"));
        s.undo();
        assert_eq!(
            s.summary(),
            HistorySummary {
                past_len: 1,
                future_len: 1,
                can_undo: false,
                can_redo: true,
            }
        );
    }
}
