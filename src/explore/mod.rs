//! Step-through exploration over a ranked result set.
//!
//! The cursor is the one piece of mutable session state besides the result
//! set itself. It owns both: a new search hands its results over wholesale
//! and the cursor resets, so there is never a stale index pointing into a
//! replaced result set.

use tracing::warn;

use crate::{
    geometry::BoundingBox,
    search::{ResultSet, ScoredRecord},
};

/// Cursor over ranked results with open/closed panel state.
///
/// Navigation clamps at both ends rather than wrapping, and is a no-op while
/// the panel is closed.
#[derive(Default)]
pub struct ExploreCursor {
    results: ResultSet,
    index: usize,
    open: bool,
}

impl ExploreCursor {
    #[must_use]
    pub fn new(results: ResultSet) -> Self {
        Self {
            results,
            index: 0,
            open: false,
        }
    }

    /// Swap in a fresh result set, closing the panel and rewinding to the
    /// top-ranked item.
    pub fn replace(&mut self, results: ResultSet) {
        self.results = results;
        self.index = 0;
        self.open = false;
    }

    /// Open the panel at the top-ranked item. Returns `None` (and stays
    /// closed) when there are no results to explore.
    pub fn start(&mut self) -> Option<&ScoredRecord> {
        if self.results.is_empty() {
            return None;
        }
        self.index = 0;
        self.open = true;
        self.results.first()
    }

    /// Step to the next item, clamping at the last one.
    pub fn next(&mut self) -> Option<&ScoredRecord> {
        if !self.open {
            return None;
        }
        if self.index + 1 < self.results.len() {
            self.index += 1;
        }
        self.results.get(self.index)
    }

    /// Step to the previous item, clamping at the first one.
    pub fn prev(&mut self) -> Option<&ScoredRecord> {
        if !self.open {
            return None;
        }
        self.index = self.index.saturating_sub(1);
        self.results.get(self.index)
    }

    /// Close the panel. The result set and position survive until the next
    /// search replaces them.
    pub fn close(&mut self) {
        self.open = false;
    }

    /// The item under the cursor, when the panel is open.
    pub fn current(&self) -> Option<&ScoredRecord> {
        self.open.then(|| self.results.get(self.index)).flatten()
    }

    /// Bounds of the current item for the highlight overlay. A record whose
    /// bbox does not parse stays navigable but produces no highlight.
    pub fn highlight_bounds(&self) -> Option<BoundingBox> {
        let scored = self.current()?;
        match BoundingBox::parse(&scored.record.bbox) {
            Ok(bbox) => Some(bbox),
            Err(e) => {
                warn!(
                    error = %e,
                    description = %scored.record.description_from_model,
                    "current item has no usable bbox, skipping highlight"
                );
                None
            }
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Zero-based position and total count, for "3 of 12" style displays.
    #[must_use]
    pub fn position(&self) -> (usize, usize) {
        (self.index, self.results.len())
    }

    #[must_use]
    pub fn has_prev(&self) -> bool {
        self.open && self.index > 0
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.open && self.index + 1 < self.results.len()
    }

    pub fn results(&self) -> &[ScoredRecord] {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::SceneRecord;

    fn three_results() -> ResultSet {
        vec![
            ScoredRecord {
                record: SceneRecord::new("first", json!("(0,0,1,1)")),
                relevance: 3.0,
            },
            ScoredRecord {
                record: SceneRecord::new("second", json!("(1,1,2,2)")),
                relevance: 2.0,
            },
            ScoredRecord {
                record: SceneRecord::new("third", json!("oops")),
                relevance: 1.0,
            },
        ]
    }

    #[test]
    fn test_start_opens_at_top_ranked() {
        let mut cursor = ExploreCursor::new(three_results());
        assert!(!cursor.is_open());
        let first = cursor.start().unwrap();
        assert_eq!(first.record.description_from_model, "first");
        assert!(cursor.is_open());
        assert!(!cursor.has_prev());
        assert!(cursor.has_next());
    }

    #[test]
    fn test_start_on_empty_results_stays_closed() {
        let mut cursor = ExploreCursor::new(Vec::new());
        assert!(cursor.start().is_none());
        assert!(!cursor.is_open());
    }

    #[test]
    fn test_navigation_clamps_at_both_ends() {
        let mut cursor = ExploreCursor::new(three_results());
        cursor.start();

        // Clamp at the start.
        assert_eq!(cursor.prev().unwrap().record.description_from_model, "first");

        cursor.next();
        cursor.next();
        assert_eq!(cursor.current().unwrap().record.description_from_model, "third");
        assert!(!cursor.has_next());

        // Clamp at the end.
        assert_eq!(cursor.next().unwrap().record.description_from_model, "third");
    }

    #[test]
    fn test_navigation_while_closed_is_noop() {
        let mut cursor = ExploreCursor::new(three_results());
        assert!(cursor.next().is_none());
        assert!(cursor.prev().is_none());
        assert!(cursor.current().is_none());

        cursor.start();
        cursor.next();
        cursor.close();
        assert!(cursor.next().is_none());
        assert!(cursor.current().is_none());
    }

    #[test]
    fn test_highlight_bounds_for_current_item() {
        let mut cursor = ExploreCursor::new(three_results());
        cursor.start();
        let bounds = cursor.highlight_bounds().unwrap();
        assert_eq!(bounds, BoundingBox::from_coords(0.0, 0.0, 1.0, 1.0).unwrap());
    }

    #[test]
    fn test_unparseable_bbox_yields_no_highlight_but_stays_navigable() {
        let mut cursor = ExploreCursor::new(three_results());
        cursor.start();
        cursor.next();
        cursor.next();
        assert_eq!(cursor.current().unwrap().record.description_from_model, "third");
        assert!(cursor.highlight_bounds().is_none());
    }

    #[test]
    fn test_replace_resets_cursor() {
        let mut cursor = ExploreCursor::new(three_results());
        cursor.start();
        cursor.next();
        cursor.replace(three_results());
        assert!(!cursor.is_open());
        assert_eq!(cursor.position(), (0, 3));
    }
}
