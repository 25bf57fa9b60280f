//! Per-unit widget cache and grid state: sorting, cursor, expansion, eviction.

use std::collections::{HashMap, HashSet};

use crate::sampler::ExecutionUnitRecord;

/// A widget missing from this many consecutive samples is dropped.
pub const EVICT_AFTER_MISSES: u32 = 3;

/// Grid ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    ById,
    ByState,
}

impl SortKey {
    pub fn toggled(self) -> Self {
        match self {
            SortKey::ById => SortKey::ByState,
            SortKey::ByState => SortKey::ById,
        }
    }

    /// Column name shown in the footer.
    pub fn label(self) -> &'static str {
        match self {
            SortKey::ById => "id",
            SortKey::ByState => "state",
        }
    }
}

/// Persistent view state of one execution unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Widget {
    pub id: u64,
    pub state: String,
    pub description: String,
    /// State label followed by every frame.
    pub trace_lines: Vec<String>,
    pub expanded: bool,
    /// Consecutive successful samples this unit was absent from.
    misses: u32,
}

impl Widget {
    fn from_record(record: &ExecutionUnitRecord) -> Self {
        let mut widget = Self {
            id: record.id,
            state: String::new(),
            description: String::new(),
            trace_lines: Vec::new(),
            expanded: false,
            misses: 0,
        };
        widget.update(record);
        widget
    }

    /// Refreshes data fields; `expanded` is left alone.
    fn update(&mut self, record: &ExecutionUnitRecord) {
        self.state.clone_from(&record.state);
        self.description = record.description().to_string();
        self.trace_lines.clear();
        self.trace_lines.push(record.state.clone());
        self.trace_lines.extend(record.frames.iter().cloned());
        self.misses = 0;
    }

    /// Rows this widget occupies in the grid.
    pub fn height(&self) -> usize {
        if self.expanded {
            1 + self.trace_lines.len()
        } else {
            1
        }
    }
}

/// Widget cache plus the ordered row list, cursor and sort key.
#[derive(Debug, Clone, Default)]
pub struct RowStore {
    widgets: HashMap<u64, Widget>,
    rows: Vec<u64>,
    cursor: usize,
    sort_key: SortKey,
}

impl RowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a successful sample.
    ///
    /// Widgets are created or updated in place, unseen ones age toward
    /// eviction, and the row list is rebuilt from exactly the sampled ids.
    /// The cursor stays on the same unit when that unit is still present.
    pub fn reconcile(&mut self, records: &[ExecutionUnitRecord]) {
        let tracked = self.selected_id();
        let mut seen = HashSet::with_capacity(records.len());

        for record in records {
            self.widgets
                .entry(record.id)
                .and_modify(|w| w.update(record))
                .or_insert_with(|| Widget::from_record(record));
            seen.insert(record.id);
        }

        self.widgets.retain(|id, widget| {
            if seen.contains(id) {
                return true;
            }
            widget.misses += 1;
            widget.misses < EVICT_AFTER_MISSES
        });

        self.rows = seen.into_iter().collect();
        self.apply_sort();
        self.resolve_cursor(tracked);
    }

    /// Switches between id and state ordering. Existing rows are re-sorted.
    pub fn toggle_sort(&mut self) -> SortKey {
        let tracked = self.selected_id();
        self.sort_key = self.sort_key.toggled();
        self.apply_sort();
        self.resolve_cursor(tracked);
        self.sort_key
    }

    /// Moves the cursor one row up. Returns whether it moved.
    pub fn cursor_up(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Moves the cursor one row down. Returns whether it moved.
    pub fn cursor_down(&mut self) -> bool {
        if self.cursor + 1 < self.rows.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Flips trace expansion of the row under the cursor.
    ///
    /// Returns `false` when there is no row.
    pub fn toggle_show_trace(&mut self) -> bool {
        let Some(id) = self.selected_id() else {
            return false;
        };
        match self.widgets.get_mut(&id) {
            Some(widget) => {
                widget.expanded = !widget.expanded;
                true
            }
            None => false,
        }
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of cached widgets, including ones hidden from the grid.
    pub fn cached_len(&self) -> usize {
        self.widgets.len()
    }

    /// Row ids in display order.
    pub fn row_ids(&self) -> &[u64] {
        &self.rows
    }

    /// Widgets in display order.
    pub fn rows(&self) -> impl Iterator<Item = &Widget> {
        self.rows.iter().filter_map(|id| self.widgets.get(id))
    }

    pub fn widget(&self, id: u64) -> Option<&Widget> {
        self.widgets.get(&id)
    }

    pub fn selected_id(&self) -> Option<u64> {
        self.rows.get(self.cursor).copied()
    }

    pub fn selected(&self) -> Option<&Widget> {
        self.selected_id().and_then(|id| self.widgets.get(&id))
    }

    fn apply_sort(&mut self) {
        let widgets = &self.widgets;
        match self.sort_key {
            SortKey::ById => self.rows.sort_unstable(),
            SortKey::ByState => self.rows.sort_by(|a, b| {
                let sa = widgets.get(a).map(|w| w.state.as_str()).unwrap_or("");
                let sb = widgets.get(b).map(|w| w.state.as_str()).unwrap_or("");
                sa.cmp(sb).then(a.cmp(b))
            }),
        }
    }

    fn resolve_cursor(&mut self, tracked: Option<u64>) {
        if self.rows.is_empty() {
            self.cursor = 0;
            return;
        }
        if let Some(pos) = tracked.and_then(|id| self.rows.iter().position(|&r| r == id)) {
            self.cursor = pos;
        } else if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len() - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64, state: &str) -> ExecutionUnitRecord {
        ExecutionUnitRecord {
            id,
            state: state.to_string(),
            frames: vec![format!("main.unit{}()", id), "main.main()".to_string()],
        }
    }

    fn sample() -> Vec<ExecutionUnitRecord> {
        vec![
            record(5, "running"),
            record(3, "select"),
            record(9, "chan receive"),
        ]
    }

    #[test]
    fn test_sort_by_id_then_state() {
        let mut store = RowStore::new();
        store.reconcile(&sample());
        assert_eq!(store.sort_key(), SortKey::ById);
        assert_eq!(store.row_ids(), &[3, 5, 9]);

        assert_eq!(store.toggle_sort(), SortKey::ByState);
        assert_eq!(store.row_ids(), &[9, 5, 3]);
    }

    #[test]
    fn test_toggle_sort_twice_restores_order() {
        let mut store = RowStore::new();
        store.reconcile(&sample());
        let before = store.row_ids().to_vec();
        store.toggle_sort();
        store.toggle_sort();
        assert_eq!(store.row_ids(), before.as_slice());
    }

    #[test]
    fn test_state_ties_break_by_id() {
        let mut store = RowStore::new();
        store.toggle_sort();
        store.reconcile(&[
            record(8, "sleep"),
            record(2, "sleep"),
            record(4, "IO wait"),
            record(6, "sleep"),
        ]);
        assert_eq!(store.row_ids(), &[4, 2, 6, 8]);
    }

    #[test]
    fn test_widget_fields() {
        let mut store = RowStore::new();
        store.reconcile(&[record(7, "running")]);
        let widget = store.widget(7).unwrap();
        assert_eq!(widget.state, "running");
        assert_eq!(widget.description, "main.unit7()");
        assert_eq!(
            widget.trace_lines,
            vec!["running", "main.unit7()", "main.main()"]
        );
        assert!(!widget.expanded);
        assert_eq!(widget.height(), 1);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut store = RowStore::new();
        assert!(!store.cursor_up());
        assert!(!store.cursor_down());
        assert_eq!(store.cursor(), 0);

        store.reconcile(&sample());
        assert!(!store.cursor_up());
        assert!(store.cursor_down());
        assert!(store.cursor_down());
        assert!(!store.cursor_down());
        assert_eq!(store.cursor(), 2);
        assert!(store.cursor_up());
        assert_eq!(store.cursor(), 1);
    }

    #[test]
    fn test_cursor_follows_unit_across_refresh() {
        let mut store = RowStore::new();
        store.reconcile(&sample());
        store.cursor_down();
        assert_eq!(store.selected_id(), Some(5));

        store.reconcile(&[record(1, "idle"), record(5, "running"), record(9, "idle")]);
        assert_eq!(store.row_ids(), &[1, 5, 9]);
        assert_eq!(store.selected_id(), Some(5));

        store.toggle_sort();
        assert_eq!(store.selected_id(), Some(5));
    }

    #[test]
    fn test_cursor_clamps_when_rows_shrink() {
        let mut store = RowStore::new();
        store.reconcile(&sample());
        store.cursor_down();
        store.cursor_down();
        assert_eq!(store.selected_id(), Some(9));

        store.reconcile(&[record(3, "select")]);
        assert_eq!(store.cursor(), 0);
        assert_eq!(store.selected_id(), Some(3));

        store.reconcile(&[]);
        assert!(store.is_empty());
        assert_eq!(store.cursor(), 0);
        assert!(store.selected().is_none());
    }

    #[test]
    fn test_expanded_survives_refresh() {
        let mut store = RowStore::new();
        store.reconcile(&sample());
        assert!(store.toggle_show_trace());
        assert!(store.widget(3).unwrap().expanded);

        let mut next = sample();
        next[1].state = "sleep".to_string();
        next.push(record(11, "running"));
        store.reconcile(&next);

        let widget = store.widget(3).unwrap();
        assert!(widget.expanded);
        assert_eq!(widget.state, "sleep");
        assert_eq!(widget.height(), 4);
    }

    #[test]
    fn test_toggle_show_trace_on_empty_store() {
        let mut store = RowStore::new();
        assert!(!store.toggle_show_trace());
    }

    #[test]
    fn test_absent_unit_hidden_but_cached() {
        let mut store = RowStore::new();
        store.reconcile(&sample());
        store.reconcile(&[record(3, "select")]);
        assert_eq!(store.row_ids(), &[3]);
        assert_eq!(store.cached_len(), 3);
        assert!(store.widget(9).is_some());
    }

    #[test]
    fn test_eviction_after_three_misses() {
        let mut store = RowStore::new();
        store.reconcile(&[record(7, "running"), record(1, "idle")]);
        store.cursor_down();
        assert_eq!(store.selected_id(), Some(7));
        assert!(store.toggle_show_trace());

        for _ in 0..2 {
            store.reconcile(&[record(1, "idle")]);
            assert!(store.widget(7).is_some());
        }
        store.reconcile(&[record(1, "idle")]);
        assert!(store.widget(7).is_none());

        store.reconcile(&[record(1, "idle"), record(7, "running")]);
        let widget = store.widget(7).unwrap();
        assert!(!widget.expanded);
    }

    #[test]
    fn test_reappearance_resets_miss_count() {
        let mut store = RowStore::new();
        store.reconcile(&[record(7, "running")]);
        store.toggle_show_trace();

        store.reconcile(&[]);
        store.reconcile(&[]);
        store.reconcile(&[record(7, "running")]);
        store.reconcile(&[]);
        store.reconcile(&[]);

        let widget = store.widget(7).unwrap();
        assert!(widget.expanded);
    }
}
