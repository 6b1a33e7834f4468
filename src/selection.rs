/// DataTable Selection and Column Visibility
///
/// Row selection and column visibility are independent of filtering and
/// sorting. The controller decides scope (page, filtered set, whole dataset);
/// these types only store state.

use crate::table::RowId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Tri-state of a "select all" header checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckState {
    Unchecked,
    Checked,
    Indeterminate,
}

impl CheckState {
    /// Derive the header state from the rows it covers.
    pub fn from_rows<'a, I>(ids: I, selection: &RowSelection) -> Self
    where
        I: IntoIterator<Item = &'a RowId>,
    {
        let mut total = 0;
        let mut selected = 0;
        for id in ids {
            total += 1;
            if selection.is_selected(id) {
                selected += 1;
            }
        }

        match (selected, total) {
            (0, _) => CheckState::Unchecked,
            (s, t) if s == t => CheckState::Checked,
            _ => CheckState::Indeterminate,
        }
    }
}

/// Set of selected row ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSelection {
    selected: BTreeSet<RowId>,
}

impl RowSelection {
    pub fn new() -> Self {
        RowSelection::default()
    }

    /// Flip one row; returns the new state.
    pub fn toggle(&mut self, id: &RowId) -> bool {
        if self.selected.remove(id) {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    pub fn set(&mut self, id: &RowId, selected: bool) {
        if selected {
            self.selected.insert(id.clone());
        } else {
            self.selected.remove(id);
        }
    }

    pub fn is_selected(&self, id: &RowId) -> bool {
        self.selected.contains(id)
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop ids for which `keep` returns false.
    pub fn retain<F: FnMut(&RowId) -> bool>(&mut self, keep: F) {
        self.selected.retain(keep);
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RowId> {
        self.selected.iter()
    }
}

/// Column id to visibility; absent entries are visible.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnVisibility(HashMap<String, bool>);

impl ColumnVisibility {
    pub fn new() -> Self {
        ColumnVisibility::default()
    }

    pub fn set(&mut self, id: &str, visible: bool) {
        self.0.insert(id.to_string(), visible);
    }

    pub fn is_visible(&self, id: &str) -> bool {
        self.0.get(id).copied().unwrap_or(true)
    }

    /// Flip one column; returns the new state.
    pub fn toggle(&mut self, id: &str) -> bool {
        let visible = !self.is_visible(id);
        self.set(id, visible);
        visible
    }

    /// Forget all overrides so every column is visible again.
    pub fn reset(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[i32]) -> Vec<RowId> {
        raw.iter().map(|&n| RowId::from(n)).collect()
    }

    #[test]
    fn test_row_selection_toggle() {
        let mut selection = RowSelection::new();
        let one = RowId::from(1);

        assert!(selection.toggle(&one));
        assert!(selection.is_selected(&one));
        assert!(!selection.toggle(&one));
        assert!(selection.is_empty());

        selection.set(&one, true);
        selection.set(&RowId::from(2), true);
        selection.set(&RowId::from(2), false);
        assert_eq!(selection.len(), 1);
    }

    #[test]
    fn test_row_selection_retain() {
        let mut selection = RowSelection::new();
        for id in ids(&[1, 2, 3]) {
            selection.set(&id, true);
        }
        selection.retain(|id| id.as_str() != "2");
        let remaining: Vec<&str> = selection.iter().map(RowId::as_str).collect();
        assert_eq!(remaining, vec!["1", "3"]);
    }

    #[test]
    fn test_check_state() {
        let page = ids(&[1, 2, 3]);
        let mut selection = RowSelection::new();
        assert_eq!(CheckState::from_rows(&page, &selection), CheckState::Unchecked);

        selection.set(&page[0], true);
        assert_eq!(CheckState::from_rows(&page, &selection), CheckState::Indeterminate);

        for id in &page {
            selection.set(id, true);
        }
        assert_eq!(CheckState::from_rows(&page, &selection), CheckState::Checked);

        // Selections outside the covered rows do not count
        let other_page = ids(&[4, 5]);
        assert_eq!(CheckState::from_rows(&other_page, &selection), CheckState::Unchecked);
        assert_eq!(CheckState::from_rows(&[], &selection), CheckState::Unchecked);
    }

    #[test]
    fn test_column_visibility() {
        let mut visibility = ColumnVisibility::new();
        assert!(visibility.is_visible("email"));

        assert!(!visibility.toggle("email"));
        assert!(!visibility.is_visible("email"));

        visibility.set("email", true);
        assert!(visibility.is_visible("email"));

        visibility.set("name", false);
        visibility.reset();
        assert!(visibility.is_visible("name"));
    }
}
