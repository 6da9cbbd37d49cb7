use std::collections::HashSet;
use tracing::debug;

use crate::data::row::Row;
use crate::data::value_compare::compare_optional_cell_values;

/// The locally held copy of rows shown by a grid or list.
///
/// Rows are unique by id. Merging new pages never overwrites an earlier
/// occurrence and never moves it, so arrival order is kept for unsorted data.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    rows: Vec<Row>,
    ids: HashSet<String>,
}

impl RowSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a row set from rows, dropping repeated ids
    pub fn from_rows(rows: impl IntoIterator<Item = Row>) -> Self {
        let mut set = Self::new();
        set.append(rows);
        set
    }

    /// Append a page of rows. Returns the number of rows actually added.
    pub fn append(&mut self, rows: impl IntoIterator<Item = Row>) -> usize {
        let before = self.rows.len();
        let mut dropped = 0usize;

        for row in rows {
            if self.ids.contains(&row.id) {
                dropped += 1;
                continue;
            }
            self.ids.insert(row.id.clone());
            self.rows.push(row);
        }

        let added = self.rows.len() - before;
        if dropped > 0 {
            debug!(target: "row_set", "Appended {} rows, dropped {} duplicates", added, dropped);
        }
        added
    }

    /// Replace the whole set (refresh), de-duplicating the incoming rows
    pub fn replace(&mut self, rows: impl IntoIterator<Item = Row>) {
        self.rows.clear();
        self.ids.clear();
        self.append(rows);
    }

    pub fn remove(&mut self, id: &str) -> Option<Row> {
        let index = self.position(id)?;
        self.ids.remove(id);
        Some(self.rows.remove(index))
    }

    /// Replace a row in place, keeping its position. Returns false if the id is unknown.
    pub fn update(&mut self, row: Row) -> bool {
        match self.position(&row.id) {
            Some(index) => {
                self.rows[index] = row;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.rows.clear();
        self.ids.clear();
    }

    /// Stable sort by a field. Rows with equal values keep their relative order.
    pub fn sort_by_field(&mut self, field: &str, ascending: bool) {
        self.rows.sort_by(|a, b| {
            let cmp = compare_optional_cell_values(a.get(field), b.get(field));
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        });
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        if !self.ids.contains(id) {
            return None;
        }
        self.rows.iter().position(|r| r.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, title: &str) -> Row {
        Row::new(id).with("title", title)
    }

    #[test]
    fn test_append_drops_duplicates_and_keeps_first() {
        let mut set = RowSet::new();
        assert_eq!(set.append(vec![row("1", "one"), row("2", "two")]), 2);
        assert_eq!(set.append(vec![row("2", "TWO"), row("3", "three")]), 1);

        assert_eq!(set.ids(), vec!["1", "2", "3"]);
        assert_eq!(set.get(1).unwrap().text("title"), "two");
    }

    #[test]
    fn test_duplicates_inside_one_page() {
        let set = RowSet::from_rows(vec![row("a", "x"), row("a", "y"), row("b", "z")]);
        assert_eq!(set.ids(), vec!["a", "b"]);
        assert_eq!(set.get(0).unwrap().text("title"), "x");
    }

    #[test]
    fn test_replace_and_remove() {
        let mut set = RowSet::from_rows(vec![row("1", "a"), row("2", "b")]);
        set.replace(vec![row("3", "c")]);
        assert_eq!(set.ids(), vec!["3"]);
        assert!(!set.contains("1"));

        assert!(set.remove("3").is_some());
        assert!(set.is_empty());
        assert!(set.remove("3").is_none());
    }

    #[test]
    fn test_update_keeps_position() {
        let mut set = RowSet::from_rows(vec![row("1", "a"), row("2", "b")]);
        assert!(set.update(row("1", "changed")));
        assert_eq!(set.ids(), vec!["1", "2"]);
        assert_eq!(set.get(0).unwrap().text("title"), "changed");
        assert!(!set.update(row("9", "nope")));
    }
}
