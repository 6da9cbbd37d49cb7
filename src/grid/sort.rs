use tracing::debug;

use crate::data::row_set::RowSet;
use crate::grid::column::ColumnDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Asc)
    }
}

/// Which column the local sort uses, if any.
///
/// Pressing the selected column flips the direction. Pressing any other
/// column starts over at `Desc`; directions are not remembered per column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortState {
    pub selected_column_id: Option<String>,
    pub direction: Option<SortDirection>,
}

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.selected_column_id.is_some() && self.direction.is_some()
    }

    /// Direction shown on a column header
    pub fn direction_for(&self, column_id: &str) -> Option<SortDirection> {
        if self.selected_column_id.as_deref() == Some(column_id) {
            self.direction
        } else {
            None
        }
    }

    /// Handle a header press. Returns the new direction, or None when the
    /// column cannot be sorted and the state was left untouched.
    pub fn press(&mut self, column: &ColumnDescriptor) -> Option<SortDirection> {
        column.accessor.sort_key()?;

        let next = match (self.selected_column_id.as_deref(), self.direction) {
            (Some(selected), Some(direction)) if selected == column.id => direction.flipped(),
            _ => SortDirection::Desc,
        };

        self.selected_column_id = Some(column.id.clone());
        self.direction = Some(next);
        Some(next)
    }

    /// Re-apply the active sort to `rows` using the column set to resolve the field
    pub fn apply(&self, rows: &mut RowSet, columns: &[ColumnDescriptor]) {
        let (Some(column_id), Some(direction)) = (&self.selected_column_id, self.direction) else {
            return;
        };

        let Some(field) = columns
            .iter()
            .find(|c| &c.id == column_id)
            .and_then(|c| c.accessor.sort_key())
        else {
            return;
        };

        debug!(target: "grid_sort", "Sorting {} rows by {} {:?}", rows.len(), field, direction);
        rows.sort_by_field(field, direction.is_ascending());
    }

    pub fn clear(&mut self) {
        self.selected_column_id = None;
        self.direction = None;
    }
}
