// Render model produced by the grid each frame.
// Renderers only read this; they never reach back into grid state.

use std::ops::Range;

use crate::grid::column::Align;
use crate::grid::sort::SortDirection;

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub column_id: String,
    pub label: String,
    pub width: u16,
    pub align: Align,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BodyRow {
    /// Index in the grid's (sorted) row set
    pub index: usize,
    pub id: String,
    /// Top line of the row in content coordinates
    pub top: i64,
    pub selected: bool,
    pub cells: Vec<String>,
}

/// The pinned column: a fixed header and a body that follows the scroll offset
#[derive(Debug, Clone, PartialEq)]
pub struct PinnedOverlay {
    pub header: HeaderCell,
    /// Vertical translation applied to the body, equal to minus the scroll offset
    pub translate_y: i64,
    pub rows: Vec<BodyRow>,
    /// Spacer matching the scrollable region's footer
    pub footer_lines: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableFrame {
    /// Visible scrollable headers, in display order
    pub header: Vec<HeaderCell>,
    /// Windowed rows of the scrollable region (visible columns only)
    pub rows: Vec<BodyRow>,
    pub row_range: Range<usize>,
    pub total_rows: usize,
    pub row_height: u16,
    pub scroll_offset: u32,
    pub pinned: Option<PinnedOverlay>,
    /// Show the "loading more" footer after the last row
    pub show_footer: bool,
    pub refreshing: bool,
    /// Number of scrollable columns hidden to the left
    pub h_offset: usize,
    /// Number of scrollable columns hidden to the right
    pub hidden_right: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridFrame {
    /// Initial load: only a loading indicator is drawn
    Loading,
    Empty {
        message: String,
        action: Option<String>,
    },
    Table(TableFrame),
}

impl GridFrame {
    pub fn as_table(&self) -> Option<&TableFrame> {
        match self {
            GridFrame::Table(table) => Some(table),
            _ => None,
        }
    }
}
