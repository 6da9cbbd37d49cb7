use std::ops::Range;

use crate::grid::column::ColumnDescriptor;

/// Width used for a scrollable column with no sizing hints
pub const DEFAULT_COLUMN_WIDTH: u16 = 14;
/// Width used for the pinned column with no sizing hints
pub const DEFAULT_PINNED_COLUMN_WIDTH: u16 = 18;
/// Starting width of a flex column before leftover space is shared out
const MIN_FLEX_WIDTH: u16 = 4;

/// Resolve widths for a set of columns sharing `available` cells.
///
/// `width` wins, then `flex` (which shares whatever is left over, starting
/// from `min_width`), then `min_width`, then `default`.
pub fn resolve_widths(columns: &[&ColumnDescriptor], available: u16, default: u16) -> Vec<u16> {
    let mut widths: Vec<u16> = columns
        .iter()
        .map(|c| {
            if let Some(w) = c.width {
                w.max(c.min_width.unwrap_or(0))
            } else if c.is_flex() {
                c.min_width.unwrap_or(MIN_FLEX_WIDTH)
            } else {
                c.min_width.unwrap_or(default)
            }
        })
        .collect();

    let flex_indices: Vec<usize> = columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_flex())
        .map(|(i, _)| i)
        .collect();
    if flex_indices.is_empty() {
        return widths;
    }

    let used: u32 = widths.iter().map(|&w| w as u32).sum();
    let leftover = (available as u32).saturating_sub(used);
    if leftover == 0 {
        return widths;
    }

    let total_flex: u32 = flex_indices
        .iter()
        .map(|&i| columns[i].flex.unwrap_or(0) as u32)
        .sum();

    let mut handed_out = 0u32;
    for (n, &i) in flex_indices.iter().enumerate() {
        let share = if n + 1 == flex_indices.len() {
            leftover - handed_out
        } else {
            leftover * columns[i].flex.unwrap_or(0) as u32 / total_flex
        };
        handed_out += share;
        widths[i] = widths[i].saturating_add(share as u16);
    }

    widths
}

/// Split of the column set into the pinned column and the scrollable block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridLayout {
    /// Index into the column set of the pinned column
    pub pinned: Option<usize>,
    pub pinned_width: u16,
    /// Indices into the column set, in display order
    pub scrollable: Vec<usize>,
    pub scrollable_widths: Vec<u16>,
}

impl GridLayout {
    pub fn compute(columns: &[ColumnDescriptor], pinned: Option<usize>, available_width: u16) -> Self {
        let pinned_width = pinned
            .and_then(|i| columns.get(i))
            .map(|c| resolve_widths(&[c], available_width, DEFAULT_PINNED_COLUMN_WIDTH)[0])
            .unwrap_or(0);

        let scrollable: Vec<usize> = (0..columns.len()).filter(|&i| Some(i) != pinned).collect();
        let refs: Vec<&ColumnDescriptor> = scrollable.iter().map(|&i| &columns[i]).collect();
        let scrollable_widths = resolve_widths(
            &refs,
            available_width.saturating_sub(pinned_width),
            DEFAULT_COLUMN_WIDTH,
        );

        Self {
            pinned,
            pinned_width,
            scrollable,
            scrollable_widths,
        }
    }

    /// Total width of the scrollable block
    pub fn scrollable_content_width(&self) -> u32 {
        self.scrollable_widths.iter().map(|&w| w as u32).sum()
    }

    /// Scrollable columns (positions within `scrollable`) that fit in
    /// `available_width` when the block is shifted left by `h_offset` columns.
    /// The first visible column is always included even if it does not fit.
    pub fn visible_scrollable(&self, h_offset: usize, available_width: u16) -> Range<usize> {
        let start = h_offset.min(self.scrollable.len());
        let room = available_width.saturating_sub(self.pinned_width) as u32;

        let mut used = 0u32;
        let mut end = start;
        for &w in &self.scrollable_widths[start..] {
            if end > start && used + w as u32 > room {
                break;
            }
            used += w as u32;
            end += 1;
        }
        start..end
    }

    /// Largest useful horizontal offset: the one that brings the last column into view
    pub fn max_h_offset(&self, available_width: u16) -> usize {
        let room = available_width.saturating_sub(self.pinned_width) as u32;
        let mut used = 0u32;
        let mut first = self.scrollable_widths.len();
        for (i, &w) in self.scrollable_widths.iter().enumerate().rev() {
            if used + w as u32 > room && first < self.scrollable_widths.len() {
                break;
            }
            used += w as u32;
            first = i;
        }
        first.min(self.scrollable_widths.len().saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_then_min_then_default() {
        let a = ColumnDescriptor::field("a", "A").width(10);
        let b = ColumnDescriptor::field("b", "B").min_width(7);
        let c = ColumnDescriptor::field("c", "C");
        assert_eq!(resolve_widths(&[&a, &b, &c], 100, 12), vec![10, 7, 12]);
    }

    #[test]
    fn test_flex_shares_leftover() {
        let fixed = ColumnDescriptor::field("fixed", "F").width(20);
        let one = ColumnDescriptor::field("one", "1").flex(1);
        let two = ColumnDescriptor::field("two", "2").flex(2);
        // leftover = 60 - 20 - 4 - 4 = 32 -> 10 and 22
        assert_eq!(resolve_widths(&[&fixed, &one, &two], 60, 12), vec![20, 14, 26]);
    }

    #[test]
    fn test_flex_without_room_keeps_minimum() {
        let fixed = ColumnDescriptor::field("fixed", "F").width(50);
        let flex = ColumnDescriptor::field("flex", "X").flex(1).min_width(6);
        assert_eq!(resolve_widths(&[&fixed, &flex], 40, 12), vec![50, 6]);
    }

    #[test]
    fn test_layout_excludes_pinned() {
        let columns = vec![
            ColumnDescriptor::field("title", "Title").width(20),
            ColumnDescriptor::field("status", "Status").width(10),
            ColumnDescriptor::field("category", "Category").width(12),
        ];
        let layout = GridLayout::compute(&columns, Some(0), 80);
        assert_eq!(layout.pinned_width, 20);
        assert_eq!(layout.scrollable, vec![1, 2]);
        assert_eq!(layout.scrollable_content_width(), 22);
    }

    #[test]
    fn test_visible_scrollable_window() {
        let columns: Vec<ColumnDescriptor> = (0..6)
            .map(|i| ColumnDescriptor::field(format!("c{}", i), "C").width(10))
            .collect();
        let layout = GridLayout::compute(&columns, Some(0), 40);
        // 30 cells of room after the pinned column
        assert_eq!(layout.visible_scrollable(0, 40), 0..3);
        assert_eq!(layout.visible_scrollable(3, 40), 3..5);
        assert_eq!(layout.max_h_offset(40), 2);
    }
}
