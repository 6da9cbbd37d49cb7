use std::ops::Range;
use tracing::trace;

/// Lines of upward overscroll at the top that count as a pull-to-refresh
pub const PULL_TO_REFRESH_LINES: u32 = 3;

/// Result of feeding a scroll event into [`ScrollSync`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollOutcome {
    /// Offset unchanged
    Unchanged,
    /// Offset moved to the contained value
    Moved(u32),
    /// The user pulled past the top far enough to request a refresh
    PullRefresh,
}

/// Vertical scroll state of the grid body.
///
/// The scrollable region is the only writer of the offset. Every other
/// region (the pinned overlay) derives its position from it and never
/// feeds a value back.
#[derive(Debug, Clone)]
pub struct ScrollSync {
    offset: u32,
    row_height: u16,
    row_count: usize,
    /// Extra lines below the last row (the "loading more" footer)
    footer_lines: u32,
    viewport_height: u32,
    pull_distance: u32,
}

impl ScrollSync {
    pub fn new(row_height: u16) -> Self {
        Self {
            offset: 0,
            row_height: row_height.max(1),
            row_count: 0,
            footer_lines: 0,
            viewport_height: 0,
            pull_distance: 0,
        }
    }

    pub fn row_height(&self) -> u16 {
        self.row_height
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
        self.clamp();
    }

    pub fn set_content(&mut self, row_count: usize, footer_lines: u32) {
        self.row_count = row_count;
        self.footer_lines = footer_lines;
        self.clamp();
    }

    pub fn content_height(&self) -> u32 {
        (self.row_count as u32).saturating_mul(self.row_height as u32) + self.footer_lines
    }

    pub fn max_offset(&self) -> u32 {
        self.content_height().saturating_sub(self.viewport_height)
    }

    /// Scroll event carrying an absolute offset
    pub fn on_scroll(&mut self, offset: u32) -> ScrollOutcome {
        self.pull_distance = 0;
        let target = offset.min(self.max_offset());
        if target == self.offset {
            return ScrollOutcome::Unchanged;
        }
        self.offset = target;
        trace!(target: "grid_scroll", "scroll offset -> {}", target);
        ScrollOutcome::Moved(target)
    }

    /// Scroll event carrying a relative delta in lines
    pub fn scroll_by(&mut self, delta: i32) -> ScrollOutcome {
        if delta < 0 && self.offset == 0 {
            self.pull_distance += delta.unsigned_abs();
            if self.pull_distance >= PULL_TO_REFRESH_LINES {
                self.pull_distance = 0;
                return ScrollOutcome::PullRefresh;
            }
            return ScrollOutcome::Unchanged;
        }

        let target = if delta < 0 {
            self.offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.offset.saturating_add(delta as u32)
        };
        self.on_scroll(target)
    }

    /// Vertical translation of the pinned overlay. Always the exact negative
    /// of the tracked offset.
    pub fn pinned_translation(&self) -> i64 {
        -(self.offset as i64)
    }

    /// Indices of rows that intersect the viewport
    pub fn visible_rows(&self) -> Range<usize> {
        if self.row_count == 0 {
            return 0..0;
        }
        let rh = self.row_height as u32;
        let start = (self.offset / rh) as usize;
        let bottom = self.offset + self.viewport_height.max(1);
        let end = bottom.div_ceil(rh) as usize;
        start.min(self.row_count)..end.min(self.row_count)
    }

    /// Top line of a row in content coordinates
    pub fn row_top(&self, index: usize) -> i64 {
        index as i64 * self.row_height as i64
    }

    /// Adjust the offset so that `index` is fully visible
    pub fn ensure_visible(&mut self, index: usize) -> ScrollOutcome {
        let rh = self.row_height as u32;
        let top = index as u32 * rh;
        let bottom = top + rh;
        if top < self.offset {
            self.on_scroll(top)
        } else if bottom > self.offset + self.viewport_height {
            self.on_scroll(bottom.saturating_sub(self.viewport_height))
        } else {
            ScrollOutcome::Unchanged
        }
    }

    /// Lines between the bottom of the viewport and the end of the content
    pub fn distance_from_end(&self) -> u32 {
        self.content_height()
            .saturating_sub(self.offset + self.viewport_height)
    }

    /// Trailing-edge check: within `threshold` viewports of the end.
    /// Always false before the viewport has been measured.
    pub fn is_near_end(&self, threshold: f32) -> bool {
        if self.viewport_height == 0 {
            return false;
        }
        let limit = (self.viewport_height as f32 * threshold.max(0.0)).floor() as u32;
        self.distance_from_end() <= limit
    }

    pub fn reset(&mut self) {
        self.offset = 0;
        self.pull_distance = 0;
    }

    fn clamp(&mut self) {
        let max = self.max_offset();
        if self.offset > max {
            self.offset = max;
        }
    }
}

/// Keeps at most one load-more request outstanding.
///
/// A request is allowed only while more data exists and nothing is loading;
/// once granted, the gate stays closed until the next data arrival.
#[derive(Debug, Clone, Default)]
pub struct LoadMoreGate {
    pending: bool,
}

impl LoadMoreGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns true when the caller should fire load-more now
    pub fn try_request(&mut self, has_more: bool, busy: bool) -> bool {
        if !has_more || busy || self.pending {
            return false;
        }
        self.pending = true;
        true
    }

    /// Rows for the previous request arrived (or the data was replaced)
    pub fn on_data_arrived(&mut self) {
        self.pending = false;
    }
}
