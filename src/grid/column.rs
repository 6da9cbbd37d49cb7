use std::fmt;
use std::sync::Arc;

use crate::data::row::Row;

/// Render function for computed cells
pub type RenderFn = Arc<dyn Fn(&Row) -> String + Send + Sync>;

/// How a cell's content is derived from its row.
///
/// Only `Field` accessors can be sorted; `Render` output is opaque to the grid.
#[derive(Clone)]
pub enum Accessor {
    Field(String),
    Render(RenderFn),
}

impl Accessor {
    pub fn field(name: impl Into<String>) -> Self {
        Accessor::Field(name.into())
    }

    pub fn render<F>(f: F) -> Self
    where
        F: Fn(&Row) -> String + Send + Sync + 'static,
    {
        Accessor::Render(Arc::new(f))
    }

    /// The field to sort by, or None for render accessors
    pub fn sort_key(&self) -> Option<&str> {
        match self {
            Accessor::Field(name) => Some(name),
            Accessor::Render(_) => None,
        }
    }

    /// Cell text for a row. Missing values become "".
    pub fn cell_text(&self, row: &Row) -> String {
        match self {
            Accessor::Field(name) => row.text(name),
            Accessor::Render(f) => f(row),
        }
    }
}

impl fmt::Debug for Accessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Accessor::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Accessor::Render(_) => f.write_str("Render(<fn>)"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Pad or truncate `text` to exactly `width` characters
    pub fn fit(&self, text: &str, width: usize) -> String {
        let len = text.chars().count();
        if len >= width {
            return truncate_with_ellipsis(text, width);
        }
        let pad = width - len;
        match self {
            Align::Left => format!("{}{}", text, " ".repeat(pad)),
            Align::Right => format!("{}{}", " ".repeat(pad), text),
            Align::Center => {
                let left = pad / 2;
                format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
            }
        }
    }
}

fn truncate_with_ellipsis(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push('…');
    out
}

/// Describes one grid column
#[derive(Debug, Clone)]
pub struct ColumnDescriptor {
    pub id: String,
    pub label: String,
    pub accessor: Accessor,
    /// Fixed width in cells; wins over `flex`
    pub width: Option<u16>,
    pub min_width: Option<u16>,
    pub flex: Option<u16>,
    pub align: Align,
    pub sticky: bool,
}

impl ColumnDescriptor {
    /// Column reading a field of the same name as its id
    pub fn field(id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            accessor: Accessor::Field(id.clone()),
            id,
            label: label.into(),
            width: None,
            min_width: None,
            flex: None,
            align: Align::Left,
            sticky: false,
        }
    }

    /// Column whose cells come from a render function
    pub fn render<F>(id: impl Into<String>, label: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Row) -> String + Send + Sync + 'static,
    {
        Self {
            accessor: Accessor::render(f),
            ..Self::field(id, label)
        }
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn min_width(mut self, min_width: u16) -> Self {
        self.min_width = Some(min_width);
        self
    }

    pub fn flex(mut self, flex: u16) -> Self {
        self.flex = Some(flex);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    pub fn is_sortable(&self) -> bool {
        self.accessor.sort_key().is_some()
    }

    /// Whether this column sizes itself from remaining space
    pub fn is_flex(&self) -> bool {
        self.width.is_none() && self.flex.map(|f| f > 0).unwrap_or(false)
    }

    pub fn cell_text(&self, row: &Row) -> String {
        self.accessor.cell_text(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_accessor_not_sortable() {
        let col = ColumnDescriptor::render("actions", "Actions", |r| format!("[edit {}]", r.id));
        assert!(!col.is_sortable());
        assert_eq!(col.cell_text(&Row::new("4")), "[edit 4]");
    }

    #[test]
    fn test_field_accessor_missing_value() {
        let col = ColumnDescriptor::field("title", "Title");
        assert!(col.is_sortable());
        assert_eq!(col.cell_text(&Row::new("1")), "");
    }

    #[test]
    fn test_width_beats_flex() {
        let col = ColumnDescriptor::field("a", "A").flex(2).width(10);
        assert!(!col.is_flex());
        let col = ColumnDescriptor::field("a", "A").flex(2);
        assert!(col.is_flex());
    }

    #[test]
    fn test_align_fit() {
        assert_eq!(Align::Left.fit("ab", 4), "ab  ");
        assert_eq!(Align::Right.fit("ab", 4), "  ab");
        assert_eq!(Align::Center.fit("ab", 5), " ab  ");
        assert_eq!(Align::Left.fit("abcdef", 4), "abc…");
    }
}
