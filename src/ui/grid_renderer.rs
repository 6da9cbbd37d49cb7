// Draws a GridFrame. Only reads the frame; never touches grid state.
//
// The scrollable body and the pinned column are drawn as two paragraphs.
// Both are skipped into position with the same offset arithmetic: the body
// from the scroll offset, the pinned column from its translation.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::config::config::IconConfig;
use crate::grid::frame::{BodyRow, GridFrame, HeaderCell, TableFrame};
use crate::grid::sort::SortDirection;
use crate::i18n::Translator;
use crate::ui::theme::Palette;

/// Everything the grid renderer needs besides the frame
pub struct GridRenderStyle<'a> {
    pub palette: &'a Palette,
    pub icons: &'a IconConfig,
    pub translator: &'a Translator,
}

/// Lines to skip at the top of a windowed region so that content line
/// `first_top` lands at `translate_y + first_top` on screen.
pub fn window_skip(translate_y: i64, first_top: i64) -> u16 {
    (-translate_y - first_top).clamp(0, u16::MAX as i64) as u16
}

/// Header label with the configured sort glyph
pub fn header_label(cell: &HeaderCell, icons: &IconConfig) -> String {
    match cell.sort {
        Some(SortDirection::Asc) => format!("{} {}", cell.label, icons.sort_asc),
        Some(SortDirection::Desc) => format!("{} {}", cell.label, icons.sort_desc),
        None => cell.label.clone(),
    }
}

/// One text line for a row: cells fitted to their header's width and alignment
pub fn format_cells(cells: &[String], headers: &[HeaderCell]) -> String {
    cells
        .iter()
        .zip(headers)
        .map(|(text, header)| header.align.fit(text, header.width as usize))
        .collect::<Vec<_>>()
        .join(" ")
}

fn header_line(headers: &[HeaderCell], icons: &IconConfig, palette: &Palette) -> Line<'static> {
    let spans: Vec<Span> = headers
        .iter()
        .enumerate()
        .flat_map(|(i, cell)| {
            let text = cell.align.fit(&header_label(cell, icons), cell.width as usize);
            let style = if cell.sort.is_some() {
                palette.header().fg(palette.accent)
            } else {
                palette.header()
            };
            let mut spans = Vec::with_capacity(2);
            if i > 0 {
                spans.push(Span::styled(" ", palette.header()));
            }
            spans.push(Span::styled(text, style));
            spans
        })
        .collect();
    Line::from(spans)
}

fn body_lines(
    rows: &[BodyRow],
    row_height: u16,
    cell_text: impl Fn(&BodyRow) -> String,
    normal: Style,
    selected: Style,
) -> Vec<Line<'static>> {
    let mut lines = Vec::with_capacity(rows.len() * row_height as usize);
    for row in rows {
        let style = if row.selected { selected } else { normal };
        lines.push(Line::styled(cell_text(row), style));
        for _ in 1..row_height {
            lines.push(Line::styled(String::new(), style));
        }
    }
    lines
}

fn first_top(rows: &[BodyRow]) -> i64 {
    rows.first().map(|r| r.top).unwrap_or(0)
}

pub fn render_grid(f: &mut Frame, area: Rect, frame: &GridFrame, title: &str, style: &GridRenderStyle) {
    let palette = style.palette;
    let t = style.translator;

    match frame {
        GridFrame::Loading => {
            let loading = Paragraph::new(format!("{} {}", style.icons.loading, t.t("common.loading")))
                .alignment(Alignment::Center)
                .style(palette.dim())
                .block(bordered(title, palette));
            f.render_widget(loading, area);
        }
        GridFrame::Empty { message, action } => {
            let mut lines = vec![
                Line::from(""),
                Line::styled(format!("{} {}", style.icons.empty, message), palette.base()),
            ];
            if let Some(action) = action {
                lines.push(Line::from(""));
                lines.push(Line::styled(action.clone(), palette.accent()));
            }
            let empty = Paragraph::new(lines)
                .alignment(Alignment::Center)
                .block(bordered(title, palette));
            f.render_widget(empty, area);
        }
        GridFrame::Table(table) => render_table(f, area, table, title, style),
    }
}

fn bordered(title: &str, palette: &Palette) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(title.to_string())
        .style(palette.base())
}

fn render_table(f: &mut Frame, area: Rect, table: &TableFrame, title: &str, style: &GridRenderStyle) {
    let palette = style.palette;

    let mut full_title = title.to_string();
    if table.h_offset > 0 {
        full_title.push_str(" ◀");
    }
    if table.hidden_right > 0 {
        full_title.push_str(" ▶");
    }
    if table.refreshing {
        full_title.push_str(&format!(" {}", style.translator.t("common.refreshing")));
    }

    let block = bordered(&full_title, palette);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let pinned_width = table
        .pinned
        .as_ref()
        .map(|p| p.header.width.saturating_add(1))
        .unwrap_or(0);
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pinned_width), Constraint::Min(0)])
        .split(inner);

    // Scrollable region
    let body_area = columns[1];
    let [header_area, rows_area] = split_header(body_area);
    f.render_widget(
        Paragraph::new(header_line(&table.header, style.icons, palette)),
        header_area,
    );

    let mut lines = body_lines(
        &table.rows,
        table.row_height,
        |row| format_cells(&row.cells, &table.header),
        palette.base(),
        palette.selected(),
    );
    if table.show_footer {
        lines.push(Line::styled(
            style.translator.t("common.loadingMore"),
            palette.dim(),
        ));
    }
    let skip = window_skip(-(table.scroll_offset as i64), first_top(&table.rows));
    f.render_widget(Paragraph::new(lines).scroll((skip, 0)), rows_area);

    // Pinned overlay
    let Some(pinned) = &table.pinned else {
        return;
    };
    let pinned_area = columns[0];
    let [pinned_header_area, pinned_rows_area] = split_header(pinned_area);

    let header = &pinned.header;
    let label = format!("{} {}", style.icons.pin, header_label(header, style.icons));
    let header_text = format!("{}│", header.align.fit(&label, header.width as usize));
    f.render_widget(
        Paragraph::new(Line::styled(header_text, palette.pinned_header())),
        pinned_header_area,
    );

    let width = header.width as usize;
    let mut pinned_lines = body_lines(
        &pinned.rows,
        table.row_height,
        |row| {
            let text = row.cells.first().map(String::as_str).unwrap_or("");
            format!("{}│", header.align.fit(text, width))
        },
        palette.pinned_cell(),
        palette.selected(),
    );
    for _ in 0..pinned.footer_lines {
        pinned_lines.push(Line::styled(format!("{}│", " ".repeat(width)), palette.pinned_cell()));
    }
    let skip = window_skip(pinned.translate_y, first_top(&pinned.rows));
    f.render_widget(Paragraph::new(pinned_lines).scroll((skip, 0)), pinned_rows_area);
}

fn split_header(area: Rect) -> [Rect; 2] {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    [parts[0], parts[1]]
}

/// Lines available for rows inside a grid drawn in `area` (borders + header)
pub fn body_height(area: Rect) -> u32 {
    area.height.saturating_sub(3) as u32
}

/// Columns available for cells inside a grid drawn in `area`
pub fn body_width(area: Rect) -> u16 {
    area.width.saturating_sub(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::column::Align;

    fn header(id: &str, width: u16, align: Align) -> HeaderCell {
        HeaderCell {
            column_id: id.to_string(),
            label: id.to_string(),
            width,
            align,
            sortable: true,
            sort: None,
        }
    }

    #[test]
    fn test_window_skip_matches_for_body_and_pinned() {
        // offset 7, rows of height 2, first windowed row starts at line 6
        let offset = 7u32;
        let body = window_skip(-(offset as i64), 6);
        let pinned = window_skip(-(offset as i64), 6);
        assert_eq!(body, 1);
        assert_eq!(body, pinned);
        assert_eq!(window_skip(0, 0), 0);
    }

    #[test]
    fn test_format_cells() {
        let headers = vec![header("a", 4, Align::Left), header("b", 3, Align::Right)];
        let line = format_cells(&["xy".to_string(), "1".to_string()], &headers);
        assert_eq!(line, "xy     1");
    }

    #[test]
    fn test_header_label_uses_icons() {
        let mut cell = header("title", 10, Align::Left);
        cell.sort = Some(SortDirection::Desc);
        assert_eq!(header_label(&cell, &IconConfig::simple()), "title v");
    }
}
