// Item detail page and the create/edit form

use anyhow::{bail, Result};
use crossterm::event::Event;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::data::crud_item::{
    CreateCrudItemInput, CrudItem, ItemStatus, UpdateCrudItemInput, CRUD_CATEGORIES,
};
use crate::i18n::Translator;
use crate::ui::theme::Palette;

/// Field label and value pairs shown on the detail page
pub fn detail_rows(item: &CrudItem, t: &Translator) -> Vec<(String, String)> {
    vec![
        (t.t("crud.fields.category"), item.category.clone()),
        (t.t("crud.fields.status"), t.t(&format!("crud.statuses.{}", item.status.as_str()))),
        (t.t("crud.fields.created_at"), format_timestamp(&item.created_at)),
        (t.t("crud.fields.updated_at"), format_timestamp(&item.updated_at)),
        ("ID".to_string(), item.id.clone()),
    ]
}

/// RFC 3339 timestamps shown as local "YYYY-MM-DD HH:MM"; anything else unchanged
pub fn format_timestamp(value: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| {
            dt.with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M")
                .to_string()
        })
        .unwrap_or_else(|_| value.to_string())
}

pub fn render_detail(f: &mut Frame, area: Rect, item: &CrudItem, palette: &Palette, t: &Translator) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border())
        .title(item.title.clone())
        .style(palette.base());

    let mut lines = vec![Line::styled(item.title.clone(), palette.header())];
    if let Some(subtitle) = &item.subtitle {
        lines.push(Line::styled(subtitle.clone(), palette.dim()));
    }
    lines.push(Line::from(""));

    for (label, value) in detail_rows(item, t) {
        let value_style = if label == t.t("crud.fields.status") {
            palette.status_style(item.status)
        } else {
            palette.base()
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<14}", label), palette.dim()),
            Span::styled(value, value_style),
        ]));
    }

    if let Some(description) = &item.description {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            t.t("crud.fields.description").to_uppercase(),
            palette.dim(),
        ));
        lines.push(Line::styled(description.clone(), palette.base()));
    }

    lines.push(Line::from(""));
    lines.push(Line::styled(
        format!(
            "e {}   d {}   Esc {}",
            t.t("common.edit"),
            t.t("common.delete"),
            t.t("common.back")
        ),
        palette.accent(),
    ));

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Subtitle,
    Description,
    Category,
    Status,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        FormField::Title,
        FormField::Subtitle,
        FormField::Description,
        FormField::Category,
        FormField::Status,
    ];

    pub fn label_key(&self) -> &'static str {
        match self {
            FormField::Title => "crud.fields.title",
            FormField::Subtitle => "crud.fields.subtitle",
            FormField::Description => "crud.fields.description",
            FormField::Category => "crud.fields.category",
            FormField::Status => "crud.fields.status",
        }
    }
}

/// State of the create/edit form. One text input per field.
pub struct ItemForm {
    pub mode: FormMode,
    inputs: Vec<Input>,
    focus: usize,
    original: Option<CrudItem>,
    pub error: Option<String>,
}

impl ItemForm {
    pub fn create() -> Self {
        let defaults = [
            "",
            "",
            "",
            CRUD_CATEGORIES[CRUD_CATEGORIES.len() - 1],
            ItemStatus::default().as_str(),
        ];
        Self {
            mode: FormMode::Create,
            inputs: defaults.iter().map(|v| Input::new(v.to_string())).collect(),
            focus: 0,
            original: None,
            error: None,
        }
    }

    pub fn edit(item: &CrudItem) -> Self {
        let values = [
            item.title.clone(),
            item.subtitle.clone().unwrap_or_default(),
            item.description.clone().unwrap_or_default(),
            item.category.clone(),
            item.status.as_str().to_string(),
        ];
        Self {
            mode: FormMode::Edit(item.id.clone()),
            inputs: values.into_iter().map(Input::new).collect(),
            focus: 0,
            original: Some(item.clone()),
            error: None,
        }
    }

    pub fn focused(&self) -> FormField {
        FormField::ALL[self.focus]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FormField::ALL.len();
    }

    pub fn previous_field(&mut self) {
        self.focus = (self.focus + FormField::ALL.len() - 1) % FormField::ALL.len();
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Some(input) = self.inputs.get_mut(self.focus) {
            input.handle_event(event);
        }
    }

    pub fn value(&self, field: FormField) -> &str {
        let index = FormField::ALL.iter().position(|f| *f == field).unwrap_or(0);
        self.inputs[index].value()
    }

    pub fn set_value(&mut self, field: FormField, value: &str) {
        if let Some(index) = FormField::ALL.iter().position(|f| *f == field) {
            self.inputs[index] = Input::new(value.to_string());
        }
    }

    fn optional(&self, field: FormField) -> Option<String> {
        let value = self.value(field).trim();
        (!value.is_empty()).then(|| value.to_string())
    }

    fn status(&self) -> Result<ItemStatus> {
        self.value(FormField::Status).trim().parse()
    }

    pub fn to_create_input(&self) -> Result<CreateCrudItemInput> {
        let input = CreateCrudItemInput {
            title: self.value(FormField::Title).trim().to_string(),
            subtitle: self.optional(FormField::Subtitle),
            description: self.optional(FormField::Description),
            category: self.value(FormField::Category).trim().to_string(),
            status: Some(self.status()?),
            image_url: None,
        };
        input.validate()?;
        Ok(input)
    }

    /// Only the fields that differ from the item being edited
    pub fn to_update_input(&self) -> Result<UpdateCrudItemInput> {
        let Some(original) = &self.original else {
            bail!("Form is not editing an item");
        };

        let title = self.value(FormField::Title).trim().to_string();
        if title.is_empty() {
            bail!("Title is required");
        }
        let category = self.value(FormField::Category).trim().to_string();
        let status = self.status()?;
        let subtitle = self.optional(FormField::Subtitle);
        let description = self.optional(FormField::Description);

        Ok(UpdateCrudItemInput {
            title: (title != original.title).then_some(title),
            subtitle: subtitle.filter(|s| Some(s) != original.subtitle.as_ref()),
            description: description.filter(|d| Some(d) != original.description.as_ref()),
            category: (!category.is_empty() && category != original.category).then_some(category),
            status: (status != original.status).then_some(status),
            image_url: None,
        })
    }

    pub fn render(&self, f: &mut Frame, area: Rect, palette: &Palette, t: &Translator) {
        let title = match self.mode {
            FormMode::Create => t.t("crud.create"),
            FormMode::Edit(_) => t.t("crud.update"),
        };
        f.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .title(title)
            .style(palette.base());
        let inner = block.inner(area);
        f.render_widget(block, area);

        let mut constraints: Vec<Constraint> =
            FormField::ALL.iter().map(|_| Constraint::Length(3)).collect();
        constraints.push(Constraint::Min(1));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, field) in FormField::ALL.iter().enumerate() {
            let focused = i == self.focus;
            let input = &self.inputs[i];
            let width = chunks[i].width.saturating_sub(2) as usize;
            let scroll = input.visual_scroll(width);
            let border = if focused {
                palette.accent()
            } else {
                palette.border()
            };
            let widget = Paragraph::new(input.value().to_string())
                .scroll((0, scroll as u16))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(t.t(field.label_key())),
                );
            f.render_widget(widget, chunks[i]);

            if focused {
                let x = chunks[i].x + 1 + (input.visual_cursor().saturating_sub(scroll)) as u16;
                f.set_cursor_position((x, chunks[i].y + 1));
            }
        }

        let hint = match &self.error {
            Some(error) => Line::styled(error.clone(), palette.error()),
            None => Line::styled(
                format!(
                    "Tab next   Enter {}   Esc {}   ({})",
                    t.t("common.save"),
                    t.t("common.cancel"),
                    ItemStatus::ALL.map(|s| s.as_str()).join("/")
                ),
                palette.dim(),
            ),
        };
        if let Some(last) = chunks.last() {
            f.render_widget(Paragraph::new(hint), *last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> CrudItem {
        CrudItem {
            id: "7".to_string(),
            user_id: "u".to_string(),
            title: "Roadmap".to_string(),
            subtitle: Some("Q3".to_string()),
            description: None,
            category: "Product".to_string(),
            status: ItemStatus::Active,
            image_url: None,
            created_at: "2024-01-01T09:00:00Z".to_string(),
            updated_at: "2024-01-01T09:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_create_form_requires_title() {
        let mut form = ItemForm::create();
        assert!(form.to_create_input().is_err());
        form.set_value(FormField::Title, "  Budget  ");
        let input = form.to_create_input().unwrap();
        assert_eq!(input.title, "Budget");
        assert_eq!(input.category, "General");
        assert_eq!(input.status, Some(ItemStatus::Draft));
        assert_eq!(input.subtitle, None);
    }

    #[test]
    fn test_edit_form_sends_only_changes() {
        let mut form = ItemForm::edit(&item());
        assert!(form.to_update_input().unwrap().is_empty());

        form.set_value(FormField::Status, "archived");
        form.set_value(FormField::Title, "Roadmap v2");
        let update = form.to_update_input().unwrap();
        assert_eq!(update.status, Some(ItemStatus::Archived));
        assert_eq!(update.title.as_deref(), Some("Roadmap v2"));
        assert_eq!(update.subtitle, None);
        assert_eq!(update.category, None);
    }

    #[test]
    fn test_invalid_status_rejected() {
        let mut form = ItemForm::edit(&item());
        form.set_value(FormField::Status, "deleted");
        assert!(form.to_update_input().is_err());
    }

    #[test]
    fn test_field_focus_wraps() {
        let mut form = ItemForm::create();
        form.previous_field();
        assert_eq!(form.focused(), FormField::Status);
        form.next_field();
        assert_eq!(form.focused(), FormField::Title);
    }

    #[test]
    fn test_format_timestamp_passthrough() {
        assert_eq!(format_timestamp("not a date"), "not a date");
    }
}
