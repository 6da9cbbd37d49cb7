use comfy_table::{Attribute, Cell, ContentArrangement, Table};
use crossterm::style::Stylize;

use crud_grid::data::crud_item::CrudItem;
use crud_grid::i18n::Translator;

/// Columns printed by `list`, as (field, label key)
const LIST_COLUMNS: [(&str, &str); 5] = [
    ("title", "crud.fields.title"),
    ("status", "crud.fields.status"),
    ("category", "crud.fields.category"),
    ("subtitle", "crud.fields.subtitle"),
    ("created_at", "crud.fields.created_at"),
];

pub fn display_items(items: &[CrudItem], total: usize, t: &Translator) {
    if items.is_empty() {
        println!("{}", t.t("crud.empty").yellow());
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut headers = vec![Cell::new("ID").add_attribute(Attribute::Bold)];
    headers.extend(
        LIST_COLUMNS
            .iter()
            .map(|(_, key)| Cell::new(t.t(key)).add_attribute(Attribute::Bold)),
    );
    table.set_header(headers);

    for item in items {
        let row = item.to_row();
        let mut cells = vec![item.id.clone()];
        cells.extend(LIST_COLUMNS.iter().map(|(field, _)| row.text(field)));
        table.add_row(cells);
    }

    println!("{table}");
    let count = items.len().to_string();
    let total = total.to_string();
    println!(
        "\n{}",
        t.t_with(
            "crud.count",
            &[("count", count.as_str()), ("total", total.as_str())]
        )
        .green()
    );
}
