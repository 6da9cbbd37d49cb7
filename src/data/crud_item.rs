use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::row::{CellValue, Row};

/// Category options offered by the create form and the filter bar
pub const CRUD_CATEGORIES: [&str; 8] = [
    "Design",
    "Engineering",
    "Marketing",
    "Product",
    "Research",
    "Finance",
    "Operations",
    "General",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Active,
    Archived,
    Draft,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 3] = [ItemStatus::Active, ItemStatus::Archived, ItemStatus::Draft];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Active => "active",
            ItemStatus::Archived => "archived",
            ItemStatus::Draft => "draft",
        }
    }
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Draft
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "active" => Ok(ItemStatus::Active),
            "archived" => Ok(ItemStatus::Archived),
            "draft" => Ok(ItemStatus::Draft),
            other => Err(anyhow::anyhow!("Unknown item status: {}", other)),
        }
    }
}

/// A record in the `crud_items` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrudItem {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub status: ItemStatus,
    pub image_url: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl CrudItem {
    /// Field names in display order
    pub const FIELDS: [&'static str; 10] = [
        "id",
        "user_id",
        "title",
        "subtitle",
        "description",
        "category",
        "status",
        "image_url",
        "created_at",
        "updated_at",
    ];

    /// Flatten into a grid row keyed by field name
    pub fn to_row(&self) -> Row {
        Row::new(self.id.clone())
            .with("id", self.id.as_str())
            .with("user_id", self.user_id.as_str())
            .with("title", self.title.as_str())
            .with("subtitle", self.subtitle.clone())
            .with("description", self.description.clone())
            .with("category", self.category.as_str())
            .with("status", self.status.as_str())
            .with("image_url", self.image_url.clone())
            .with("created_at", CellValue::DateTime(self.created_at.clone()))
            .with("updated_at", CellValue::DateTime(self.updated_at.clone()))
    }

    /// Value of a single field, as it appears in [`CrudItem::to_row`]
    pub fn field_value(&self, field: &str) -> Option<CellValue> {
        let value = match field {
            "id" => self.id.as_str().into(),
            "user_id" => self.user_id.as_str().into(),
            "title" => self.title.as_str().into(),
            "subtitle" => self.subtitle.clone().into(),
            "description" => self.description.clone().into(),
            "category" => self.category.as_str().into(),
            "status" => self.status.as_str().into(),
            "image_url" => self.image_url.clone().into(),
            "created_at" => CellValue::DateTime(self.created_at.clone()),
            "updated_at" => CellValue::DateTime(self.updated_at.clone()),
            _ => return None,
        };
        Some(value)
    }

    /// Case-insensitive substring match over title, subtitle and description
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let hit = |s: &str| s.to_lowercase().contains(&needle);
        hit(&self.title)
            || self.subtitle.as_deref().map(hit).unwrap_or(false)
            || self.description.as_deref().map(hit).unwrap_or(false)
    }

    /// Apply a partial update, touching only the fields that are present
    pub fn apply_update(&mut self, update: &UpdateCrudItemInput) {
        if let Some(ref title) = update.title {
            self.title = title.clone();
        }
        if let Some(ref subtitle) = update.subtitle {
            self.subtitle = Some(subtitle.clone());
        }
        if let Some(ref description) = update.description {
            self.description = Some(description.clone());
        }
        if let Some(ref category) = update.category {
            self.category = category.clone();
        }
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(ref image_url) = update.image_url {
            self.image_url = Some(image_url.clone());
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateCrudItemInput {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CreateCrudItemInput {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.title.trim().is_empty() {
            anyhow::bail!("Title is required");
        }
        if self.category.trim().is_empty() {
            anyhow::bail!("Category is required");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateCrudItemInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ItemStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl UpdateCrudItemInput {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CrudItem {
        CrudItem {
            id: "1".into(),
            user_id: "u".into(),
            title: "Quarterly Report".into(),
            subtitle: Some("Finance review".into()),
            description: None,
            category: "Finance".into(),
            status: ItemStatus::Active,
            image_url: None,
            created_at: "2024-01-01T00:00:00Z".into(),
            updated_at: "2024-01-01T00:00:00Z".into(),
        }
    }

    #[test]
    fn test_status_serde_lowercase() {
        let json = serde_json::to_string(&ItemStatus::Archived).unwrap();
        assert_eq!(json, "\"archived\"");
        assert_eq!("Draft".parse::<ItemStatus>().unwrap(), ItemStatus::Draft);
        assert!("deleted".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_search_matches_subtitle_case_insensitive() {
        let item = sample();
        assert!(item.matches_search("REVIEW"));
        assert!(item.matches_search("quarter"));
        assert!(!item.matches_search("marketing"));
    }

    #[test]
    fn test_update_input_skips_absent_fields() {
        let update = UpdateCrudItemInput {
            status: Some(ItemStatus::Archived),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({"status": "archived"}));

        let mut item = sample();
        item.apply_update(&update);
        assert_eq!(item.status, ItemStatus::Archived);
        assert_eq!(item.title, "Quarterly Report");
    }

    #[test]
    fn test_to_row_nulls() {
        let row = sample().to_row();
        assert_eq!(row.id, "1");
        assert_eq!(row.get("description"), Some(&CellValue::Null));
        assert_eq!(row.text("status"), "active");
    }

    #[test]
    fn test_field_value_agrees_with_row() {
        let item = sample();
        let row = item.to_row();
        for field in row.fields.keys() {
            assert_eq!(item.field_value(field).as_ref(), row.get(field), "{}", field);
        }
        assert_eq!(item.field_value("rating"), None);
    }

    #[test]
    fn test_create_validation() {
        assert!(CreateCrudItemInput::new("  ", "General").validate().is_err());
        assert!(CreateCrudItemInput::new("Title", "General").validate().is_ok());
    }
}
