use anyhow::Result;

use crate::data::crud_item::{CreateCrudItemInput, CrudItem, UpdateCrudItemInput};
use crate::data::query::{Page, PaginationOptions};

/// Trait for the hosted backend holding `crud_items`.
/// Every operation is scoped to the owning user.
///
/// Implementations are blocking; the items service moves calls off the UI
/// thread when a runtime is available.
pub trait CrudBackend: Send + Sync {
    /// Fetch one page starting at `offset`, applying filters and ordering
    fn fetch_page(
        &self,
        user_id: &str,
        offset: usize,
        options: &PaginationOptions,
    ) -> Result<Page<CrudItem>>;

    /// Fetch a single item, None if it does not exist for this user
    fn get_item(&self, item_id: &str, user_id: &str) -> Result<Option<CrudItem>>;

    fn create_item(&self, user_id: &str, input: &CreateCrudItemInput) -> Result<CrudItem>;

    fn update_item(
        &self,
        item_id: &str,
        user_id: &str,
        updates: &UpdateCrudItemInput,
    ) -> Result<CrudItem>;

    fn delete_item(&self, item_id: &str, user_id: &str) -> Result<()>;

    /// Short label shown in the status line
    fn name(&self) -> &str;
}
