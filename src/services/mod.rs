// Services layer - moves data access out of the TUI
pub mod crud_items_service;

pub use crud_items_service::{CrudItemsService, ServiceEvent};
