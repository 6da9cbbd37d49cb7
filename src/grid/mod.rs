//! Column grid with one pinned column kept vertically in step with the body

pub mod column;
pub mod frame;
pub mod layout;
pub mod scroll;
pub mod sort;
pub mod synced_grid;

pub use column::{Accessor, Align, ColumnDescriptor};
pub use frame::{GridFrame, TableFrame};
pub use synced_grid::{GridCallbacks, SyncedGridView};
