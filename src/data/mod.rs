//! Data layer: rows, the de-duplicated row set, the CRUD domain and backends
//!
//! Rows flow from a `CrudBackend` page into `RowSet` and from there into the
//! grid or list views.

pub mod backend;
pub mod crud_item;
pub mod memory_backend;
pub mod query;
pub mod rest_backend;
pub mod row;
pub mod row_set;
pub mod value_compare;
