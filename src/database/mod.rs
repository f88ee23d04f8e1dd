pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod store;
pub mod string_list;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::{Fault, MemoryStore, RowCounts};
pub use postgres::PgStore;
pub use store::{create_material_tree, delete_material_tree, update_material_tree, CatalogStore, StoreTx};
