pub mod db;
pub mod sqlite_store;

pub use sqlite_store::{SqliteDeviceStore, SqliteItemStore};
