//! Parcel table boundary.
//!
//! Pure CRUD primitives over the `parcel` table. Nothing here validates input
//! or interprets lifecycle rules; that is the job of `ParcelService`.

pub mod in_memory;
pub mod schema;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryParcelStore;
pub use sqlite::SqliteParcelStore;
pub use r#trait::{NewParcelRow, ParcelRow, ParcelStore, ParcelStoreError};
