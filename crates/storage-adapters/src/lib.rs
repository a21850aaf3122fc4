//! # Storage Adapters
//!
//! Concrete backends for the storage ports in `domains`. The SQLite
//! adapter is the production backend and sits behind the `db-sqlite`
//! feature; the in-memory adapter is always available.

pub mod memory;
#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;
