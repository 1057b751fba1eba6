//! Sqlite persistence for adboard: ingested statistics tables, the sync
//! settings singleton and pipeline payments.
//!
//! Reads go through an r2d2 pool; all writes are serialized through a
//! dedicated writer actor owning its own connection.

pub mod db;
pub mod errors;
pub mod payments;
pub mod schema;
pub mod settings;
pub mod stats;

pub use db::{create_pool, get_connection, run_migrations, spawn_writer, DbPool, WriteHandle};
pub use errors::StorageError;
