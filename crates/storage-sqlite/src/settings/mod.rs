//! Persistence for the sync settings singleton row.

mod repository;

pub use repository::*;
