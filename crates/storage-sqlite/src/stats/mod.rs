//! Persistence for ingested statistics tables.

mod model;
mod repository;

pub use model::*;
pub use repository::*;
