//! Persistence for pipeline payments (adjacent CRUD, not part of the sync
//! core).

mod repository;

pub use repository::*;
