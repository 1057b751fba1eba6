//! Ingested statistics domain models and the seams the sync orchestrator
//! pulls data through.

mod model;
mod traits;

pub use model::*;
pub use traits::*;
