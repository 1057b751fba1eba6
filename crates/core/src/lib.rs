//! Core domain models and services for the adboard analytics backend.

pub mod errors;
pub mod payments;
pub mod stats;
pub mod sync;

pub use errors::{Error, Result};
