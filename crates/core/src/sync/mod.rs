//! Sync orchestration: single-flight run execution, status tracking,
//! persisted trigger settings and the time-of-day scheduler.

mod model;
mod orchestrator;
mod scheduler;
mod settings;

pub use model::*;
pub use orchestrator::*;
pub use scheduler::*;
pub use settings::*;

#[cfg(test)]
mod tests;
