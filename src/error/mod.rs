//! Error module orchestrator.

mod types;

pub use types::{MapError, Result};
