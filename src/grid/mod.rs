//! Grid module orchestrator.
//!
//! Callers import layer types from here; the view arithmetic lives in `view`
//! and the buffer partitioning in `layer`.

mod layer;
mod view;

pub use layer::{LayerKind, LayerLayout};
pub use view::{GridError, GridView, LayerRef};
