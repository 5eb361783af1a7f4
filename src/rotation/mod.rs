//! Rotation module orchestrator.

mod core;

pub use self::core::{Correction, RotationEngine};
