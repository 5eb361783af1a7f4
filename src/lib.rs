//! Packed multi-layer tile map with wall-preserving rotation.
//!
//! A [`LayeredMap`] keeps three layers in one contiguous buffer: floor cells,
//! horizontal wall segments and vertical wall segments. Neighbouring tiles
//! share the wall cell between them. Quarter turns remap all three layers and
//! swap the wall roles without moving any wall off the edge it separates.
//! The buffer round-trips byte for byte through any [`KeyValueStore`], or
//! as base64 text.
//!
//! Modules follow the `mod core;` plus re-export layout used across the
//! crate, so the public surface is available from the root.

pub mod error;
pub mod geometry;
pub mod grid;
pub mod logging;
pub mod map;
pub mod metrics;
pub mod notify;
pub mod rotation;
pub mod store;

pub use error::{MapError, Result};
pub use geometry::{Direction, Position, Size, Turn};
pub use grid::{GridError, GridView, LayerKind, LayerLayout, LayerRef};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink, NullSink,
};
pub use map::{DEFAULT_STORE_KEY, EMPTY, EditZone, LayeredMap, MapConfig, SOLID, Tile, TileMut};
pub use metrics::{MapMetrics, MetricSnapshot};
pub use notify::{ChangeNotifier, Subscribers, SubscriptionId};
pub use rotation::{Correction, RotationEngine};
pub use store::{
    FileStore, KeyValueStore, MemoryStore, PersistenceAdapter, PersistenceError,
    PersistenceResult, export_text, import_text,
};
