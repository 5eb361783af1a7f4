mod config;
mod core;
mod tile;

pub use self::core::LayeredMap;
pub use config::{DEFAULT_STORE_KEY, MapConfig};
pub use tile::{EMPTY, EditZone, SOLID, Tile, TileMut};
