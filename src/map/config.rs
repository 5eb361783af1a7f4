use serde::{Deserialize, Serialize};

use crate::error::{MapError, Result};
use crate::geometry::Size;
use crate::grid::{GridError, LayerKind};
use crate::store::PersistenceError;

/// Store key used when none is configured.
pub const DEFAULT_STORE_KEY: &str = "tr_map";

/// Construction and persistence settings for a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Width in tiles.
    pub width: u32,
    /// Height in tiles.
    pub height: u32,
    /// Value every wall cell starts with.
    pub initial_wall: u8,
    /// Value every floor cell starts with.
    pub initial_floor: u8,
    /// Key the persistence adapter saves under.
    pub store_key: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 10,
            height: 10,
            initial_wall: 1,
            initial_floor: 0,
            store_key: DEFAULT_STORE_KEY.to_string(),
        }
    }
}

impl MapConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn with_initial_wall(mut self, value: u8) -> Self {
        self.initial_wall = value;
        self
    }

    pub fn with_initial_floor(mut self, value: u8) -> Self {
        self.initial_floor = value;
        self
    }

    pub fn with_store_key(mut self, key: impl Into<String>) -> Self {
        self.store_key = key.into();
        self
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(MapError::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !LayerKind::WallH.accepts(self.initial_wall) {
            return Err(GridError::InvalidValue {
                layer: LayerKind::WallH,
                value: self.initial_wall,
            }
            .into());
        }
        if self.store_key.is_empty() {
            return Err(PersistenceError::InvalidKey(self.store_key.clone()).into());
        }
        Ok(())
    }

    /// Parse and validate a JSON document. Missing fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_reference_map() {
        let config = MapConfig::default();
        assert_eq!(config.size(), Size::new(10, 10));
        assert_eq!(config.initial_wall, 1);
        assert_eq!(config.initial_floor, 0);
        assert_eq!(config.store_key, "tr_map");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config = MapConfig::from_json_str(r#"{ "width": 4, "height": 3 }"#).unwrap();
        assert_eq!(config.size(), Size::new(4, 3));
        assert_eq!(config.store_key, DEFAULT_STORE_KEY);
    }

    #[test]
    fn json_round_trips() {
        let config = MapConfig::new(6, 2)
            .with_initial_wall(0)
            .with_initial_floor(3)
            .with_store_key("level_one");
        let json = config.to_json_string().unwrap();
        assert_eq!(MapConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(matches!(
            MapConfig::new(0, 5).validate(),
            Err(MapError::InvalidDimensions { width: 0, height: 5 })
        ));
        assert!(matches!(
            MapConfig::default().with_initial_wall(2).validate(),
            Err(MapError::Grid(GridError::InvalidValue { value: 2, .. }))
        ));
        assert!(matches!(
            MapConfig::default().with_store_key("").validate(),
            Err(MapError::Persistence(PersistenceError::InvalidKey(_)))
        ));
        assert!(matches!(
            MapConfig::from_json_str("{ not json"),
            Err(MapError::Config(_))
        ));
    }
}
