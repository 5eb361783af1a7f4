use serde_json::Value;
use thiserror::Error;

use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::map::{LayeredMap, MapConfig};

use super::text::{export_text, import_text};

const LOG_TARGET: &str = "wall_grid::store";

pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no value stored under key `{0}`")]
    NotFound(String),
    #[error("stored map is {actual} bytes, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("invalid store key `{0}`")]
    InvalidKey(String),
    #[error("stored map is malformed: {0}")]
    InvalidContents(String),
    #[error("map text is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Byte-level key-value storage consumed by [`PersistenceAdapter`].
///
/// A missing key must surface as [`PersistenceError::NotFound`].
pub trait KeyValueStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> PersistenceResult<()>;

    async fn get(&self, key: &str) -> PersistenceResult<Vec<u8>>;
}

/// Saves and loads a map's backing buffer under one fixed key.
///
/// Bytes are written as-is in the map's current layer order, with no header.
/// A rotated map therefore persists in its rotated layout and must be loaded
/// into a map with the same orientation to read back the same picture.
#[derive(Debug)]
pub struct PersistenceAdapter<S> {
    store: S,
    key: String,
    logger: Option<Logger>,
}

impl<S: KeyValueStore> PersistenceAdapter<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            logger: None,
        }
    }

    pub fn from_config(store: S, config: &MapConfig) -> Self {
        Self::new(store, config.store_key.clone())
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Write the whole buffer under the adapter's key.
    pub async fn try_save(&self, map: &LayeredMap) -> PersistenceResult<()> {
        let bytes = map.as_bytes();
        self.store.put(&self.key, bytes).await?;
        self.log(
            LogLevel::Info,
            "map_saved",
            [
                json_kv("key", self.key.as_str()),
                json_kv("bytes", bytes.len()),
                json_kv("digest", blake3::hash(bytes).to_hex().to_string()),
                json_kv("direction", map.direction().short_name().to_string()),
            ],
        );
        Ok(())
    }

    /// Overwrite the map with the stored bytes and raise one change signal.
    ///
    /// Nothing is written if the fetch fails or the stored length differs
    /// from the map's buffer.
    pub async fn try_load(&self, map: &mut LayeredMap) -> PersistenceResult<()> {
        let bytes = self.store.get(&self.key).await?;
        map.restore_bytes(&bytes)?;
        self.log(
            LogLevel::Info,
            "map_loaded",
            [
                json_kv("key", self.key.as_str()),
                json_kv("bytes", bytes.len()),
                json_kv("digest", blake3::hash(&bytes).to_hex().to_string()),
                json_kv("direction", map.direction().short_name().to_string()),
            ],
        );
        Ok(())
    }

    /// Key the text form is stored under, next to the binary blob.
    pub fn text_key(&self) -> String {
        format!("{}.b64", self.key)
    }

    /// Store the map as base64 text and hand the text back for sharing.
    pub async fn try_save_text(&self, map: &LayeredMap) -> PersistenceResult<String> {
        let text = export_text(map);
        let key = self.text_key();
        self.store.put(&key, text.as_bytes()).await?;
        self.log(
            LogLevel::Info,
            "map_text_saved",
            [json_kv("key", key), json_kv("chars", text.len())],
        );
        Ok(text)
    }

    /// Restore from `text`, or from the stored text form when `None`.
    pub async fn try_load_text(
        &self,
        map: &mut LayeredMap,
        text: Option<&str>,
    ) -> PersistenceResult<()> {
        let source = match text {
            Some(text) => text.to_string(),
            None => {
                let stored = self.store.get(&self.text_key()).await?;
                String::from_utf8(stored).map_err(|err| {
                    PersistenceError::InvalidContents(format!("map text is not UTF-8: {err}"))
                })?
            }
        };
        import_text(map, &source)?;
        self.log(
            LogLevel::Info,
            "map_text_loaded",
            [
                json_kv("key", self.text_key()),
                json_kv("supplied", text.is_some()),
                json_kv("chars", source.len()),
            ],
        );
        Ok(())
    }

    /// Fire-and-forget save: failures are logged, not returned.
    pub async fn save(&self, map: &LayeredMap) -> bool {
        match self.try_save(map).await {
            Ok(()) => true,
            Err(err) => {
                self.log_failure("map_save_failed", &err);
                false
            }
        }
    }

    /// Fire-and-forget load: failures are logged and the map is left as is.
    pub async fn load(&self, map: &mut LayeredMap) -> bool {
        match self.try_load(map).await {
            Ok(()) => true,
            Err(err) => {
                self.log_failure("map_load_failed", &err);
                false
            }
        }
    }

    fn log_failure(&self, message: &str, err: &PersistenceError) {
        self.log(
            LogLevel::Error,
            message,
            [
                json_kv("key", self.key.as_str()),
                json_kv("error", err.to_string()),
            ],
        );
    }

    fn log<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let event = event_with_fields(level, LOG_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }
}
