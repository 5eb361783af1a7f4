//! Base64 text form of a map buffer, for sharing a map as a plain string.
//!
//! The text carries the same bytes as the binary blob, in the same layer
//! order and with no header, so it round-trips only into a map of the same
//! size and orientation.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::map::LayeredMap;

use super::core::PersistenceResult;

pub fn export_text(map: &LayeredMap) -> String {
    STANDARD.encode(map.as_bytes())
}

/// Decode `text` and restore it into `map`, raising one change signal.
///
/// Surrounding whitespace is ignored. Undecodable text, a length mismatch
/// or non-binary wall cells leave the map untouched.
pub fn import_text(map: &mut LayeredMap, text: &str) -> PersistenceResult<()> {
    let bytes = STANDARD.decode(text.trim())?;
    map.restore_bytes(&bytes)
}
