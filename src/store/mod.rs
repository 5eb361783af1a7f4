mod core;
mod file;
mod memory;
mod text;

pub use self::core::{KeyValueStore, PersistenceAdapter, PersistenceError, PersistenceResult};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use text::{export_text, import_text};
