pub mod config_io;
pub mod persistence;
pub mod recovery;
pub mod storage;

pub use persistence::{PersistenceAdapter, Snapshot};
pub use storage::{DirStore, KeyValueStore, MemoryStore, StorageError};
