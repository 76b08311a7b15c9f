pub mod manager;
pub mod memory;
pub mod lmdb_storage;
pub mod import;

pub use manager::StorageManager;
pub use memory::MemoryStore;
pub use lmdb_storage::LmdbStorage;
pub use import::{import_dataset, ImportReport};
