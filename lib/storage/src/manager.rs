use crate::import::{import_dataset, ImportReport};
use crate::lmdb_storage::LmdbStorage;
use crate::memory::MemoryStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use webfilmz_core::{Error, Result, Store};

/// Owns the storage backend shared by the engine, the ranker and the API
pub struct StorageManager {
    store: Arc<dyn Store>,
    data_dir: Option<PathBuf>,
}

impl StorageManager {
    /// Open (or create) an LMDB store under `<data_dir>/lmdb`
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let lmdb_path = data_dir.join("lmdb");
        let lmdb = LmdbStorage::new(&lmdb_path)
            .map_err(|e| Error::Storage(e.to_string()))?;
        info!(path = ?lmdb_path, "LMDB storage opened");

        Ok(Self {
            store: Arc::new(lmdb),
            data_dir: Some(data_dir),
        })
    }

    /// A store that lives only as long as the process
    pub fn in_memory() -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            data_dir: None,
        }
    }

    #[inline]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    #[inline]
    pub fn shared_store(&self) -> Arc<dyn Store> {
        self.store.clone()
    }

    #[inline]
    #[must_use]
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Import `movies.dat` and `user_ratedmovies.dat` from `dataset_dir`
    pub fn import<P: AsRef<Path>>(&self, dataset_dir: P) -> Result<ImportReport> {
        import_dataset(dataset_dir.as_ref(), self.store())
    }
}
