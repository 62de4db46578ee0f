//! Persistence behind a narrow load/save interface.
//!
//! The handler never sees a file path: it loads the whole collection, mutates
//! it in memory, and saves the whole collection back. Any key-value backend
//! can stand in for the flat file by implementing [`Storage`].
//!
//! There is deliberately no locking here. Two concurrent writers can
//! interleave their read-modify-write cycles and the slower one silently
//! wins, exactly like the service this replaces.

use crate::employee::EmployeeStore;
use crate::logger;
use std::path::PathBuf;
use tokio::fs;

/// Whole-collection persistence interface.
#[allow(async_fn_in_trait)]
pub trait Storage {
    /// Load the full store. Never fails: an absent, unreadable, empty, or
    /// unparsable backing document is an empty store.
    async fn load(&self) -> EmployeeStore;

    /// Replace the persisted store with `store`, overwriting what was there.
    async fn save(&self, store: &EmployeeStore) -> std::io::Result<()>;
}

/// Flat-file backend: one JSON object on disk, rewritten in full on save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Storage for FileStore {
    async fn load(&self) -> EmployeeStore {
        let Ok(data) = fs::read(&self.path).await else {
            return EmployeeStore::new();
        };
        serde_json::from_slice(&data).unwrap_or_else(|err| {
            logger::log_warning(&format!(
                "Store file {} is not a JSON object ({err}), starting empty",
                self.path.display()
            ));
            EmployeeStore::new()
        })
    }

    async fn save(&self, store: &EmployeeStore) -> std::io::Result<()> {
        let json = serde_json::to_vec(store).map_err(std::io::Error::other)?;
        fs::write(&self.path, json).await
    }
}

/// In-memory backend with the same contract, used by tests and available as
/// the drop-in demonstration that the handler is backend-agnostic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: tokio::sync::Mutex<EmployeeStore>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: EmployeeStore) -> Self {
        Self {
            inner: tokio::sync::Mutex::new(store),
        }
    }
}

impl Storage for MemoryStore {
    async fn load(&self) -> EmployeeStore {
        self.inner.lock().await.clone()
    }

    async fn save(&self, store: &EmployeeStore) -> std::io::Result<()> {
        *self.inner.lock().await = store.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::EmployeeRecord;

    fn temp_store_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "employee-rest-{tag}-{}.json",
            std::process::id()
        ))
    }

    fn sample_store() -> EmployeeStore {
        let mut store = EmployeeStore::new();
        store.insert(
            7,
            EmployeeRecord {
                name: Some("James Bond".to_string()),
                age: Some(27),
            },
        );
        store
    }

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let store = FileStore::new(temp_store_path("missing"));
        assert!(store.load().await.is_empty());
    }

    #[tokio::test]
    async fn test_garbage_file_loads_empty() {
        let path = temp_store_path("garbage");
        fs::write(&path, b"not json at all").await.expect("write");
        let store = FileStore::new(&path);
        assert!(store.load().await.is_empty());
        fs::remove_file(&path).await.expect("cleanup");
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let path = temp_store_path("roundtrip");
        let file = FileStore::new(&path);
        file.save(&sample_store()).await.expect("save");

        // The on-disk form is the documented flat JSON object.
        let raw = fs::read_to_string(&path).await.expect("read");
        assert_eq!(raw, r#"{"7":{"name":"James Bond","age":27}}"#);

        assert_eq!(file.load().await, sample_store());
        fs::remove_file(&path).await.expect("cleanup");
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_contents() {
        let path = temp_store_path("overwrite");
        let file = FileStore::new(&path);
        file.save(&sample_store()).await.expect("save");
        file.save(&EmployeeStore::new()).await.expect("save empty");

        let raw = fs::read_to_string(&path).await.expect("read");
        assert_eq!(raw, "{}");
        fs::remove_file(&path).await.expect("cleanup");
    }

    #[tokio::test]
    async fn test_memory_store_contract_matches() {
        let memory = MemoryStore::new();
        assert!(memory.load().await.is_empty());
        memory.save(&sample_store()).await.expect("save");
        assert_eq!(memory.load().await, sample_store());
    }
}
