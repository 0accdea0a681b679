use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;

use crate::errors::{CounterError, Result};
use crate::state::counters::{CounterKind, CounterMapping};

/// Raw durable storage, one document per counter kind.
///
/// Backends only move bytes in and out. Parsing, repair and the
/// default-zero rules live in [`load_mapping`] and [`save_mapping`] so
/// every backend behaves the same way.
#[async_trait]
pub trait CounterBackend: Send + Sync + 'static {
    /// Returns `None` when nothing has been stored for `kind` yet.
    async fn read(&self, kind: CounterKind) -> Result<Option<Vec<u8>>>;

    /// Replaces the whole document for `kind`.
    async fn write(&self, kind: CounterKind, contents: &[u8]) -> Result<()>;
}

/// Load the mapping for `kind`.
///
/// Missing, blank or unparseable storage (invalid UTF-8 included) is reset
/// to an empty mapping and that empty mapping is persisted before
/// returning. Only I/O failures are surfaced.
pub async fn load_mapping(backend: &dyn CounterBackend, kind: CounterKind) -> Result<CounterMapping> {
    let raw = backend.read(kind).await?;

    let parsed = match raw.as_deref() {
        None => {
            tracing::info!("No {} data found, initializing empty mapping", kind);
            None
        }
        Some(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => {
            tracing::info!("Empty {} data, initializing empty mapping", kind);
            None
        }
        Some(bytes) => match serde_json::from_slice::<CounterMapping>(bytes) {
            Ok(mapping) => Some(mapping),
            Err(source) => {
                let err = CounterError::MalformedStoredData { kind, source };
                tracing::warn!("{err}; resetting to an empty mapping");
                None
            }
        },
    };

    match parsed {
        Some(mapping) => Ok(mapping),
        None => {
            let empty = CounterMapping::new();
            save_mapping(backend, kind, &empty).await?;
            Ok(empty)
        }
    }
}

/// Overwrite the stored mapping for `kind` with `mapping`, pretty-printed.
pub async fn save_mapping(backend: &dyn CounterBackend, kind: CounterKind, mapping: &CounterMapping) -> Result<()> {
    let json = serde_json::to_vec_pretty(mapping).map_err(|e| CounterError::StorageUnavailable {
        kind,
        source: std::io::Error::new(ErrorKind::InvalidData, e),
    })?;

    backend.write(kind, &json).await
}

//
// ─────────────────────────────────────────────────────────────
//  JSON files on disk: <data_dir>/likes.json, views.json, shares.json
// ─────────────────────────────────────────────────────────────
//
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    dir: PathBuf,
}

impl JsonFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, kind: CounterKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }
}

#[async_trait]
impl CounterBackend for JsonFileBackend {
    async fn read(&self, kind: CounterKind) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(kind)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(CounterError::StorageUnavailable { kind, source }),
        }
    }

    async fn write(&self, kind: CounterKind, contents: &[u8]) -> Result<()> {
        let unavailable = |source: std::io::Error| CounterError::StorageUnavailable { kind, source };

        fs::create_dir_all(&self.dir).await.map_err(unavailable)?;

        // Write beside the target and rename over it, so a crash leaves
        // either the previous document or the new one.
        let target = self.path_for(kind);
        let tmp = target.with_extension("json.tmp");
        fs::write(&tmp, contents).await.map_err(unavailable)?;
        fs::rename(&tmp, &target).await.map_err(unavailable)?;

        Ok(())
    }
}

/// In-process backend, used by tests and for throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    docs: RwLock<HashMap<CounterKind, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed raw contents for `kind`, including invalid JSON.
    #[cfg(test)]
    pub async fn put_raw(&self, kind: CounterKind, contents: impl Into<Vec<u8>>) {
        self.docs.write().await.insert(kind, contents.into());
    }
}

#[async_trait]
impl CounterBackend for MemoryBackend {
    async fn read(&self, kind: CounterKind) -> Result<Option<Vec<u8>>> {
        Ok(self.docs.read().await.get(&kind).cloned())
    }

    async fn write(&self, kind: CounterKind, contents: &[u8]) -> Result<()> {
        self.docs.write().await.insert(kind, contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_storage_is_created_empty() {
        let backend = MemoryBackend::new();
        let mapping = load_mapping(&backend, CounterKind::Like).await.unwrap();
        assert!(mapping.is_empty());
        assert_eq!(backend.read(CounterKind::Like).await.unwrap().as_deref(), Some(&b"{}"[..]));
    }

    #[tokio::test]
    async fn blank_and_garbage_are_repaired() {
        let backend = MemoryBackend::new();
        backend.put_raw(CounterKind::Share, "   \n").await;
        backend.put_raw(CounterKind::View, "{not json").await;
        backend.put_raw(CounterKind::Like, r#"{"a": -3}"#).await;

        for kind in CounterKind::ALL {
            assert!(load_mapping(&backend, kind).await.unwrap().is_empty());
            assert_eq!(backend.read(kind).await.unwrap().as_deref(), Some(&b"{}"[..]));
        }
    }

    #[tokio::test]
    async fn non_utf8_file_is_repaired() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        let path = backend.path_for(CounterKind::Share);
        std::fs::write(&path, [0xFF, 0xFE, 0x00, 0x7B]).unwrap();

        assert!(load_mapping(&backend, CounterKind::Share).await.unwrap().is_empty());
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }

    #[tokio::test]
    async fn invalid_utf8_inside_a_key_is_repaired() {
        let backend = MemoryBackend::new();
        backend.put_raw(CounterKind::Like, &b"{\"\xC3\x28\": 1}"[..]).await;

        assert!(load_mapping(&backend, CounterKind::Like).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_backend_roundtrips_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path().join("nested"));

        let mut mapping = CounterMapping::new();
        mapping.insert("42".into(), 3);
        save_mapping(&backend, CounterKind::View, &mapping).await.unwrap();

        let path = backend.path_for(CounterKind::View);
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "{\n  \"42\": 3\n}");
        assert!(!path.with_extension("json.tmp").exists());

        assert_eq!(load_mapping(&backend, CounterKind::View).await.unwrap(), mapping);
    }

    #[tokio::test]
    async fn file_backend_missing_file_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        assert!(backend.read(CounterKind::Share).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unreadable_storage_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::new(dir.path());
        // A directory where the file should be cannot be read as text.
        std::fs::create_dir(backend.path_for(CounterKind::Like)).unwrap();

        let err = load_mapping(&backend, CounterKind::Like).await.unwrap_err();
        assert!(matches!(err, CounterError::StorageUnavailable { kind: CounterKind::Like, .. }));
    }
}
