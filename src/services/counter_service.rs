use std::sync::Arc;

use tokio::sync::Mutex;

use crate::errors::Result;
use crate::persistence::{load_mapping, save_mapping, CounterBackend};
use crate::state::counters::{count_of, Count, CounterKind, CounterMapping, ItemId};

/// Counter operations over a [`CounterBackend`].
///
/// Every call reloads the mapping from storage and writes it back in full.
/// Calls on the same kind are serialized by a per-kind lock so concurrent
/// increments are never lost; different kinds do not contend.
#[derive(Clone)]
pub struct CounterStore {
    backend: Arc<dyn CounterBackend>,
    locks: Arc<[Mutex<()>; 3]>,
}

impl CounterStore {
    pub fn new(backend: Arc<dyn CounterBackend>) -> Self {
        Self {
            backend,
            locks: Arc::new([Mutex::new(()), Mutex::new(()), Mutex::new(())]),
        }
    }

    pub async fn load(&self, kind: CounterKind) -> Result<CounterMapping> {
        let _guard = self.locks[kind.index()].lock().await;
        load_mapping(self.backend.as_ref(), kind).await
    }

    #[cfg(test)]
    pub async fn save(&self, kind: CounterKind, mapping: &CounterMapping) -> Result<()> {
        let _guard = self.locks[kind.index()].lock().await;
        save_mapping(self.backend.as_ref(), kind, mapping).await
    }

    pub async fn get(&self, kind: CounterKind, id: &ItemId) -> Result<Count> {
        let mapping = self.load(kind).await?;
        Ok(count_of(&mapping, id))
    }

    pub async fn increment(&self, kind: CounterKind, id: &ItemId) -> Result<Count> {
        self.update(kind, id, |n| n.saturating_add(1)).await
    }

    /// Floors at zero.
    pub async fn decrement(&self, kind: CounterKind, id: &ItemId) -> Result<Count> {
        self.update(kind, id, |n| n.saturating_sub(1)).await
    }

    async fn update(&self, kind: CounterKind, id: &ItemId, f: impl FnOnce(Count) -> Count) -> Result<Count> {
        let _guard = self.locks[kind.index()].lock().await;

        let mut mapping = load_mapping(self.backend.as_ref(), kind).await?;
        let next = f(count_of(&mapping, id));
        mapping.insert(id.as_str().to_string(), next);
        save_mapping(self.backend.as_ref(), kind, &mapping).await?;

        tracing::debug!("{} for {} is now {}", kind, id, next);
        Ok(next)
    }
}
