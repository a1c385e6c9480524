//! Reducer persistence over an external key-value store.
//!
//! [`Persisted`] wraps a reducer: the first call (absent prior state) tries
//! to hydrate from the store, and every reduced state is written back as
//! JSON under the wrapper's key.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::store::Reducer;

/// External durable key-value collaborator.
///
/// Implementations must not fail for absent keys. Write failures are the
/// implementation's to report (typically by logging); the caller treats
/// writes as best-effort.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: String);
    fn remove(&self, key: &str);
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("No stored value under '{key}'")]
    Missing { key: String },

    #[error("Failed to decode stored value under '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode state for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reducer wrapper with hydrate-on-first-read and write-on-every-reduce.
pub struct Persisted<R> {
    inner: R,
    key: String,
    storage: Arc<dyn KeyValueStore>,
}

/// Wrap `reducer` so its state is persisted under `key` in `storage`.
pub fn persisted<R>(
    reducer: R,
    key: impl Into<String>,
    storage: Arc<dyn KeyValueStore>,
) -> Persisted<R>
where
    R: Reducer,
    R::State: Serialize + DeserializeOwned,
{
    Persisted {
        inner: reducer,
        key: key.into(),
        storage,
    }
}

impl<R> Persisted<R>
where
    R: Reducer,
    R::State: Serialize + DeserializeOwned,
{
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Read and decode the stored state.
    pub fn hydrate(&self) -> Result<Arc<R::State>, PersistError> {
        let blob = self.storage.get(&self.key).ok_or_else(|| PersistError::Missing {
            key: self.key.clone(),
        })?;
        let state = serde_json::from_str(&blob).map_err(|source| PersistError::Decode {
            key: self.key.clone(),
            source,
        })?;
        Ok(Arc::new(state))
    }

    /// Encode `state` and hand it to the store.
    pub fn write(&self, state: &R::State) -> Result<(), PersistError> {
        let blob = serde_json::to_string(state).map_err(|source| PersistError::Encode {
            key: self.key.clone(),
            source,
        })?;
        self.storage.set(&self.key, blob);
        Ok(())
    }
}

impl<R> Reducer for Persisted<R>
where
    R: Reducer,
    R::State: Serialize + DeserializeOwned,
{
    type State = R::State;
    type Action = R::Action;

    fn reduce(&self, state: Option<&Arc<R::State>>, action: &R::Action) -> Arc<R::State> {
        if state.is_none() {
            match self.hydrate() {
                Ok(hydrated) => {
                    debug!(key = %self.key, "hydrated state");
                    return hydrated;
                }
                // Corrupt or missing blobs fall back to the reducer default.
                Err(err) => debug!(key = %self.key, error = %err, "hydration skipped"),
            }
        }

        let next = self.inner.reduce(state, action);
        if let Err(err) = self.write(&next) {
            warn!(key = %self.key, error = %err, "failed to persist state");
        }
        next
    }
}
