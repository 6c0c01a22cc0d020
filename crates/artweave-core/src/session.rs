// Per-session state: a string key-value store standing in for browser session
// storage, the fetch-or-use-cache primitive built on it, and the painting
// selection that feeds the compare request.
//
// Nothing here expires or is invalidated. A `Session` lives exactly as long as
// the flow that owns it.

use std::collections::HashMap;
use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

pub const SETS_KEY: &str = "artweave_sets";
pub const SELECTED_SET_KEY: &str = "artweave_selected_set";
pub const SELECTED_PAINTINGS_KEY: &str = "artweave_selected_paintings";

/// Cache key for the painting list of one set.
pub fn paintings_key(set_id: &str) -> String {
    format!("artweave_paintings:{set_id}")
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to serialize value for session key `{key}`: {source}")]
    Serialize {
        key: String,
        source: serde_json::Error,
    },
}

// ---------------------------------------------------------------------------
// SessionStore
// ---------------------------------------------------------------------------

/// String key-value store holding serialized JSON, one value per key.
#[derive(Debug, Default, Clone)]
pub struct SessionStore {
    entries: HashMap<String, String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn set_raw(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decode the value at `key`. An entry that fails to decode is logged and
    /// reported as absent.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.entries.get(key)?;
        match serde_json::from_str(raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(key, error = %e, "discarding undecodable session entry");
                None
            }
        }
    }

    /// Serialize `value` and store it under `key`, replacing any prior value.
    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), CacheError> {
        let raw = serde_json::to_string(value).map_err(|source| CacheError::Serialize {
            key: key.to_string(),
            source,
        })?;
        self.entries.insert(key.to_string(), raw);
        Ok(())
    }

    /// Return the cached value for `key`, or await `producer`, store its
    /// result, and return that.
    ///
    /// The producer runs at most once per call and only on a miss. Its error
    /// is returned as-is and nothing is stored.
    pub async fn get_or_populate<T, E, F, Fut>(&mut self, key: &str, producer: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        E: From<CacheError>,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(hit) = self.get::<T>(key) {
            debug!(key, "session cache hit");
            return Ok(hit);
        }
        debug!(key, "session cache miss");
        let value = producer().await?;
        self.set(key, &value)?;
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Result of toggling a painting in the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Two paintings are already selected; nothing changed.
    Full,
}

/// Ordered selection of at most two painting ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Selection {
    ids: Vec<String>,
}

impl Selection {
    pub const CAPACITY: usize = 2;

    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from stored ids as-is, without enforcing capacity.
    /// Used to rehydrate whatever was persisted; validity is checked by
    /// [`Selection::pair`].
    pub fn from_ids(ids: Vec<String>) -> Self {
        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|s| s == id)
    }

    pub fn toggle(&mut self, id: &str) -> Toggle {
        if let Some(pos) = self.ids.iter().position(|s| s == id) {
            self.ids.remove(pos);
            return Toggle::Removed;
        }
        if self.ids.len() >= Self::CAPACITY {
            return Toggle::Full;
        }
        self.ids.push(id.to_string());
        Toggle::Added
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// The two ids to compare, in selection order. `None` unless exactly two
    /// distinct ids are held.
    pub fn pair(&self) -> Option<(&str, &str)> {
        match self.ids.as_slice() {
            [a, b] if a != b => Some((a.as_str(), b.as_str())),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Explicit per-session context: the store plus typed accessors for the
/// navigation state kept in it.
#[derive(Debug, Default, Clone)]
pub struct Session {
    store: SessionStore,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a session from an existing store, e.g. one carried over from a
    /// previous walk.
    pub fn with_store(store: SessionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        &mut self.store
    }

    pub fn selected_set(&self) -> Option<String> {
        self.store.get_raw(SELECTED_SET_KEY).map(str::to_string)
    }

    pub fn set_selected_set(&mut self, set_id: &str) {
        self.store.set_raw(SELECTED_SET_KEY, set_id);
    }

    pub fn selection(&self) -> Selection {
        self.store
            .get::<Selection>(SELECTED_PAINTINGS_KEY)
            .unwrap_or_default()
    }

    pub fn set_selection(&mut self, selection: &Selection) -> Result<(), CacheError> {
        self.store.set(SELECTED_PAINTINGS_KEY, selection)
    }

    pub fn clear_selection(&mut self) {
        self.store.remove(SELECTED_PAINTINGS_KEY);
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
