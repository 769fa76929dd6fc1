// Client-persisted key-value storage (auth token, favorites)

use anyhow::{Context, Result};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::models::Listing;

pub const TOKEN_KEY: &str = "token";
pub const FAVORITES_KEY: &str = "favorites";

// The storage collaborator injected into the API client and the session
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

fn read(entries: &RwLock<HashMap<String, String>>) -> RwLockReadGuard<'_, HashMap<String, String>> {
    entries.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write(entries: &RwLock<HashMap<String, String>>) -> RwLockWriteGuard<'_, HashMap<String, String>> {
    entries.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// --- In-memory store ---

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn with_token(token: &str) -> Self {
        let store = Self::default();
        write(&store.entries).insert(TOKEN_KEY.to_string(), token.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        write(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        write(&self.entries).remove(key);
        Ok(())
    }
}

// --- JSON file store ---

// One JSON object of string values, rewritten on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read store file {}", path.display()))?;
            match serde_json::from_str::<HashMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Store file is malformed, starting empty");
                    HashMap::new()
                }
            }
        } else {
            HashMap::new()
        };

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    fn persist(&self, entries: &HashMap<String, String>) -> Result<()> {
        let content = serde_json::to_string_pretty(entries).context("Failed to encode store")?;
        fs::write(&self.path, content)
            .with_context(|| format!("Failed to write store file {}", self.path.display()))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        read(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = write(&self.entries);
        entries.insert(key.to_string(), value.to_string());
        self.persist(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = write(&self.entries);
        if entries.remove(key).is_some() {
            self.persist(&entries)?;
        }
        Ok(())
    }
}

// --- Favorites ---

// Favorited listing ids, persisted under FAVORITES_KEY as a JSON array
pub struct Favorites {
    store: Arc<dyn KeyValueStore>,
    ids: Vec<String>,
}

impl Favorites {
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let ids = store
            .get(FAVORITES_KEY)
            .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
            .unwrap_or_default();
        Self { store, ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|fav| fav == id)
    }

    // Returns whether the listing is a favorite after the toggle.
    // The in-memory set only changes once the store has accepted it.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let mut next = self.ids.clone();
        let now_favorite = if self.contains(id) {
            next.retain(|fav| fav != id);
            false
        } else {
            next.push(id.to_string());
            true
        };
        let encoded = serde_json::to_string(&next).context("Failed to encode favorites")?;
        self.store.set(FAVORITES_KEY, &encoded)?;
        self.ids = next;
        Ok(now_favorite)
    }

    // Favorited listings in collection order
    pub fn select(&self, listings: &[Listing]) -> Vec<Listing> {
        listings
            .iter()
            .filter(|listing| self.contains(&listing.id))
            .cloned()
            .collect()
    }
}
