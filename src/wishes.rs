//! Birthday wishes left by visitors, persisted in a key-value store
//! (`localStorage` in the browser).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::WishError;

pub const STORAGE_KEY: &str = "dreamBirthdayWishes";
pub const DEFAULT_AUTHOR: &str = "Anonymous Fan";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wish {
    /// Creation time in epoch milliseconds; doubles as the id.
    pub id: i64,
    pub text: String,
    /// Human-readable creation time, formatted by the host.
    pub timestamp: String,
    pub author: String,
}

/// String key-value storage.
pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), WishError>;
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), WishError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Newest-first list of wishes mirrored into the store on every change.
pub struct WishBook<S> {
    store: S,
    wishes: Vec<Wish>,
}

impl<S: KeyValueStore> WishBook<S> {
    /// Missing or unreadable data is treated as an empty book.
    pub fn load(store: S) -> Self {
        let wishes = match store.get_item(STORAGE_KEY) {
            None => Vec::new(),
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|e| {
                log::warn!("wishes: ignoring unreadable saved wishes: {e}");
                Vec::new()
            }),
        };
        Self { store, wishes }
    }

    pub fn wishes(&self) -> &[Wish] {
        &self.wishes
    }

    pub fn len(&self) -> usize {
        self.wishes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wishes.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a wish. The in-memory book keeps it even if persisting fails.
    pub fn add(&mut self, text: &str, id: i64, timestamp: &str) -> Result<&Wish, WishError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(WishError::EmptyText);
        }
        self.wishes.insert(
            0,
            Wish {
                id,
                text: text.to_string(),
                timestamp: timestamp.to_string(),
                author: DEFAULT_AUTHOR.to_string(),
            },
        );
        self.save()?;
        Ok(&self.wishes[0])
    }

    pub fn clear(&mut self) -> Result<(), WishError> {
        self.wishes.clear();
        self.save()
    }

    fn save(&mut self) -> Result<(), WishError> {
        let json = serde_json::to_string(&self.wishes)?;
        self.store.set_item(STORAGE_KEY, &json).inspect_err(|e| {
            log::warn!("wishes: failed to save: {e}");
        })
    }
}
