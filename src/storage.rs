//! Key-value persistence for the template and the name position.
//!
//! Records are stored as JSON text under fixed keys, the same layout the
//! browser build writes into `localStorage`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::StorageError;
use crate::position::NamePosition;

pub const TEMPLATE_KEY: &str = "certificateTemplate";
pub const POSITION_KEY: &str = "certificateNamePosition";

/// A string-keyed, string-valued store.
pub trait KeyValueStore {
    /// # Errors
    /// Backend read failures.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// # Errors
    /// Backend write failures, including running out of space.
    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Short human readable description, used in logs.
    fn describe(&self) -> String;
}

/// The persisted form of an uploaded template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRecord {
    pub data_url: String,
    pub width: u32,
    pub height: u32,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
}

pub fn now_millis() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Build a [`TemplateRecord`] stamped with the current time and write it under [`TEMPLATE_KEY`].
///
/// # Errors
/// Whatever the store reports, e.g. [`StorageError::QuotaExceeded`].
pub fn save_template(
    store: &mut dyn KeyValueStore,
    data_url: &str,
    width: u32,
    height: u32,
) -> Result<TemplateRecord, StorageError> {
    let record = TemplateRecord {
        data_url: data_url.to_owned(),
        width,
        height,
        timestamp: now_millis(),
    };
    let json = serde_json::to_string(&record)?;
    store.set_item(TEMPLATE_KEY, &json)?;
    log::info!("Template saved successfully ({}x{})", width, height);
    Ok(record)
}

/// # Errors
/// Backend failures, or [`StorageError::Json`] for a corrupt record.
pub fn load_template(store: &dyn KeyValueStore) -> Result<Option<TemplateRecord>, StorageError> {
    load_json(store, TEMPLATE_KEY)
}

/// # Errors
/// Whatever the store reports.
pub fn save_position(store: &mut dyn KeyValueStore, position: NamePosition) -> Result<(), StorageError> {
    let json = serde_json::to_string(&position)?;
    store.set_item(POSITION_KEY, &json)?;
    log::info!("Name position saved at ({}, {})", position.x, position.y);
    Ok(())
}

/// # Errors
/// Backend failures, or [`StorageError::Json`] for a corrupt record.
pub fn load_position(store: &dyn KeyValueStore) -> Result<Option<NamePosition>, StorageError> {
    load_json(store, POSITION_KEY)
}

fn load_json<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get_item(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// In-memory store with an optional capacity in bytes (keys plus values).
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: BTreeMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: BTreeMap::new(),
            quota: Some(quota),
        }
    }

    fn used_without(&self, key: &str) -> usize {
        self.items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let needed = self.used_without(key) + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.items.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_owned()
    }
}

/// One `<key>.json` file per key inside a directory.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("files in {}", self.dir.display())
    }
}

/// The browser's `window.localStorage`.
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// # Errors
    /// [`StorageError::Backend`] when there is no window or storage is disabled.
    pub fn new() -> Result<Self, StorageError> {
        let window = web_sys::window()
            .ok_or_else(|| StorageError::Backend("No window object available".to_owned()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Backend(format!("localStorage access error: {e:?}")))?
            .ok_or_else(|| StorageError::Backend("localStorage not available".to_owned()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("Failed to read from localStorage: {e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // QuotaExceededError surfaces here
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("Failed to save to localStorage: {e:?}")))
    }

    fn describe(&self) -> String {
        "localStorage".to_owned()
    }
}
