use crate::errors::StoreError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};
use tokio::{fs, sync::Mutex};
use tracing::{debug, error};

/// Whole-file key-value document: one entry per resource, each holding the
/// full JSON record array.
pub type Document = BTreeMap<String, Value>;

/// Key-value store backing the local record stores. With a path it is
/// durable (rewritten on every change); without one it only lives in
/// memory.
#[derive(Debug)]
pub struct KeyValueStore {
    path: Option<PathBuf>,
    entries: Mutex<Document>,
}

impl KeyValueStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: Mutex::new(Document::new()),
        }
    }

    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load_document(&path).await;
        Self {
            path: Some(path),
            entries: Mutex::new(entries),
        }
    }

    pub fn is_durable(&self) -> bool {
        self.path.is_some()
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, StoreError> {
        let entries = self.entries.lock().await;
        decode(&entries, key)
    }

    pub async fn put<T: Serialize>(&self, key: &str, records: &[T]) -> Result<(), StoreError> {
        self.modify(key, |current: &mut Vec<Value>| {
            *current = records
                .iter()
                .map(serde_json::to_value)
                .collect::<Result<_, _>>()
                .map_err(StoreError::storage)?;
            Ok(())
        })
        .await
    }

    /// Runs `change` against the decoded array under the store lock and
    /// persists the result. Nothing is written if `change` fails.
    pub async fn modify<T, F, O>(&self, key: &str, change: F) -> Result<O, StoreError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> Result<O, StoreError>,
    {
        let mut entries = self.entries.lock().await;
        let mut records: Vec<T> = decode(&entries, key)?;
        let output = change(&mut records)?;

        let value = serde_json::to_value(&records).map_err(StoreError::storage)?;
        let previous = entries.insert(key.to_string(), value);
        if let Some(path) = &self.path {
            if let Err(err) = persist_document(path, &entries).await {
                match previous {
                    Some(previous) => entries.insert(key.to_string(), previous),
                    None => entries.remove(key),
                };
                return Err(err);
            }
            debug!(key, path = %path.display(), "local store persisted");
        }
        Ok(output)
    }
}

fn decode<T: DeserializeOwned>(entries: &Document, key: &str) -> Result<Vec<T>, StoreError> {
    match entries.get(key) {
        Some(value) => Vec::<T>::deserialize(value).map_err(StoreError::storage),
        None => Ok(Vec::new()),
    }
}

pub async fn load_document(path: &Path) -> Document {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(document) => document,
            Err(err) => {
                error!("failed to parse data file: {err}");
                Document::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Document::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            Document::default()
        }
    }
}

pub async fn persist_document(path: &Path, document: &Document) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(document).map_err(StoreError::storage)?;
    fs::write(path, payload).await.map_err(StoreError::storage)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_path(label: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!(
            "sales_ledger_{label}_{}_{nanos}.json",
            std::process::id()
        ))
    }

    #[tokio::test]
    async fn durable_store_survives_reopen() {
        let path = unique_path("kv_reopen");
        let store = KeyValueStore::open(&path).await;
        store.put("numbers", &[1u32, 2, 3]).await.unwrap();

        let reopened = KeyValueStore::open(&path).await;
        let numbers: Vec<u32> = reopened.get("numbers").await.unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_empty() {
        let path = unique_path("kv_corrupt");
        std::fs::write(&path, b"{ not json").unwrap();
        let store = KeyValueStore::open(&path).await;
        let values: Vec<u32> = store.get("anything").await.unwrap();
        assert!(values.is_empty());
        let _ = std::fs::remove_file(path);
    }

    #[tokio::test]
    async fn failed_change_leaves_entry_untouched() {
        let store = KeyValueStore::in_memory();
        store.put("names", &["a".to_string()]).await.unwrap();
        let result: Result<(), _> = store
            .modify("names", |names: &mut Vec<String>| {
                names.clear();
                Err(StoreError::validation("nope"))
            })
            .await;
        assert!(result.is_err());
        let names: Vec<String> = store.get("names").await.unwrap();
        assert_eq!(names, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn unwritable_path_rolls_back() {
        let dir = unique_path("kv_dir");
        std::fs::create_dir_all(&dir).unwrap();
        let store = KeyValueStore::open(&dir).await;
        let result = store.put("numbers", &[1u32]).await;
        assert!(matches!(result, Err(StoreError::Storage(_))));
        let numbers: Vec<u32> = store.get("numbers").await.unwrap();
        assert!(numbers.is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }
}
