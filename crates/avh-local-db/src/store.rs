//! Injectable slot stores
//!
//! A slot holds one JSON document. Writes replace the whole document, so the
//! last writer wins.

use crate::connection::Database;
use crate::models::KvStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Mutex;

/// Named-slot persistence used by the local mock.
pub trait KeyValueStore: Send + Sync {
    /// Raw document stored under `key`, if any.
    fn read(&self, key: &str) -> crate::Result<Option<String>>;

    /// Replace the document stored under `key`.
    fn write(&self, key: &str, value: &str) -> crate::Result<()>;

    fn contains(&self, key: &str) -> crate::Result<bool> {
        Ok(self.read(key)?.is_some())
    }
}

/// Typed JSON access on top of any [`KeyValueStore`].
pub trait KeyValueStoreExt: KeyValueStore {
    fn read_json<T: DeserializeOwned>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.read(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| crate::Error::serde(key, e)),
            None => Ok(None),
        }
    }

    /// Decode the slot, falling back to `T::default()` when it is empty.
    fn read_json_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> crate::Result<T> {
        Ok(self.read_json(key)?.unwrap_or_default())
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> crate::Result<()> {
        let raw = serde_json::to_string(value).map_err(|e| crate::Error::serde(key, e))?;
        self.write(key, &raw)
    }

    /// Write `value` only when the slot is still empty. Returns whether it wrote.
    fn seed_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> crate::Result<bool> {
        if self.contains(key)? {
            return Ok(false);
        }
        self.write_json(key, value)?;
        Ok(true)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStoreExt for S {}

/// Slots persisted in the SQLite `kv` table under one scope.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: Database,
    scope: String,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self::with_scope(db, crate::DEFAULT_SCOPE)
    }

    pub fn with_scope(db: Database, scope: impl Into<String>) -> Self {
        Self {
            db,
            scope: scope.into(),
        }
    }

    /// Slot names currently stored under this scope.
    pub fn keys(&self) -> crate::Result<Vec<String>> {
        let conn = self.db.lock()?;
        KvStore::new(&conn).keys(&self.scope)
    }
}

impl KeyValueStore for SqliteStore {
    fn read(&self, key: &str) -> crate::Result<Option<String>> {
        let conn = self.db.lock()?;
        KvStore::new(&conn).get(&self.scope, key)
    }

    fn write(&self, key: &str, value: &str) -> crate::Result<()> {
        let conn = self.db.lock()?;
        KvStore::new(&conn).set(&self.scope, key, Some(value))
    }
}

/// Process-local store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> crate::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|e| crate::Error::generic(format!("Failed to acquire store lock: {}", e)))
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> crate::Result<Option<String>> {
        Ok(self.slots()?.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> crate::Result<()> {
        self.slots()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Row {
        id: String,
    }

    fn exercise(store: &dyn KeyValueStore) {
        assert!(!store.contains("rows").unwrap());
        let rows: Vec<Row> = store.read_json_or_default("rows").unwrap();
        assert!(rows.is_empty());

        let seeded = vec![Row { id: "1".into() }];
        assert!(store.seed_json("rows", &seeded).unwrap());
        assert!(!store.seed_json("rows", &Vec::<Row>::new()).unwrap());

        let rows: Vec<Row> = store.read_json_or_default("rows").unwrap();
        assert_eq!(rows, seeded);
    }

    #[test]
    fn test_memory_store() {
        exercise(&MemoryStore::new());
    }

    #[test]
    fn test_sqlite_store() {
        exercise(&SqliteStore::new(Database::open_in_memory().unwrap()));
    }

    #[test]
    fn test_sqlite_store_persists_across_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state.db");
        {
            let store = SqliteStore::new(Database::open(&path).unwrap());
            store.write_json("ia_spiders", &vec![Row { id: "301".into() }]).unwrap();
        }
        let store = SqliteStore::new(Database::open(&path).unwrap());
        let rows: Vec<Row> = store.read_json_or_default("ia_spiders").unwrap();
        assert_eq!(rows, vec![Row { id: "301".into() }]);
        assert_eq!(store.keys().unwrap(), vec!["ia_spiders".to_string()]);
    }

    #[test]
    fn test_corrupt_slot_reports_key() {
        let store = MemoryStore::new();
        store.write("ia_datasets", "{not json").unwrap();
        let err = store.read_json::<Vec<Row>>("ia_datasets").unwrap_err();
        assert!(matches!(err, crate::Error::Serde { ref key, .. } if key == "ia_datasets"));
    }
}
