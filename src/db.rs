use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

/// Durable last-write-wins key-value storage.
pub trait KeyValueStore {
    fn load(&self, key: &str) -> crate::error::Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> crate::error::Result<()>;
    /// Returns whether the key existed.
    fn remove(&self, key: &str) -> crate::error::Result<bool>;

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> crate::error::Result<Option<T>> {
        match self.load(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_json<T: Serialize>(&self, key: &str, value: &T) -> crate::error::Result<()> {
        let raw = serde_json::to_string(value)?;
        self.save(key, &raw)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn load(&self, key: &str) -> crate::error::Result<Option<String>> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> crate::error::Result<()> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> crate::error::Result<bool> {
        (**self).remove(key)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoredKey {
    pub key: String,
    pub bytes: i64,
    pub updated_at: String,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    pub fn delete(&self, key: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }

    pub fn list_keys(&self) -> Result<Vec<StoredKey>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, length(CAST(value AS BLOB)), updated_at FROM kv ORDER BY key")?;

        let rows = stmt.query_map([], |row| {
            Ok(StoredKey {
                key: row.get(0)?,
                bytes: row.get(1)?,
                updated_at: row.get(2)?,
            })
        })?;
        rows.collect()
    }
}

impl KeyValueStore for Database {
    fn load(&self, key: &str) -> crate::error::Result<Option<String>> {
        Ok(self.get(key)?)
    }

    fn save(&self, key: &str, value: &str) -> crate::error::Result<()> {
        tracing::trace!(key, bytes = value.len(), "persisting key");
        Ok(self.set(key, value)?)
    }

    fn remove(&self, key: &str) -> crate::error::Result<bool> {
        Ok(self.delete(key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_db() -> Database {
        let db = Database::open(":memory:").expect("Failed to create in-memory database");
        db.init().expect("Failed to initialize database");
        db
    }

    mod init_tests {
        use super::*;

        #[test]
        fn init_creates_table() {
            let db = setup_db();
            let count: i64 = db
                .conn
                .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0);
        }

        #[test]
        fn init_is_idempotent() {
            let db = setup_db();
            db.set("studyPlan", "{}").unwrap();
            db.init().unwrap();
            assert_eq!(db.get("studyPlan").unwrap(), Some("{}".to_string()));
        }
    }

    mod kv_tests {
        use super::*;

        #[test]
        fn get_missing_is_none() {
            let db = setup_db();
            assert!(db.get("nope").unwrap().is_none());
        }

        #[test]
        fn set_then_get() {
            let db = setup_db();
            db.set("Data", "{\"a\":1}").unwrap();
            assert_eq!(db.get("Data").unwrap(), Some("{\"a\":1}".to_string()));
        }

        #[test]
        fn last_write_wins() {
            let db = setup_db();
            db.set("k", "first").unwrap();
            db.set("k", "second").unwrap();
            assert_eq!(db.get("k").unwrap(), Some("second".to_string()));
            assert_eq!(db.list_keys().unwrap().len(), 1);
        }

        #[test]
        fn delete_reports_existence() {
            let db = setup_db();
            db.set("k", "v").unwrap();
            assert!(db.delete("k").unwrap());
            assert!(!db.delete("k").unwrap());
            assert!(db.get("k").unwrap().is_none());
        }

        #[test]
        fn list_keys_sorted_with_sizes() {
            let db = setup_db();
            db.set("studyPlan", "abc").unwrap();
            db.set("Data", "abcdef").unwrap();
            let keys = db.list_keys().unwrap();
            let names: Vec<&str> = keys.iter().map(|k| k.key.as_str()).collect();
            assert_eq!(names, vec!["Data", "studyPlan"]);
            assert_eq!(keys[0].bytes, 6);
        }
    }

    mod json_tests {
        use super::*;

        #[test]
        fn save_and_load_json() {
            let db = setup_db();
            db.save_json("nums", &vec![1, 2, 3]).unwrap();
            let loaded: Option<Vec<i32>> = db.load_json("nums").unwrap();
            assert_eq!(loaded, Some(vec![1, 2, 3]));
        }

        #[test]
        fn load_json_missing_is_none() {
            let db = setup_db();
            let loaded: Option<Vec<i32>> = db.load_json("nums").unwrap();
            assert!(loaded.is_none());
        }

        #[test]
        fn load_json_corrupt_is_error() {
            let db = setup_db();
            db.set("nums", "not json").unwrap();
            let loaded: crate::error::Result<Option<Vec<i32>>> = db.load_json("nums");
            assert!(loaded.is_err());
        }

        #[test]
        fn works_through_reference() {
            let db = setup_db();
            let store = &db;
            store.save("k", "v").unwrap();
            assert!(store.remove("k").unwrap());
        }
    }

    mod file_tests {
        use super::*;

        #[test]
        fn persists_across_connections() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("rapid_revise.db");
            {
                let db = Database::open(&path).unwrap();
                db.init().unwrap();
                db.set("studyPlan", "{\"subject\":\"x\"}").unwrap();
            }
            let db = Database::open(&path).unwrap();
            db.init().unwrap();
            assert_eq!(
                db.get("studyPlan").unwrap(),
                Some("{\"subject\":\"x\"}".to_string())
            );
        }
    }
}
