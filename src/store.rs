use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, params};

pub(crate) const MY_LIST_KEY: &str = "my_list";
pub(crate) const CONTINUE_WATCHING_KEY: &str = "continue_watching";
pub(crate) const EPISODE_PROGRESS_KEY: &str = "episode_progress";

/// Keyed JSON blobs backing the favorites, continue-watching and
/// episode-progress collections. Writers from concurrent processes race
/// last-write-wins; there is no version check.
pub(crate) trait StateStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

pub(crate) struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create store directory {}", parent.display())
            })?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open store at {}", path.display()))?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.migrate()?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("store mutex poisoned"))
    }

    fn migrate(&self) -> Result<()> {
        self.conn()?.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS state (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }
}

impl StateStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT value FROM state WHERE key = ?1")?;
        let mut rows = stmt.query(params![key])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(row.get(0)?));
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.conn()?.execute(
            r#"
            INSERT INTO state (key, value) VALUES (?1, ?2)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.conn()?
            .execute("DELETE FROM state WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use anyhow::{Result, anyhow};

    use super::StateStore;

    #[derive(Debug, Default)]
    pub(crate) struct MemoryStore {
        values: Mutex<HashMap<String, String>>,
    }

    impl MemoryStore {
        pub(crate) fn new() -> Self {
            Self::default()
        }
    }

    impl StateStore for MemoryStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            let values = self
                .values
                .lock()
                .map_err(|_| anyhow!("store mutex poisoned"))?;
            Ok(values.get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            let mut values = self
                .values
                .lock()
                .map_err(|_| anyhow!("store mutex poisoned"))?;
            values.insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            let mut values = self
                .values
                .lock()
                .map_err(|_| anyhow!("store mutex poisoned"))?;
            values.remove(key);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    struct TempStoreDir {
        path: PathBuf,
    }

    impl TempStoreDir {
        fn new() -> Self {
            let ts = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            let path = std::env::temp_dir().join(format!(
                "reeltrack-store-{}-{ts}",
                std::process::id()
            ));
            std::fs::create_dir_all(&path).expect("create temp store dir");
            Self { path }
        }

        fn db_path(&self) -> PathBuf {
            self.path.join("state.db")
        }
    }

    impl Drop for TempStoreDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    #[test]
    fn sqlite_store_round_trips_and_overwrites_values() {
        let dir = TempStoreDir::new();
        let store = SqliteStore::open(&dir.db_path()).expect("open store");

        assert_eq!(store.get("k").expect("get"), None);

        store.set("k", "v1").expect("set");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v1"));

        store.set("k", "v2").expect("overwrite");
        assert_eq!(store.get("k").expect("get").as_deref(), Some("v2"));

        store.remove("k").expect("remove");
        assert_eq!(store.get("k").expect("get"), None);
    }

    #[test]
    fn sqlite_store_persists_across_reopen() {
        let dir = TempStoreDir::new();
        {
            let store = SqliteStore::open(&dir.db_path()).expect("open store");
            store.set("k", "kept").expect("set");
        }

        let reopened = SqliteStore::open(&dir.db_path()).expect("reopen store");
        assert_eq!(reopened.get("k").expect("get").as_deref(), Some("kept"));
    }

    #[test]
    fn remove_of_absent_key_is_a_no_op() {
        let dir = TempStoreDir::new();
        let store = SqliteStore::open(&dir.db_path()).expect("open store");
        store.remove("missing").expect("remove absent key");
    }
}
