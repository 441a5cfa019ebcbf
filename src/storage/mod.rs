use anyhow::Context;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Arc, Mutex};

pub const KEY_VOLUME: &str = "volume";
pub const KEY_QUEUE: &str = "queue";

/// Durable string key-value store used for volume and queue persistence.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;
}

pub type SharedStore = Arc<dyn KeyValueStore>;

pub struct Storage {
    conn: Mutex<Connection>,
}

impl Storage {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create dir {}", parent.display()))?;
        }

        let conn = Connection::open(path).with_context(|| format!("open {}", path.display()))?;
        Self::with_connection(conn)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> anyhow::Result<Self> {
        let conn = Connection::open_in_memory().context("open in-memory sqlite")?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> anyhow::Result<Self> {
        conn.execute_batch(
            r#"
CREATE TABLE IF NOT EXISTS kv (
  key TEXT PRIMARY KEY,
  value TEXT NOT NULL,
  updated_at INTEGER NOT NULL
);
"#,
        )
        .context("init schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> anyhow::Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("storage connection poisoned"))
    }
}

impl KeyValueStore for Storage {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let conn = self.conn()?;
        conn.query_row("SELECT value FROM kv WHERE key=?1", params![key], |row| {
            row.get::<_, String>(0)
        })
        .optional()
        .with_context(|| format!("read key {key}"))
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        let conn = self.conn()?;
        conn.execute(
            r#"
INSERT INTO kv(key, value, updated_at)
VALUES(?1, ?2, ?3)
ON CONFLICT(key) DO UPDATE SET
  value=excluded.value,
  updated_at=excluded.updated_at
"#,
            params![key, value, now],
        )
        .with_context(|| format!("write key {key}"))?;
        Ok(())
    }
}

/// Reads the persisted volume, if any and in range.
pub fn load_volume(store: &dyn KeyValueStore) -> Option<u8> {
    match store.get(KEY_VOLUME) {
        Ok(Some(raw)) => raw.trim().parse::<u8>().ok().filter(|v| *v <= 100),
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("read volume: {e:#}");
            None
        }
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites_previous_value() {
        let s = Storage::open_in_memory().unwrap();
        assert_eq!(s.get("volume").unwrap(), None);
        s.set("volume", "40").unwrap();
        s.set("volume", "55").unwrap();
        assert_eq!(s.get("volume").unwrap().as_deref(), Some("55"));
    }

    #[test]
    fn volume_out_of_range_is_ignored() {
        let s = MemoryStore::default();
        s.set(KEY_VOLUME, "250").unwrap();
        assert_eq!(load_volume(&s), None);
        s.set(KEY_VOLUME, "70").unwrap();
        assert_eq!(load_volume(&s), Some(70));
    }
}
