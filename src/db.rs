use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};

const TOKEN_KEY: &str = "token";
const USERNAME_KEY: &str = "username";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub token: String,
    pub username: String,
}

/// Remembers the logged-in user between launches.
#[derive(Clone)]
pub struct CredentialStore {
    conn: Arc<Mutex<Connection>>,
}

impl CredentialStore {
    /// Open (or create) `credentials.db` inside `data_dir`.
    pub fn open_default(data_dir: &Path) -> Result<Self> {
        if !data_dir.exists() {
            std::fs::create_dir_all(data_dir).with_context(|| {
                format!("Could not create data directory {}", data_dir.display())
            })?;
        }
        Self::open(&data_dir.join("credentials.db"))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Could not open credential store {}", path.display()))?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS credentials (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| anyhow!("Failed to lock credential store"))
    }

    pub fn save(&self, token: &str, username: &str) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for (key, value) in [(TOKEN_KEY, token), (USERNAME_KEY, username)] {
            tx.execute(
                "INSERT OR REPLACE INTO credentials (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Both keys must be present and non-empty.
    pub fn load(&self) -> Result<Option<StoredCredentials>> {
        let conn = self.lock()?;
        let get = |key: &str| -> Result<Option<String>> {
            Ok(conn
                .query_row(
                    "SELECT value FROM credentials WHERE key = ?1",
                    params![key],
                    |row| row.get::<_, String>(0),
                )
                .optional()?
                .filter(|v| !v.is_empty()))
        };

        match (get(TOKEN_KEY)?, get(USERNAME_KEY)?) {
            (Some(token), Some(username)) => Ok(Some(StoredCredentials { token, username })),
            _ => Ok(None),
        }
    }

    pub fn clear(&self) -> Result<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM credentials", [])?;
        Ok(())
    }
}
