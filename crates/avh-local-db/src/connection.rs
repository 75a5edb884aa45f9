//! Database connection management.

use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const APP_DIR: &str = "agent-validation-hub";
const DB_FILE: &str = "state.db";

/// Database connection wrapper shared between clones.
#[derive(Debug, Clone)]
pub struct Database {
    connection: Arc<Mutex<Connection>>,
}

impl Database {
    /// Get the default database path based on the AVH_HOME environment variable or platform defaults.
    ///
    /// Priority order:
    /// 1. AVH_HOME environment variable (custom)
    /// 2. Platform-specific defaults:
    ///    - Linux: `${XDG_STATE_HOME:-~/.local/state}/agent-validation-hub/state.db`
    ///    - macOS: `~/Library/Application Support/agent-validation-hub/state.db`
    ///    - Windows: `%LOCALAPPDATA%\agent-validation-hub\state.db`
    pub fn default_path() -> crate::Result<PathBuf> {
        if let Ok(avh_home) = std::env::var("AVH_HOME") {
            return Ok(PathBuf::from(avh_home).join(DB_FILE));
        }

        #[cfg(target_os = "linux")]
        {
            let xdg_state_home = match std::env::var("XDG_STATE_HOME") {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => home_dir()?.join(".local").join("state"),
            };
            Ok(xdg_state_home.join(APP_DIR).join(DB_FILE))
        }

        #[cfg(target_os = "macos")]
        {
            Ok(home_dir()?
                .join("Library")
                .join("Application Support")
                .join(APP_DIR)
                .join(DB_FILE))
        }

        #[cfg(target_os = "windows")]
        {
            let local_appdata = std::env::var("LOCALAPPDATA").map_err(|_| {
                crate::Error::generic("LOCALAPPDATA environment variable not set")
            })?;
            Ok(PathBuf::from(local_appdata).join(APP_DIR).join(DB_FILE))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            Ok(home_dir()?.join(".agent-validation-hub").join(DB_FILE))
        }
    }

    /// Open a database at the specified path, creating it and its parent
    /// directories when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!(path = %path.display(), "opening state database");
        let conn = Connection::open(path)?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory database for testing.
    pub fn open_in_memory() -> crate::Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> crate::Result<()> {
        // WAL lets a second CLI process read while another one writes
        conn.pragma_update(None, "journal_mode", "WAL")?;

        crate::migrations::MigrationManager::migrate(conn)?;

        Ok(())
    }

    /// Lock the underlying connection.
    pub fn lock(&self) -> crate::Result<MutexGuard<'_, Connection>> {
        self.connection.lock().map_err(|e| {
            crate::Error::generic(format!("Failed to acquire database lock: {}", e))
        })
    }
}

#[allow(dead_code)]
fn home_dir() -> crate::Result<PathBuf> {
    std::env::var("HOME")
        .map(PathBuf::from)
        .map_err(|_| crate::Error::generic("HOME environment variable not set"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.db");
        let db = Database::open(&path).unwrap();
        assert!(path.exists());
        drop(db);
    }

    #[test]
    fn test_in_memory_database_is_migrated() {
        let db = Database::open_in_memory().unwrap();
        let conn = db.lock().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
