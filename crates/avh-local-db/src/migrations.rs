//! Database migration management.

use rusqlite::{params, Connection};

/// Database migration manager.
pub struct MigrationManager;

impl MigrationManager {
    /// Apply all pending migrations to the database.
    pub fn migrate(conn: &Connection) -> crate::Result<()> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );
            "#,
        )?;

        let current_version = Self::current_version(conn)?.unwrap_or(0);

        if current_version > crate::SCHEMA_VERSION {
            return Err(crate::Error::migration(format!(
                "database schema version {} is newer than supported version {}",
                current_version,
                crate::SCHEMA_VERSION
            )));
        }

        if current_version < 1 {
            tracing::debug!("applying kv schema migration 1");
            Self::apply_migration_1(conn)?;
        }

        Ok(())
    }

    /// Apply migration version 1 - slot table
    fn apply_migration_1(conn: &Connection) -> crate::Result<()> {
        conn.execute_batch(
            r#"
            -- JSON documents keyed by scope and slot name
            CREATE TABLE IF NOT EXISTS kv (
                scope TEXT NOT NULL,
                k TEXT NOT NULL,
                v TEXT,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ','now')),
                PRIMARY KEY (scope, k)
            );

            -- Mark migration as applied
            INSERT OR REPLACE INTO schema_migrations (version) VALUES (1);
            "#,
        )?;

        Ok(())
    }

    /// Get the current schema version.
    pub fn current_version(conn: &Connection) -> crate::Result<Option<u32>> {
        let mut stmt = conn.prepare("SELECT MAX(version) FROM schema_migrations")?;

        let version: Option<u32> = stmt.query_row(params![], |row| row.get(0))?;

        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        MigrationManager::migrate(&conn).unwrap();
        MigrationManager::migrate(&conn).unwrap();
        assert_eq!(MigrationManager::current_version(&conn).unwrap(), Some(1));
    }

    #[test]
    fn test_refuses_newer_schema() {
        let conn = Connection::open_in_memory().unwrap();
        MigrationManager::migrate(&conn).unwrap();
        conn.execute("INSERT INTO schema_migrations (version) VALUES (99)", [])
            .unwrap();
        assert!(matches!(
            MigrationManager::migrate(&conn),
            Err(crate::Error::Migration { .. })
        ));
    }
}
