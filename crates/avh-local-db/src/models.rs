//! Slot persistence operations.

use rusqlite::{params, OptionalExtension};

/// Access to the `kv` table on a borrowed connection.
pub struct KvStore<'a> {
    conn: &'a rusqlite::Connection,
}

impl<'a> KvStore<'a> {
    pub fn new(conn: &'a rusqlite::Connection) -> Self {
        Self { conn }
    }

    pub fn set(&self, scope: &str, key: &str, value: Option<&str>) -> crate::Result<()> {
        self.conn.execute(
            r#"
            INSERT INTO kv (scope, k, v, updated_at)
            VALUES (?, ?, ?, strftime('%Y-%m-%dT%H:%M:%fZ','now'))
            ON CONFLICT(scope, k) DO UPDATE SET v = excluded.v, updated_at = excluded.updated_at
            "#,
            params![scope, key, value],
        )?;
        Ok(())
    }

    pub fn get(&self, scope: &str, key: &str) -> crate::Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT v FROM kv WHERE scope = ? AND k = ?",
                params![scope, key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    pub fn keys(&self, scope: &str) -> crate::Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT k FROM kv WHERE scope = ? ORDER BY k")?;
        let rows = stmt.query_map(params![scope], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }
}
