use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, OpenFlags};
use std::path::Path;

use crate::error::FixError;

/// One row of the `Utenti` table, as far as this tool cares.
/// `email` and `password` are display text: whatever SQLite holds in those
/// columns is rendered, NULL as an empty string and BLOBs as `X'..'`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRecord {
    pub id: i64,
    pub email: String,
    pub password: String,
}

/// Record store the normalizer writes through.
///
/// `update_credential` returns the number of rows it touched; zero means the
/// lookup key matched nothing. `commit` makes every update since the last
/// commit durable.
pub trait CredentialStore {
    fn find_all(&mut self) -> Result<Vec<IdentityRecord>, FixError>;

    fn update_credential(&mut self, lookup_key: &str, new_credential: &str) -> Result<usize, FixError>;

    fn commit(&mut self) -> Result<(), FixError>;

    fn close(self) -> Result<(), FixError>
    where
        Self: Sized;
}

// SQLite-backed store over the application's existing database.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    // Open an existing database file. A missing file is an error, not a new empty database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FixError> {
        let conn = Connection::open_with_flags(
            path.as_ref(),
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self::from_connection(conn))
    }

    // Wrap an already open connection (in-memory databases in tests).
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

// Render any column value as text so one odd row never breaks a listing.
fn column_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("X'{}'", hex::encode_upper(b)),
    }
}

impl CredentialStore for SqliteStore {
    fn find_all(&mut self) -> Result<Vec<IdentityRecord>, FixError> {
        let mut stmt = self
            .conn
            .prepare("SELECT Id, Email, Password FROM Utenti ORDER BY Id ASC")?;

        let rows = stmt.query_map([], |r| {
            Ok(IdentityRecord {
                id: r.get::<_, i64>(0)?,
                email: column_text(r.get_ref(1)?),
                password: column_text(r.get_ref(2)?),
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn update_credential(&mut self, lookup_key: &str, new_credential: &str) -> Result<usize, FixError> {
        // Open the write transaction lazily; `commit` closes it.
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
        }
        let affected = self.conn.execute(
            "UPDATE Utenti SET Password = ?1 WHERE Email = ?2",
            params![new_credential, lookup_key],
        )?;
        Ok(affected)
    }

    fn commit(&mut self) -> Result<(), FixError> {
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("COMMIT")?;
        }
        Ok(())
    }

    // Anything not committed by now is rolled back by SQLite when the connection closes.
    fn close(self) -> Result<(), FixError> {
        self.conn.close().map_err(|(_, e)| FixError::Storage(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store() -> SqliteStore {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE Utenti (
                Id       INTEGER PRIMARY KEY AUTOINCREMENT,
                Email    TEXT NOT NULL UNIQUE,
                Password TEXT
            );
            INSERT INTO Utenti (Email, Password) VALUES ('admin@test.com', 'old');
            INSERT INTO Utenti (Email, Password) VALUES ('mario@test.com', NULL);
            "#,
        )
        .unwrap();
        SqliteStore::from_connection(conn)
    }

    #[test]
    fn find_all_lists_rows_in_id_order() {
        let mut store = test_store();
        let records = store.find_all().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].email, "admin@test.com");
        assert_eq!(records[0].password, "old");
        // NULL credentials read back as empty
        assert_eq!(records[1].password, "");
    }

    #[test]
    fn find_all_renders_null_and_blob_columns() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE Utenti (Id INTEGER PRIMARY KEY, Email TEXT, Password TEXT);
            INSERT INTO Utenti (Email, Password) VALUES ('admin@test.com', 'old');
            INSERT INTO Utenti (Email, Password) VALUES (NULL, 'x');
            INSERT INTO Utenti (Email, Password) VALUES ('blob@test.com', X'FFFE');
            INSERT INTO Utenti (Email, Password) VALUES ('int@test.com', 42);
            "#,
        )
        .unwrap();
        let mut store = SqliteStore::from_connection(conn);

        let records = store.find_all().unwrap();
        assert_eq!(records.len(), 4);
        assert_eq!(records[1].email, "");
        assert_eq!(records[1].password, "x");
        assert_eq!(records[2].password, "X'FFFE'");
        assert_eq!(records[3].password, "42");

        // the odd rows do not get in the way of an update
        assert_eq!(store.update_credential("admin@test.com", "new").unwrap(), 1);
        store.commit().unwrap();
        assert_eq!(store.find_all().unwrap()[0].password, "new");
    }

    #[test]
    fn update_reports_rows_affected() {
        let mut store = test_store();
        assert_eq!(store.update_credential("admin@test.com", "new").unwrap(), 1);
        assert_eq!(store.update_credential("nobody@test.com", "new").unwrap(), 0);
        store.commit().unwrap();
        assert!(store.connection().is_autocommit());
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let mut store = test_store();
        assert_eq!(store.update_credential("ADMIN@test.com", "new").unwrap(), 0);
    }

    #[test]
    fn commit_without_updates_is_a_no_op() {
        let mut store = test_store();
        store.commit().unwrap();
        store.close().unwrap();
    }

    #[test]
    fn open_refuses_missing_file() {
        let path = std::env::temp_dir().join("fix_passwords_does_not_exist.db");
        let _ = std::fs::remove_file(&path);
        assert!(matches!(SqliteStore::open(&path), Err(FixError::Storage(_))));
        assert!(!path.exists());
    }
}
