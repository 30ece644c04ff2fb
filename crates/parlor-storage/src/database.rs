// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background
//! thread. Do NOT create additional Connection instances for writes.

use parlor_core::ParlorError;

use crate::migrations;

/// Convert a tokio-rusqlite error into `ParlorError::Storage`.
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> ParlorError {
    ParlorError::Storage { source: Box::new(e) }
}

/// Handle to the single SQLite connection.
///
/// Cloning is cheap; all clones share the same background writer thread.
#[derive(Clone)]
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` with WAL mode enabled and run
    /// pending migrations.
    pub async fn open(path: &str) -> Result<Self, ParlorError> {
        Self::open_with(path, true).await
    }

    /// Open with explicit WAL-mode choice (config-driven).
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, ParlorError> {
        if let Some(parent) = std::path::Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(ParlorError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| ParlorError::Storage { source: Box::new(e) })?;
        Self::init(conn, wal_mode).await
    }

    /// Open an in-memory database (tests).
    pub async fn open_in_memory() -> Result<Self, ParlorError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| ParlorError::Storage { source: Box::new(e) })?;
        // WAL is meaningless for :memory:.
        Self::init(conn, false).await
    }

    async fn init(
        conn: tokio_rusqlite::Connection,
        wal_mode: bool,
    ) -> Result<Self, ParlorError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.pragma_update(None, "journal_mode", "WAL")?;
            }
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(std::time::Duration::from_secs(5))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        conn.call(|conn| migrations::run_migrations(conn))
            .await
            .map_err(|e| ParlorError::Storage { source: Box::new(e) })?;

        tracing::debug!(wal_mode, "database opened, migrations applied");
        Ok(Self { conn })
    }

    /// Access the underlying tokio-rusqlite connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, flushing the WAL.
    pub async fn close(self) -> Result<(), ParlorError> {
        self.conn
            .close()
            .await
            .map_err(|e| ParlorError::Storage { source: Box::new(e) })
    }
}
