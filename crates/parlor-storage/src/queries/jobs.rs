// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ingestion job records.
//!
//! The job row is the only coordination point between the spawned ingestion
//! task and status polls: progress is written after every record, and the
//! terminal update flips the status exactly once.

use parlor_core::ParlorError;
use rusqlite::params;

use crate::database::{Database, map_tr_err};
use crate::models::{IngestionJob, JobStatus};
use crate::queries::parse_enum;

/// Insert a new job row. Every field (including counters and the error
/// list) is written here, so later updates never touch an unset field.
pub async fn create_job(db: &Database, job: &IngestionJob) -> Result<(), ParlorError> {
    let job = job.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO ingestion_jobs
                     (id, shop, status, progress, total, errors, started_at, finished_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    job.id,
                    job.shop,
                    job.status.to_string(),
                    job.progress,
                    job.total,
                    job.errors,
                    job.started_at,
                    job.finished_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a job by id.
pub async fn get_job(db: &Database, id: &str) -> Result<Option<IngestionJob>, ParlorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, shop, status, progress, total, errors, started_at, finished_at
                 FROM ingestion_jobs WHERE id = ?1",
            )?;
            let result = stmt.query_row(params![id], |row| {
                Ok(IngestionJob {
                    id: row.get(0)?,
                    shop: row.get(1)?,
                    status: parse_enum(2, row.get::<_, String>(2)?)?,
                    progress: row.get(3)?,
                    total: row.get(4)?,
                    errors: row.get(5)?,
                    started_at: row.get(6)?,
                    finished_at: row.get(7)?,
                })
            });
            match result {
                Ok(job) => Ok(Some(job)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Bump the progress counter (called after every processed record so a
/// concurrent poll sees fine-grained progress).
pub async fn update_progress(db: &Database, id: &str, progress: i64) -> Result<(), ParlorError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE ingestion_jobs SET progress = ?1 WHERE id = ?2",
                params![progress, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a job completed with its final counters and per-kind error list.
pub async fn complete_job(
    db: &Database,
    id: &str,
    total: i64,
    errors_json: &str,
    finished_at: &str,
) -> Result<(), ParlorError> {
    let id = id.to_string();
    let errors_json = errors_json.to_string();
    let finished_at = finished_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE ingestion_jobs
                 SET status = 'completed', progress = ?1, total = ?1,
                     errors = ?2, finished_at = ?3
                 WHERE id = ?4",
                params![total, errors_json, finished_at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Mark a job failed with the top-level error message appended to its list.
pub async fn fail_job(
    db: &Database,
    id: &str,
    error: &str,
    finished_at: &str,
) -> Result<(), ParlorError> {
    let id = id.to_string();
    let error = error.to_string();
    let finished_at = finished_at.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE ingestion_jobs
                 SET status = 'failed',
                     errors = json_insert(errors, '$[#]', ?1),
                     finished_at = ?2
                 WHERE id = ?3",
                params![error, finished_at, id],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
