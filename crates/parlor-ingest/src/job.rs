// SPDX-FileCopyrightText: 2026 Parlor Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The ingestion job runner.
//!
//! `start_ingestion` creates the job row (every field initialized) and
//! spawns the run, returning the job id immediately; callers poll the row
//! for progress. A failing resource kind records one error entry and the
//! remaining kinds still run.

use chrono::Utc;
use parlor_core::{ParlorError, now_timestamp};
use parlor_storage::models::{DocumentSource, IngestionJob, JobStatus, Merchant};
use parlor_storage::queries::{documents, jobs, merchants};
use parlor_storage::Database;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::commerce::CommerceClient;
use crate::normalize::document_from_record;

/// The three resource kinds, in ingestion order: document source paired with
/// its API path segment (which doubles as the response's JSON key).
const KINDS: &[(DocumentSource, &str)] = &[
    (DocumentSource::Product, "products"),
    (DocumentSource::Collection, "custom_collections"),
    (DocumentSource::Page, "pages"),
];

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestionSummary {
    pub products: i64,
    pub collections: i64,
    pub pages: i64,
    pub errors: Vec<String>,
}

impl IngestionSummary {
    fn total(&self) -> i64 {
        self.products + self.collections + self.pages
    }

    fn record(&mut self, source: DocumentSource, count: i64) {
        match source {
            DocumentSource::Product => self.products = count,
            DocumentSource::Collection => self.collections = count,
            DocumentSource::Page => self.pages = count,
        }
    }
}

/// Create the job row and spawn the run. Returns the job id immediately.
///
/// `NotFound` if the shop has no merchant record (no token to call the
/// commerce API with).
pub async fn start_ingestion(
    db: &Database,
    client: &CommerceClient,
    shop: &str,
) -> Result<String, ParlorError> {
    let merchant = merchants::get_merchant(db, shop)
        .await?
        .ok_or_else(|| ParlorError::NotFound {
            entity: "merchant",
            id: shop.to_string(),
        })?;

    let job = IngestionJob {
        id: uuid::Uuid::new_v4().to_string(),
        shop: shop.to_string(),
        status: JobStatus::Running,
        progress: 0,
        total: 0,
        errors: "[]".to_string(),
        started_at: now_timestamp(),
        finished_at: None,
    };
    jobs::create_job(db, &job).await?;

    let job_id = job.id.clone();
    let db = db.clone();
    let client = client.clone();
    tokio::spawn(async move {
        run_ingestion(&db, &client, &merchant, &job.id).await;
    });

    Ok(job_id)
}

/// Execute one ingestion run against an existing job row.
///
/// Never returns an error: every failure lands in the job row, either as a
/// per-kind error entry or as the `failed` terminal state.
pub async fn run_ingestion(
    db: &Database,
    client: &CommerceClient,
    merchant: &Merchant,
    job_id: &str,
) -> IngestionSummary {
    let mut summary = IngestionSummary::default();
    let mut processed: i64 = 0;

    for (source, resource) in KINDS {
        match ingest_kind(db, client, merchant, job_id, *source, resource, &mut processed)
            .await
        {
            Ok(count) => summary.record(*source, count),
            Err(e) => {
                warn!(shop = %merchant.shop, resource, error = %e, "resource kind failed");
                summary.errors.push(format!("{resource}: {e}"));
            }
        }
    }

    let errors_json =
        serde_json::to_string(&summary.errors).unwrap_or_else(|_| "[]".to_string());
    if let Err(e) =
        jobs::complete_job(db, job_id, summary.total(), &errors_json, &now_timestamp()).await
    {
        // The job row is the only coordination point; if even the terminal
        // update fails there is nothing left to update but the log.
        error!(job_id, error = %e, "failed to finalize ingestion job");
        let _ = jobs::fail_job(db, job_id, &e.to_string(), &now_timestamp()).await;
    }

    info!(
        shop = %merchant.shop,
        job_id,
        products = summary.products,
        collections = summary.collections,
        pages = summary.pages,
        errors = summary.errors.len(),
        "ingestion finished"
    );
    summary
}

/// Fetch and store one resource kind, bumping the shared progress counter
/// after every record so a concurrent status poll sees fine-grained
/// progress.
async fn ingest_kind(
    db: &Database,
    client: &CommerceClient,
    merchant: &Merchant,
    job_id: &str,
    source: DocumentSource,
    resource: &str,
    processed: &mut i64,
) -> Result<i64, ParlorError> {
    let records = client
        .fetch_all(&merchant.shop, &merchant.access_token, resource)
        .await?;

    let mut count = 0;
    for record in &records {
        let Some(document) =
            document_from_record(&merchant.shop, source, record, Utc::now())
        else {
            warn!(shop = %merchant.shop, resource, "skipping record without id");
            continue;
        };
        documents::upsert_document(db, &document).await?;
        count += 1;
        *processed += 1;
        jobs::update_progress(db, job_id, *processed).await?;
    }
    Ok(count)
}
