//! # Postgres Submission Store
//!
//! SQLx-backed [`SubmissionStore`] over the `submissions` table. The table's
//! `UNIQUE` constraint on `registry_number` is a second line of defence: a
//! colliding insert surfaces as [`StoreError::Conflict`] instead of a
//! duplicate row.
//!
//! Exclusion between issuers is still the coordinator's job. Every process
//! writing to the table must go through the same coordinator.

use std::time::Duration;

use chrono::{DateTime, Utc};
use cpsrn_core::{CategoryTag, IssuanceRequest};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::error::StoreError;
use crate::record::{SubmissionId, SubmissionRecord};
use crate::store::SubmissionStore;

/// Submission store persisted in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgSubmissionStore {
    pool: PgPool,
}

impl PgSubmissionStore {
    /// Wrap an existing pool. Migrations are not run.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to `url` and apply the embedded migrations.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(5))
            .connect(url)
            .await
            .map_err(backend)?;
        tracing::info!("Connected to PostgreSQL");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {e}")))?;
        tracing::info!("Database migrations applied");

        Ok(Self { pool })
    }

    /// The underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Records carrying `tag`, oldest first.
    pub async fn list_by_category_tag(
        &self,
        tag: &CategoryTag,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let rows = sqlx::query_as::<_, SubmissionRow>(
            "SELECT id, collection_selector, service_tier, submitter_role, category_tag,
                    registry_number, issued_at
             FROM submissions WHERE category_tag = $1 ORDER BY issued_at, registry_number",
        )
        .bind(tag.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(backend)?;

        rows.into_iter().map(SubmissionRow::into_record).collect()
    }
}

impl SubmissionStore for PgSubmissionStore {
    async fn count_by_category_tag(&self, tag: &CategoryTag) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM submissions WHERE category_tag = $1")
            .bind(tag.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(backend)
    }

    async fn persist(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            "INSERT INTO submissions (id, collection_selector, service_tier, submitter_role,
                                      category_tag, registry_number, issued_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(record.id.0)
        .bind(i16::from(record.request.collection_selector.code()))
        .bind(i16::from(record.request.service_tier.code()))
        .bind(i16::from(record.request.submitter_role.code()))
        .bind(record.category_tag.as_str())
        .bind(record.registry_number.to_string())
        .bind(record.issued_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Err(StoreError::Conflict(
                format!("registry number {} already issued", record.registry_number),
            )),
            Err(e) => Err(backend(e)),
        }
    }
}

fn backend(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    collection_selector: i16,
    service_tier: i16,
    submitter_role: i16,
    category_tag: String,
    registry_number: String,
    issued_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_record(self) -> Result<SubmissionRecord, StoreError> {
        let corrupt = |what: &str, detail: String| {
            StoreError::Serialization(format!("submission {}: {what}: {detail}", self.id))
        };
        let code = |value: i16, what: &str| {
            u8::try_from(value).map_err(|_| corrupt(what, format!("code {value} out of range")))
        };

        let request = IssuanceRequest::from_codes(
            code(self.collection_selector, "collection_selector")?,
            code(self.service_tier, "service_tier")?,
            code(self.submitter_role, "submitter_role")?,
        )
        .map_err(|e| corrupt("request", e.to_string()))?;

        Ok(SubmissionRecord {
            id: SubmissionId(self.id),
            request,
            category_tag: self
                .category_tag
                .parse()
                .map_err(|e: cpsrn_core::IssuanceError| corrupt("category_tag", e.to_string()))?,
            registry_number: self
                .registry_number
                .parse()
                .map_err(|e: cpsrn_core::IssuanceError| corrupt("registry_number", e.to_string()))?,
            issued_at: self.issued_at,
        })
    }
}
