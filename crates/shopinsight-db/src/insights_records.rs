//! Database operations for `insights_records`.
//!
//! Rows are append-only: every completed analysis is one insert and nothing
//! is updated in place. Reads pick the newest row per store.

use chrono::{DateTime, Utc};
use shopinsight_core::InsightsRecord;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

const RECORD_COLUMNS: &str = "id, public_id, store_url, store_name, insights_data, scraped_at, \
     processing_time_secs, success, error_message, created_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `insights_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InsightsRecordRow {
    pub id: i64,
    pub public_id: Uuid,
    pub store_url: String,
    pub store_name: Option<String>,
    /// The full serialized [`InsightsRecord`].
    pub insights_data: serde_json::Value,
    pub scraped_at: DateTime<Utc>,
    pub processing_time_secs: f64,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl InsightsRecordRow {
    /// Decodes the stored record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Encode`] if `insights_data` no longer matches the
    /// record shape.
    pub fn to_record(&self) -> Result<InsightsRecord, DbError> {
        Ok(serde_json::from_value(self.insights_data.clone())?)
    }
}

/// Values for a new `insights_records` row.
#[derive(Debug, Clone)]
pub struct NewInsightsRecord {
    pub store_url: String,
    pub store_name: Option<String>,
    pub insights_data: serde_json::Value,
    pub scraped_at: DateTime<Utc>,
    pub processing_time_secs: f64,
    pub success: bool,
    pub error_message: Option<String>,
}

impl NewInsightsRecord {
    /// Builds the row for `record`; rejected records carry their failure
    /// reason as the error message.
    ///
    /// # Errors
    ///
    /// Returns [`serde_json::Error`] if the record cannot be serialized.
    pub fn from_record(record: &InsightsRecord) -> Result<Self, serde_json::Error> {
        Ok(Self {
            store_url: record.store_url.clone(),
            store_name: record.store_name.clone(),
            insights_data: serde_json::to_value(record)?,
            scraped_at: record.scraped_at,
            processing_time_secs: record.processing_time_seconds,
            success: record.success,
            error_message: record.failure_reason.map(|r| r.to_string()),
        })
    }
}

/// Aggregate counters over every stored analysis.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct InsightsStatsRow {
    pub total_requests: i64,
    pub successful_requests: i64,
    pub failed_requests: i64,
    pub average_processing_time_secs: f64,
}

impl InsightsStatsRow {
    /// Share of successful requests, `0.0` when nothing is stored yet.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate_percent(&self) -> f64 {
        if self.total_requests == 0 {
            return 0.0;
        }
        self.successful_requests as f64 / self.total_requests as f64 * 100.0
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Inserts one analysis result and returns the stored row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_insights_record(
    pool: &PgPool,
    record: &NewInsightsRecord,
) -> Result<InsightsRecordRow, DbError> {
    let row = sqlx::query_as::<_, InsightsRecordRow>(&format!(
        "INSERT INTO insights_records \
             (public_id, store_url, store_name, insights_data, scraped_at, \
              processing_time_secs, success, error_message) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&record.store_url)
    .bind(&record.store_name)
    .bind(&record.insights_data)
    .bind(record.scraped_at)
    .bind(record.processing_time_secs)
    .bind(record.success)
    .bind(&record.error_message)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Newest successful record for `store_url`, optionally no older than
/// `max_age_secs`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_latest_insights(
    pool: &PgPool,
    store_url: &str,
    max_age_secs: Option<i64>,
) -> Result<Option<InsightsRecordRow>, DbError> {
    let row = sqlx::query_as::<_, InsightsRecordRow>(&format!(
        "SELECT {RECORD_COLUMNS} FROM insights_records \
         WHERE store_url = $1 AND success \
           AND ($2::BIGINT IS NULL OR scraped_at >= NOW() - ($2::BIGINT * INTERVAL '1 second')) \
         ORDER BY scraped_at DESC, id DESC \
         LIMIT 1"
    ))
    .bind(store_url)
    .bind(max_age_secs)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Stored records, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_insights_records(
    pool: &PgPool,
    limit: i64,
    offset: i64,
) -> Result<Vec<InsightsRecordRow>, DbError> {
    let rows = sqlx::query_as::<_, InsightsRecordRow>(&format!(
        "SELECT {RECORD_COLUMNS} FROM insights_records \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Deletes every stored record for `store_url`. Returns the number removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_insights_for_store(pool: &PgPool, store_url: &str) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM insights_records WHERE store_url = $1")
        .bind(store_url)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Totals across every stored record.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn insights_stats(pool: &PgPool) -> Result<InsightsStatsRow, DbError> {
    let row = sqlx::query_as::<_, InsightsStatsRow>(
        "SELECT COUNT(*)::BIGINT AS total_requests, \
                COUNT(*) FILTER (WHERE success)::BIGINT AS successful_requests, \
                COUNT(*) FILTER (WHERE NOT success)::BIGINT AS failed_requests, \
                COALESCE(AVG(processing_time_secs), 0)::DOUBLE PRECISION \
                    AS average_processing_time_secs \
         FROM insights_records",
    )
    .fetch_one(pool)
    .await?;

    Ok(row)
}
