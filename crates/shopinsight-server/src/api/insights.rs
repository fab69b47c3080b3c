use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shopinsight_core::{InsightsRecord, InsightsRequest};
use shopinsight_db::{InsightsRecordRow, NewInsightsRecord};
use shopinsight_scraper::{normalize_store_url, InsightsError};
use sqlx::PgPool;
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{
    map_db_error, normalize_limit, normalize_offset, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct HistoryQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryItem {
    record_id: Uuid,
    store_url: String,
    store_name: Option<String>,
    scraped_at: DateTime<Utc>,
    processing_time_seconds: f64,
    success: bool,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<InsightsRecordRow> for HistoryItem {
    fn from(row: InsightsRecordRow) -> Self {
        Self {
            record_id: row.public_id,
            store_url: row.store_url,
            store_name: row.store_name,
            scraped_at: row.scraped_at,
            processing_time_seconds: row.processing_time_secs,
            success: row.success,
            error_message: row.error_message,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryPage {
    records: Vec<HistoryItem>,
    limit: i64,
    offset: i64,
    count: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct ClearedInsights {
    store_url: String,
    deleted: u64,
}

fn invalid_url(request_id: &str, error: &impl std::fmt::Display) -> ApiError {
    ApiError::new(request_id, "validation_error", error.to_string())
}

/// `POST /fetch-insights`. A successful analysis answers with the bare
/// record; the request id travels only in the `x-request-id` header.
pub(super) async fn fetch_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    payload: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let started = Instant::now();

    let Json(request) =
        payload.map_err(|rejection| invalid_url(&req_id.0, &rejection.body_text()))?;
    let store_url =
        normalize_store_url(&request.website_url).map_err(|e| invalid_url(&req_id.0, &e))?;

    tracing::info!(store_url = %store_url, include_competitors = request.include_competitors, "insights requested");

    if let Some(mut cached) = cached_record(&state, &store_url, &request).await {
        tracing::info!(store_url = %store_url, "returning cached insights");
        cached.processing_time_seconds = started.elapsed().as_secs_f64();
        return Ok(Json(cached).into_response());
    }

    let aggregator = state.aggregator.clone();
    let analysis = tokio::spawn(async move { aggregator.analyze(&request).await })
        .await
        .map_err(|e| {
            tracing::error!(error = %e, store_url = %store_url, "analysis task failed");
            ApiError::new(
                req_id.0.clone(),
                "internal_error",
                "failed to extract insights from the website",
            )
        })?;

    match analysis {
        Ok(record) => {
            persist_in_background(state.pool.as_ref(), &record);
            Ok(Json(record).into_response())
        }
        Err(err) => Err(rejection_response(&state, req_id, &store_url, &err, started)),
    }
}

/// Maps an analysis error to its response. Unreachable and non-Shopify
/// stores answer 401 with the rejected record, which is also persisted.
fn rejection_response(
    state: &AppState,
    req_id: RequestId,
    store_url: &str,
    err: &InsightsError,
    started: Instant,
) -> ApiError {
    let Some(reason) = err.failure_reason() else {
        return match err {
            InsightsError::InvalidTarget { .. } => invalid_url(&req_id.0, err),
            _ => {
                tracing::error!(error = %err, store_url, "analysis failed");
                ApiError::new(
                    req_id.0,
                    "internal_error",
                    "failed to extract insights from the website",
                )
            }
        };
    };

    let record = InsightsRecord::rejected(
        err.store_url().unwrap_or(store_url),
        reason,
        started.elapsed().as_secs_f64(),
    );
    persist_in_background(state.pool.as_ref(), &record);

    ApiError::rejected(req_id.0, err.to_string(), record)
}

impl ApiError {
    /// A 401 that also carries the rejected record in `data`.
    fn rejected(request_id: String, message: String, record: InsightsRecord) -> Self {
        let mut error = ApiError::new(request_id, "unauthorized", message);
        error.rejected_record = Some(Box::new(record));
        error
    }
}

/// A stored record young enough to reuse, if caching is enabled.
///
/// A record stored without competitors is not reused for a request that
/// asks for them.
async fn cached_record(
    state: &AppState,
    store_url: &str,
    request: &InsightsRequest,
) -> Option<InsightsRecord> {
    let pool = state.pool.as_ref()?;
    if state.cache_ttl_secs == 0 {
        return None;
    }
    let max_age = i64::try_from(state.cache_ttl_secs).unwrap_or(i64::MAX);

    let row = match shopinsight_db::get_latest_insights(pool, store_url, Some(max_age)).await {
        Ok(row) => row?,
        Err(e) => {
            tracing::warn!(error = %e, store_url, "cache lookup failed; analyzing fresh");
            return None;
        }
    };

    match row.to_record() {
        Ok(record) if request.include_competitors && record.competitors.is_empty() => None,
        Ok(record) => Some(record),
        Err(e) => {
            tracing::warn!(error = %e, store_url, "stored record is unreadable; analyzing fresh");
            None
        }
    }
}

/// Stores `record` on a detached task. Failures are logged only.
fn persist_in_background(pool: Option<&PgPool>, record: &InsightsRecord) {
    let Some(pool) = pool.cloned() else {
        return;
    };
    let row = match NewInsightsRecord::from_record(record) {
        Ok(row) => row,
        Err(e) => {
            tracing::error!(error = %e, store_url = %record.store_url, "failed to encode insights record");
            return;
        }
    };

    tokio::spawn(async move {
        match shopinsight_db::insert_insights_record(&pool, &row).await {
            Ok(saved) => {
                tracing::info!(record_id = %saved.public_id, store_url = %saved.store_url, "saved insights record");
            }
            Err(e) => {
                tracing::error!(error = %e, store_url = %row.store_url, "failed to save insights record");
            }
        }
    });
}

pub(super) async fn list_history(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<HistoryPage>>, ApiError> {
    let pool = state.require_pool(&req_id.0)?;
    let limit = normalize_limit(query.limit);
    let offset = normalize_offset(query.offset);

    let rows = shopinsight_db::list_insights_records(pool, limit, offset)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let records: Vec<HistoryItem> = rows.into_iter().map(HistoryItem::from).collect();

    Ok(Json(ApiResponse {
        data: HistoryPage {
            count: records.len(),
            records,
            limit,
            offset,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_cached_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_url): Path<String>,
) -> Result<Json<ApiResponse<InsightsRecord>>, ApiError> {
    let pool = state.require_pool(&req_id.0)?;
    let store_url = normalize_store_url(&store_url).map_err(|e| invalid_url(&req_id.0, &e))?;

    let row = shopinsight_db::get_latest_insights(pool, &store_url, None)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("no cached insights found for {store_url}"),
            )
        })?;

    let record = row
        .to_record()
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: record,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn clear_cached_insights(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(store_url): Path<String>,
) -> Result<Json<ApiResponse<ClearedInsights>>, ApiError> {
    let pool = state.require_pool(&req_id.0)?;
    let store_url = normalize_store_url(&store_url).map_err(|e| invalid_url(&req_id.0, &e))?;

    let deleted = shopinsight_db::delete_insights_for_store(pool, &store_url)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(store_url = %store_url, deleted, "cleared cached insights");

    Ok(Json(ApiResponse {
        data: ClearedInsights { store_url, deleted },
        meta: ResponseMeta::new(req_id.0),
    }))
}
