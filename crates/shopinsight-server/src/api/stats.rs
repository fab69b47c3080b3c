use axum::{extract::State, Extension, Json};
use serde::Serialize;
use shopinsight_db::InsightsStatsRow;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize, PartialEq)]
pub(super) struct StatsData {
    total_requests: i64,
    successful_requests: i64,
    failed_requests: i64,
    success_rate_percent: f64,
    average_processing_time_seconds: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl From<InsightsStatsRow> for StatsData {
    fn from(row: InsightsStatsRow) -> Self {
        Self {
            success_rate_percent: round2(row.success_rate_percent()),
            average_processing_time_seconds: round2(row.average_processing_time_secs),
            total_requests: row.total_requests,
            successful_requests: row.successful_requests,
            failed_requests: row.failed_requests,
        }
    }
}

pub(super) async fn get_stats(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<StatsData>>, ApiError> {
    let pool = state.require_pool(&req_id.0)?;

    let row = shopinsight_db::insights_stats(pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: StatsData::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}
