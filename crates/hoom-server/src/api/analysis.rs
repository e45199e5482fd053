use axum::{
    extract::{Query, State},
    Extension, Json,
};
use hoom_core::{ListingFilters, MarketScope, MetricsSummary};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{
    listings::{resolve_filters, ListingQuery},
    map_db_error, ApiError, ApiResponse, AppState, ResponseMeta,
};

#[derive(Debug, Serialize)]
pub(super) struct AnalysisItem {
    pub scope: MarketScope,
    pub filters: ListingFilters,
    pub summary: MetricsSummary,
}

/// GET /api/v1/analysis/summary
///
/// Accepts the same parameters as the listing search. `limit` and `offset`
/// are ignored: the summary always covers every matching listing.
pub(super) async fn summary(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ApiResponse<AnalysisItem>>, ApiError> {
    let rid = &req_id.0;
    let filters = resolve_filters(rid, &query)?;

    let records = hoom_db::list_all_listings(&state.pool, &filters)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .into_iter()
        .map(hoom_db::ListingRow::into_record)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let summary = hoom_core::summarize(&records, filters.scope);
    tracing::debug!(scope = %filters.scope, count = summary.count, "analysis summary computed");

    Ok(Json(ApiResponse {
        data: AnalysisItem {
            scope: filters.scope,
            filters,
            summary,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
