use axum::{extract::Query, Extension, Json};
use hoom_core::{FilterCriteria, MarketScope};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{listings::parse_scope, ApiError, ApiResponse, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct ParseQuery {
    #[serde(default)]
    pub q: String,
    pub scope: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct ParseResult {
    pub scope: MarketScope,
    pub criteria: FilterCriteria,
}

/// GET /api/v1/search/parse. Previews what a prompt would filter on without
/// touching the database.
pub(super) async fn parse_prompt(
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ParseQuery>,
) -> Result<Json<ApiResponse<ParseResult>>, ApiError> {
    let scope = parse_scope(&req_id.0, query.scope.as_deref())?;
    let criteria = hoom_core::parse_in_scope(&query.q, scope);

    Ok(Json(ApiResponse {
        data: ParseResult { scope, criteria },
        meta: ResponseMeta::new(req_id.0),
    }))
}
