use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Serialize)]
pub(super) struct InventoryItem {
    pub total_listings: i64,
    pub new_houses: i64,
    pub used_houses: i64,
    pub new_apartments: i64,
    pub used_apartments: i64,
    pub land: i64,
    pub promoters: i64,
}

pub(super) async fn inventory(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<InventoryItem>>, ApiError> {
    let counts = hoom_db::inventory_counts(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: InventoryItem {
            total_listings: counts.total_listings,
            new_houses: counts.new_houses,
            used_houses: counts.used_houses,
            new_apartments: counts.new_apartments,
            used_apartments: counts.used_apartments,
            land: counts.land,
            promoters: counts.promoters,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
