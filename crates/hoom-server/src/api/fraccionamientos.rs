//! Fraccionamiento (residential development) catalog handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, map_write_error, ApiError, ApiResponse, AppState, ResponseMeta};

const MAX_NOMBRE_LEN: usize = 200;

#[derive(Debug, Serialize)]
pub(super) struct FraccionamientoItem {
    pub id: i64,
    pub nombre: String,
    pub created_at: DateTime<Utc>,
}

impl From<hoom_db::FraccionamientoRow> for FraccionamientoItem {
    fn from(row: hoom_db::FraccionamientoRow) -> Self {
        Self {
            id: row.id,
            nombre: row.nombre,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct FraccionamientoBody {
    pub nombre: String,
}

fn validate_nombre(rid: &str, raw: &str) -> Result<String, ApiError> {
    let nombre = raw.trim();
    if nombre.is_empty() || nombre.chars().count() > MAX_NOMBRE_LEN {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("nombre must be 1-{MAX_NOMBRE_LEN} characters"),
        ));
    }
    Ok(nombre.to_owned())
}

pub(super) async fn list_fraccionamientos(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<FraccionamientoItem>>>, ApiError> {
    let rows = hoom_db::list_fraccionamientos(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(FraccionamientoItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_fraccionamiento(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<FraccionamientoBody>,
) -> Result<(StatusCode, Json<ApiResponse<FraccionamientoItem>>), ApiError> {
    let rid = &req_id.0;
    let nombre = validate_nombre(rid, &body.nombre)?;

    let row = hoom_db::create_fraccionamiento(&state.pool, &nombre)
        .await
        .map_err(|e| map_write_error(rid, "fraccionamiento", &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: FraccionamientoItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn rename_fraccionamiento(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<FraccionamientoBody>,
) -> Result<Json<ApiResponse<FraccionamientoItem>>, ApiError> {
    let rid = &req_id.0;
    let nombre = validate_nombre(rid, &body.nombre)?;

    let row = hoom_db::rename_fraccionamiento(&state.pool, id, &nombre)
        .await
        .map_err(|e| map_write_error(rid, "fraccionamiento", &e))?;

    Ok(Json(ApiResponse {
        data: FraccionamientoItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Listings pointing at the deleted development keep existing unassigned.
pub(super) async fn delete_fraccionamiento(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    hoom_db::delete_fraccionamiento(&state.pool, id)
        .await
        .map_err(|e| map_write_error(&req_id.0, "fraccionamiento", &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
