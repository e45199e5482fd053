//! Promoter (listing agent) handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    double_option, map_db_error, map_write_error, ApiError, ApiResponse, AppState, ResponseMeta,
};

const MAX_NAME_LEN: usize = 200;
const MAX_CONTACT_LEN: usize = 320;

#[derive(Debug, Serialize)]
pub(super) struct PromoterItem {
    pub id: i64,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<hoom_db::PromoterRow> for PromoterItem {
    fn from(row: hoom_db::PromoterRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            company: row.company,
            phone: row.phone,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatePromoterRequest {
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[allow(clippy::option_option)]
#[derive(Debug, Deserialize)]
pub(super) struct UpdatePromoterRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub company: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub email: Option<Option<String>>,
}

fn validate_name(rid: &str, raw: &str) -> Result<String, ApiError> {
    let name = raw.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("name must be 1-{MAX_NAME_LEN} characters"),
        ));
    }
    Ok(name.to_owned())
}

/// Trims an optional contact field. Blank values are stored as NULL.
fn clean_contact(rid: &str, field: &str, raw: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(value) = raw.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if value.chars().count() > MAX_CONTACT_LEN {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("{field} must be at most {MAX_CONTACT_LEN} characters"),
        ));
    }
    if field == "email" && !value.contains('@') {
        return Err(ApiError::new(
            rid,
            "validation_error",
            format!("email '{value}' is not a valid address"),
        ));
    }
    Ok(Some(value))
}

pub(super) async fn list_promoters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<PromoterItem>>>, ApiError> {
    let rows = hoom_db::list_promoters(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows.into_iter().map(PromoterItem::from).collect(),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_promoter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PromoterItem>>, ApiError> {
    let rid = &req_id.0;
    let row = hoom_db::get_promoter(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("promoter {id} not found")))?;

    Ok(Json(ApiResponse {
        data: PromoterItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_promoter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreatePromoterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PromoterItem>>), ApiError> {
    let rid = &req_id.0;
    let promoter = hoom_db::NewPromoter {
        name: validate_name(rid, &body.name)?,
        company: clean_contact(rid, "company", body.company)?,
        phone: clean_contact(rid, "phone", body.phone)?,
        email: clean_contact(rid, "email", body.email)?,
    };

    let row = hoom_db::create_promoter(&state.pool, &promoter)
        .await
        .map_err(|e| map_write_error(rid, "promoter", &e))?;
    tracing::info!(promoter_id = row.id, "promoter created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: PromoterItem::from(row),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

pub(super) async fn update_promoter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdatePromoterRequest>,
) -> Result<Json<ApiResponse<PromoterItem>>, ApiError> {
    let rid = &req_id.0;
    let update = hoom_db::PromoterUpdate {
        name: body.name.map(|n| validate_name(rid, &n)).transpose()?,
        company: body
            .company
            .map(|v| clean_contact(rid, "company", v))
            .transpose()?,
        phone: body
            .phone
            .map(|v| clean_contact(rid, "phone", v))
            .transpose()?,
        email: body
            .email
            .map(|v| clean_contact(rid, "email", v))
            .transpose()?,
    };

    let row = hoom_db::update_promoter(&state.pool, id, &update)
        .await
        .map_err(|e| map_write_error(rid, "promoter", &e))?;

    Ok(Json(ApiResponse {
        data: PromoterItem::from(row),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn delete_promoter(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    hoom_db::delete_promoter(&state.pool, id)
        .await
        .map_err(|e| map_write_error(&req_id.0, "promoter", &e))?;
    tracing::info!(promoter_id = id, "promoter deleted");

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
