//! Listing handlers.
//!
//! - `GET    /api/v1/listings`      : filtered page (explicit params + optional `q` prompt)
//! - `POST   /api/v1/listings`      : create
//! - `GET    /api/v1/listings/{id}` : detail with derived age and price per m²
//! - `PATCH  /api/v1/listings/{id}` : sparse update
//! - `DELETE /api/v1/listings/{id}` : delete

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use hoom_core::{ListingFilters, ListingRecord, ListingType, MarketScope, PropertyType};
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{
    double_option, map_db_error, map_write_error, normalize_limit, normalize_offset, ApiError,
    ApiResponse, AppState, ResponseMeta,
};

const MAX_TEXT_LEN: usize = 5_000;
const MAX_COUNT: u32 = 1_000;

// ---------------------------------------------------------------------------
// Query and response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(super) struct ListingQuery {
    pub scope: Option<String>,
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    pub promoter_id: Option<i64>,
    pub fraccionamiento_id: Option<i64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub min_construction_area_m2: Option<f64>,
    pub min_land_area_m2: Option<f64>,
    pub max_land_area_m2: Option<f64>,
    pub exact_levels: Option<u32>,
    pub is_new: Option<bool>,
    /// Free-text prompt merged on top of the explicit filters.
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct ListingItem {
    #[serde(flatten)]
    record: ListingRecord,
    current_days_on_market: Option<u64>,
    price_per_area: Option<f64>,
}

impl From<ListingRecord> for ListingItem {
    fn from(record: ListingRecord) -> Self {
        Self {
            current_days_on_market: hoom_core::days_on_market(&record, Utc::now()),
            price_per_area: record.price_per_area(),
            record,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter resolution
// ---------------------------------------------------------------------------

pub(super) fn parse_scope(rid: &str, raw: Option<&str>) -> Result<MarketScope, ApiError> {
    Ok(parse_optional_code(rid, raw)?.unwrap_or_default())
}

fn parse_code<T>(rid: &str, raw: &str) -> Result<T, ApiError>
where
    T: std::str::FromStr<Err = hoom_core::CoreError>,
{
    raw.parse::<T>()
        .map_err(|e| ApiError::new(rid, "validation_error", e.to_string()))
}

fn parse_optional_code<T>(rid: &str, raw: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: std::str::FromStr<Err = hoom_core::CoreError>,
{
    raw.map(|s| parse_code(rid, s)).transpose()
}

/// Builds the filter state for a request: explicit params first, then the
/// `q` prompt parsed in the requested scope and merged on top.
pub(super) fn resolve_filters(rid: &str, query: &ListingQuery) -> Result<ListingFilters, ApiError> {
    let scope = parse_scope(rid, query.scope.as_deref())?;
    let base = ListingFilters::for_scope(scope);

    let property_type = parse_optional_code::<PropertyType>(rid, query.property_type.as_deref())?;
    if scope == MarketScope::Land && property_type.is_some_and(|t| t != PropertyType::Land) {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "property_type must be terreno in land scope",
        ));
    }

    let mut filters = ListingFilters {
        scope,
        property_type: property_type.or(base.property_type),
        listing_type: parse_optional_code::<ListingType>(rid, query.listing_type.as_deref())?,
        promoter_id: query.promoter_id,
        fraccionamiento_id: query.fraccionamiento_id,
        min_price: query.min_price,
        max_price: query.max_price,
        min_bedrooms: query.min_bedrooms,
        min_bathrooms: query.min_bathrooms,
        min_construction_area_m2: query.min_construction_area_m2,
        min_land_area_m2: query.min_land_area_m2,
        max_land_area_m2: query.max_land_area_m2,
        exact_levels: query.exact_levels,
        is_new: query.is_new,
    };

    if let Some(prompt) = query.q.as_deref().filter(|q| !q.trim().is_empty()) {
        let criteria = hoom_core::parse_in_scope(prompt, scope);
        tracing::debug!(%scope, ?criteria, "merging prompt filters");
        filters.merge(&criteria);
    }

    validate_bound(rid, "min_price", filters.min_price)?;
    validate_bound(rid, "max_price", filters.max_price)?;
    validate_bound(rid, "min_construction_area_m2", filters.min_construction_area_m2)?;
    validate_bound(rid, "min_land_area_m2", filters.min_land_area_m2)?;
    validate_bound(rid, "max_land_area_m2", filters.max_land_area_m2)?;

    Ok(filters)
}

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct CreateListingRequest {
    pub property_type: String,
    pub listing_type: String,
    pub price: Option<f64>,
    pub construction_area_m2: Option<f64>,
    pub land_area_m2: Option<f64>,
    pub bedrooms: Option<u32>,
    pub full_bathrooms: Option<u32>,
    pub half_bathrooms: Option<u32>,
    pub parking_spaces: Option<u32>,
    pub levels: Option<u32>,
    #[serde(default)]
    pub is_new_property: bool,
    pub publication_date: Option<NaiveDate>,
    pub days_on_market: Option<u32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_text: Option<String>,
    pub property_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub promoter_id: Option<i64>,
    pub fraccionamiento_id: Option<i64>,
    #[serde(default)]
    pub photos: Vec<String>,
}

// Outer None = "not in request" (keep current), Some(None) = "clear",
// Some(Some(v)) = "set".
#[allow(clippy::option_option)]
#[derive(Debug, Default, Deserialize)]
pub(super) struct UpdateListingRequest {
    pub property_type: Option<String>,
    pub listing_type: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub price: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub construction_area_m2: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub land_area_m2: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bedrooms: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub full_bathrooms: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub half_bathrooms: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub parking_spaces: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub levels: Option<Option<u32>>,
    pub is_new_property: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub publication_date: Option<Option<NaiveDate>>,
    #[serde(default, deserialize_with = "double_option")]
    pub days_on_market: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_text: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub property_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub latitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub longitude: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub promoter_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub fraccionamiento_id: Option<Option<i64>>,
    pub photos: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn validate_amount(rid: &str, field: &str, value: Option<f64>, max: f64) -> Result<(), ApiError> {
    match value {
        Some(v) if !v.is_finite() || !(0.0..=max).contains(&v) => Err(ApiError::new(
            rid,
            "validation_error",
            format!("{field} must be between 0 and {max}, got {v}"),
        )),
        _ => Ok(()),
    }
}

fn validate_bound(rid: &str, field: &str, value: Option<f64>) -> Result<(), ApiError> {
    match value {
        Some(v) if !v.is_finite() => Err(ApiError::new(
            rid,
            "validation_error",
            format!("{field} must be a finite number"),
        )),
        _ => Ok(()),
    }
}

fn validate_count(rid: &str, field: &str, value: Option<u32>) -> Result<(), ApiError> {
    match value {
        Some(v) if v > MAX_COUNT => Err(ApiError::new(
            rid,
            "validation_error",
            format!("{field} must be at most {MAX_COUNT}, got {v}"),
        )),
        _ => Ok(()),
    }
}

fn validate_coordinate(rid: &str, field: &str, value: Option<f64>, bound: f64) -> Result<(), ApiError> {
    match value {
        Some(v) if !v.is_finite() || v.abs() > bound => Err(ApiError::new(
            rid,
            "validation_error",
            format!("{field} must be within ±{bound}, got {v}"),
        )),
        _ => Ok(()),
    }
}

fn validate_text(rid: &str, field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) if v.len() > MAX_TEXT_LEN => Err(ApiError::new(
            rid,
            "validation_error",
            format!("{field} must be at most {MAX_TEXT_LEN} bytes"),
        )),
        _ => Ok(()),
    }
}

/// Values being written by a create or update. `None` means the request
/// leaves the field alone or clears it, which needs no check.
struct WriteValues<'a> {
    amounts: [(&'static str, Option<f64>, f64); 3],
    counts: [(&'static str, Option<u32>); 5],
    latitude: Option<f64>,
    longitude: Option<f64>,
    texts: [(&'static str, Option<&'a str>); 4],
}

fn validate_write(rid: &str, values: &WriteValues<'_>) -> Result<(), ApiError> {
    for (field, value, max) in values.amounts {
        validate_amount(rid, field, value, max)?;
    }
    for (field, value) in values.counts {
        validate_count(rid, field, value)?;
    }
    validate_coordinate(rid, "latitude", values.latitude, 90.0)?;
    validate_coordinate(rid, "longitude", values.longitude, 180.0)?;
    for (field, value) in values.texts {
        validate_text(rid, field, value)?;
    }
    Ok(())
}

fn validate_create(rid: &str, body: &CreateListingRequest) -> Result<(), ApiError> {
    validate_write(
        rid,
        &WriteValues {
            amounts: [
                ("price", body.price, hoom_db::MAX_PRICE),
                ("construction_area_m2", body.construction_area_m2, hoom_db::MAX_AREA_M2),
                ("land_area_m2", body.land_area_m2, hoom_db::MAX_AREA_M2),
            ],
            counts: [
                ("bedrooms", body.bedrooms),
                ("full_bathrooms", body.full_bathrooms),
                ("half_bathrooms", body.half_bathrooms),
                ("parking_spaces", body.parking_spaces),
                ("levels", body.levels),
            ],
            latitude: body.latitude,
            longitude: body.longitude,
            texts: [
                ("title", body.title.as_deref()),
                ("description", body.description.as_deref()),
                ("location_text", body.location_text.as_deref()),
                ("property_url", body.property_url.as_deref()),
            ],
        },
    )
}

fn validate_update(rid: &str, body: &UpdateListingRequest) -> Result<(), ApiError> {
    validate_write(
        rid,
        &WriteValues {
            amounts: [
                ("price", body.price.flatten(), hoom_db::MAX_PRICE),
                (
                    "construction_area_m2",
                    body.construction_area_m2.flatten(),
                    hoom_db::MAX_AREA_M2,
                ),
                ("land_area_m2", body.land_area_m2.flatten(), hoom_db::MAX_AREA_M2),
            ],
            counts: [
                ("bedrooms", body.bedrooms.flatten()),
                ("full_bathrooms", body.full_bathrooms.flatten()),
                ("half_bathrooms", body.half_bathrooms.flatten()),
                ("parking_spaces", body.parking_spaces.flatten()),
                ("levels", body.levels.flatten()),
            ],
            latitude: body.latitude.flatten(),
            longitude: body.longitude.flatten(),
            texts: [
                ("title", body.title.as_ref().and_then(Option::as_deref)),
                ("description", body.description.as_ref().and_then(Option::as_deref)),
                ("location_text", body.location_text.as_ref().and_then(Option::as_deref)),
                ("property_url", body.property_url.as_ref().and_then(Option::as_deref)),
            ],
        },
    )
}

/// An update that sets `days_on_market` without touching `publication_date`
/// also moves the publication date to match the typed age.
#[allow(clippy::option_option)]
fn implied_publication_date(
    publication_date: Option<Option<NaiveDate>>,
    days_on_market: Option<Option<u32>>,
    as_of: chrono::DateTime<Utc>,
) -> Option<Option<NaiveDate>> {
    match (publication_date, days_on_market) {
        (None, Some(Some(days))) => hoom_core::publication_date_from_days(days, as_of).map(Some),
        (given, _) => given,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn list_listings(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<ListingQuery>,
) -> Result<Json<ApiResponse<Vec<ListingItem>>>, ApiError> {
    let rid = &req_id.0;
    let filters = resolve_filters(rid, &query)?;

    let rows = hoom_db::list_listings(
        &state.pool,
        &filters,
        normalize_limit(query.limit),
        normalize_offset(query.offset),
    )
    .await
    .map_err(|e| map_db_error(rid.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| row.into_record().map(ListingItem::from))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ListingItem>>, ApiError> {
    let rid = &req_id.0;
    let row = hoom_db::get_listing(&state.pool, id)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?
        .ok_or_else(|| ApiError::new(rid, "not_found", format!("listing {id} not found")))?;

    let record = row
        .into_record()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ListingItem::from(record),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// POST /api/v1/listings
pub(super) async fn create_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<CreateListingRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ListingItem>>), ApiError> {
    let rid = &req_id.0;

    let property_type = parse_code::<PropertyType>(rid, &body.property_type)?;
    let listing_type = parse_code::<ListingType>(rid, &body.listing_type)?;
    validate_create(rid, &body)?;

    let listing = hoom_db::NewListing {
        price: body.price,
        construction_area_m2: body.construction_area_m2,
        land_area_m2: body.land_area_m2,
        bedrooms: body.bedrooms,
        full_bathrooms: body.full_bathrooms,
        half_bathrooms: body.half_bathrooms,
        parking_spaces: body.parking_spaces,
        levels: body.levels,
        is_new_property: body.is_new_property,
        publication_date: body.publication_date.or_else(|| {
            body.days_on_market
                .and_then(|days| hoom_core::publication_date_from_days(days, Utc::now()))
        }),
        days_on_market: body.days_on_market,
        title: body.title,
        description: body.description,
        location_text: body.location_text,
        property_url: body.property_url,
        latitude: body.latitude,
        longitude: body.longitude,
        promoter_id: body.promoter_id,
        fraccionamiento_id: body.fraccionamiento_id,
        photos: body.photos,
        ..hoom_db::NewListing::new(property_type, listing_type)
    };

    let record = hoom_db::create_listing(&state.pool, &listing)
        .await
        .map_err(|e| map_write_error(rid, "listing", &e))?
        .into_record()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse {
            data: ListingItem::from(record),
            meta: ResponseMeta::new(req_id.0),
        }),
    ))
}

/// PATCH /api/v1/listings/{id}
pub(super) async fn update_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateListingRequest>,
) -> Result<Json<ApiResponse<ListingItem>>, ApiError> {
    let rid = &req_id.0;

    let property_type = parse_optional_code::<PropertyType>(rid, body.property_type.as_deref())?;
    let listing_type = parse_optional_code::<ListingType>(rid, body.listing_type.as_deref())?;
    validate_update(rid, &body)?;

    let update = hoom_db::ListingUpdate {
        property_type,
        listing_type,
        price: body.price,
        construction_area_m2: body.construction_area_m2,
        land_area_m2: body.land_area_m2,
        bedrooms: body.bedrooms,
        full_bathrooms: body.full_bathrooms,
        half_bathrooms: body.half_bathrooms,
        parking_spaces: body.parking_spaces,
        levels: body.levels,
        is_new_property: body.is_new_property,
        publication_date: implied_publication_date(
            body.publication_date,
            body.days_on_market,
            Utc::now(),
        ),
        days_on_market: body.days_on_market,
        title: body.title,
        description: body.description,
        location_text: body.location_text,
        property_url: body.property_url,
        latitude: body.latitude,
        longitude: body.longitude,
        promoter_id: body.promoter_id,
        fraccionamiento_id: body.fraccionamiento_id,
        photos: body.photos,
    };

    let record = hoom_db::update_listing(&state.pool, id, &update)
        .await
        .map_err(|e| map_write_error(rid, "listing", &e))?
        .into_record()
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: ListingItem::from(record),
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// DELETE /api/v1/listings/{id}
pub(super) async fn delete_listing(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    let rid = &req_id.0;
    hoom_db::delete_listing(&state.pool, id)
        .await
        .map_err(|e| map_write_error(rid, "listing", &e))?;

    Ok(Json(ApiResponse {
        data: serde_json::json!({ "deleted": true }),
        meta: ResponseMeta::new(req_id.0),
    }))
}
