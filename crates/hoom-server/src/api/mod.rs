mod analysis;
mod fraccionamientos;
mod listings;
mod metrics;
mod promoters;
mod search;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::PgPool;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_bearer_auth, AuthState, RateLimitState, RequestId,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(50).clamp(1, 200)
}

pub(super) fn normalize_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

pub(super) fn map_db_error(request_id: String, error: &hoom_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

/// Maps write failures: missing rows become 404, constraint violations the
/// client can fix become 400/409, everything else is an internal error.
pub(super) fn map_write_error(request_id: &str, entity: &str, error: &hoom_db::DbError) -> ApiError {
    match error {
        hoom_db::DbError::NotFound => {
            return ApiError::new(request_id, "not_found", format!("{entity} not found"));
        }
        hoom_db::DbError::OutOfRange { .. } => {
            return ApiError::new(request_id, "validation_error", error.to_string());
        }
        _ => {}
    }
    if let hoom_db::DbError::Sqlx(sqlx::Error::Database(db_err)) = error {
        match db_err.code().as_deref() {
            Some("23505") => {
                return ApiError::new(request_id, "conflict", format!("{entity} already exists"));
            }
            Some("23503") => {
                return ApiError::new(
                    request_id,
                    "validation_error",
                    "referenced promoter or fraccionamiento does not exist",
                );
            }
            Some("23514" | "22003") => {
                return ApiError::new(
                    request_id,
                    "validation_error",
                    format!("{entity} violates a value constraint"),
                );
            }
            _ => {}
        }
    }
    map_db_error(request_id.to_owned(), error)
}

/// Deserializes a PATCH field so that an absent key stays `None` while an
/// explicit `null` becomes `Some(None)`. Pair with `#[serde(default)]`.
#[allow(clippy::option_option)]
pub(super) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
        ])
}

fn protected_router(auth: AuthState, rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/listings",
            get(listings::list_listings).post(listings::create_listing),
        )
        .route(
            "/api/v1/listings/{id}",
            get(listings::get_listing)
                .patch(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .route("/api/v1/search/parse", get(search::parse_prompt))
        .route("/api/v1/analysis/summary", get(analysis::summary))
        .route("/api/v1/metrics/inventory", get(metrics::inventory))
        .route(
            "/api/v1/promoters",
            get(promoters::list_promoters).post(promoters::create_promoter),
        )
        .route(
            "/api/v1/promoters/{id}",
            get(promoters::get_promoter)
                .patch(promoters::update_promoter)
                .delete(promoters::delete_promoter),
        )
        .route(
            "/api/v1/fraccionamientos",
            get(fraccionamientos::list_fraccionamientos)
                .post(fraccionamientos::create_fraccionamiento),
        )
        .route(
            "/api/v1/fraccionamientos/{id}",
            patch(fraccionamientos::rename_fraccionamiento)
                .delete(fraccionamientos::delete_fraccionamiento),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn_with_state(
                    rate_limit,
                    enforce_rate_limit,
                ))
                .layer(axum::middleware::from_fn_with_state(
                    auth,
                    require_bearer_auth,
                )),
        )
}

pub fn build_app(state: AppState, auth: AuthState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(protected_router(auth, rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match hoom_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn rate_limit_state(per_minute: u32) -> RateLimitState {
    RateLimitState::new(per_minute as usize, Duration::from_secs(60))
}

#[cfg(test)]
pub fn default_rate_limit_state() -> RateLimitState {
    rate_limit_state(120)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn dev_app(pool: sqlx::PgPool) -> Router {
        let auth = AuthState::from_keys("", true).expect("auth");
        build_app(AppState { pool }, auth, default_rate_limit_state())
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<serde_json::Value>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json parse")
        };
        (status, json)
    }

    async fn seed_listing(pool: &sqlx::PgPool, property_type: &str, price: i64, bedrooms: i32, area: i64) -> i64 {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO listings \
               (property_type, listing_type, price, bedrooms, construction_area_m2, land_area_m2) \
             VALUES ($1, 'venta', $2, $3, $4, $4) RETURNING id",
        )
        .bind(property_type)
        .bind(rust_decimal::Decimal::from(price))
        .bind(bedrooms)
        .bind(rust_decimal::Decimal::from(area))
        .fetch_one(pool)
        .await
        .expect("seed_listing failed")
    }

    // -------------------------------------------------------------------------
    // Pure helpers
    // -------------------------------------------------------------------------

    #[test]
    fn normalize_limit_applies_defaults_and_bounds() {
        assert_eq!(normalize_limit(None), 50);
        assert_eq!(normalize_limit(Some(0)), 1);
        assert_eq!(normalize_limit(Some(1_000)), 200);
        assert_eq!(normalize_limit(Some(25)), 25);
    }

    #[test]
    fn normalize_offset_never_goes_negative() {
        assert_eq!(normalize_offset(None), 0);
        assert_eq!(normalize_offset(Some(-10)), 0);
        assert_eq!(normalize_offset(Some(40)), 40);
    }

    #[test]
    fn api_error_codes_map_to_statuses() {
        let cases = [
            ("validation_error", StatusCode::BAD_REQUEST),
            ("not_found", StatusCode::NOT_FOUND),
            ("conflict", StatusCode::CONFLICT),
            ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
            ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (code, status) in cases {
            let response = ApiError::new("req-1", code, "msg").into_response();
            assert_eq!(response.status(), status, "code {code}");
        }
    }

    #[test]
    fn map_write_error_turns_not_found_into_404() {
        let err = map_write_error("req-1", "listing", &hoom_db::DbError::NotFound);
        assert_eq!(err.error.code, "not_found");
        assert_eq!(err.error.message, "listing not found");
    }

    #[test]
    fn map_write_error_turns_out_of_range_into_400() {
        let err = map_write_error(
            "req-1",
            "listing",
            &hoom_db::DbError::OutOfRange {
                field: "price",
                value: 1e30,
            },
        );
        assert_eq!(err.error.code, "validation_error");
        assert!(err.error.message.contains("price"));
    }

    #[test]
    fn double_option_distinguishes_null_from_absent() {
        #[derive(Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "double_option")]
            #[allow(clippy::option_option)]
            title: Option<Option<String>>,
        }

        let absent: Patch = serde_json::from_str("{}").unwrap();
        let null: Patch = serde_json::from_str(r#"{"title":null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"title":"Casa"}"#).unwrap();
        assert_eq!(absent.title, None);
        assert_eq!(null.title, Some(None));
        assert_eq!(set.title, Some(Some("Casa".to_string())));
    }

    // -------------------------------------------------------------------------
    // Routes (with DB)
    // -------------------------------------------------------------------------

    #[sqlx::test(migrations = "../../migrations")]
    async fn health_reports_ok(pool: sqlx::PgPool) {
        let (status, json) = send(dev_app(pool), "GET", "/api/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["status"], "ok");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn protected_routes_require_bearer_token_when_enabled(pool: sqlx::PgPool) {
        let auth = AuthState::from_keys("secret-key", false).expect("auth");
        let app = build_app(AppState { pool }, auth, default_rate_limit_state());

        let (status, json) = send(app.clone(), "GET", "/api/v1/listings", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"]["code"], "unauthorized");

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/listings")
                    .header(header::AUTHORIZATION, "Bearer secret-key")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn rate_limit_rejects_requests_over_the_window(pool: sqlx::PgPool) {
        let auth = AuthState::from_keys("", true).expect("auth");
        let app = build_app(AppState { pool }, auth, rate_limit_state(1));

        let (first, _) = send(app.clone(), "GET", "/api/v1/search/parse?q=casas", None).await;
        let (second, json) = send(app, "GET", "/api/v1/search/parse?q=casas", None).await;
        assert_eq!(first, StatusCode::OK);
        assert_eq!(second, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["error"]["code"], "rate_limited");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_parse_returns_criteria(pool: sqlx::PgPool) {
        let uri = "/api/v1/search/parse?q=casas%20con%20m%C3%A1s%20de%203%20habitaciones%20y%20menos%20de%20%242000000";
        let (status, json) = send(dev_app(pool), "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["scope"], "general");
        assert_eq!(json["data"]["criteria"]["min_bedrooms"], 3);
        assert_eq!(json["data"]["criteria"]["max_price"], 2_000_000.0);
        assert!(json["data"]["criteria"]["min_price"].is_null());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn search_parse_rejects_unknown_scope(pool: sqlx::PgPool) {
        let (status, json) = send(dev_app(pool), "GET", "/api/v1/search/parse?q=x&scope=oficinas", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_listings_merges_prompt_over_explicit_filters(pool: sqlx::PgPool) {
        seed_listing(&pool, "casa", 1_800_000, 3, 150).await;
        seed_listing(&pool, "casa", 2_500_000, 4, 220).await;
        seed_listing(&pool, "casa", 1_900_000, 2, 120).await;

        // The explicit max_price is overridden by the prompt's upper bound.
        let uri = "/api/v1/listings?max_price=3000000&q=menos%20de%202000000%20con%203%20habitaciones";
        let (status, json) = send(dev_app(pool), "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let data = json["data"].as_array().expect("data array");
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["bedrooms"], 3);
        assert!(data[0]["price_per_area"].as_f64().is_some());
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn list_listings_rejects_unknown_property_type(pool: sqlx::PgPool) {
        let (status, json) = send(dev_app(pool), "GET", "/api/v1/listings?property_type=castillo", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn listing_crud_through_the_api(pool: sqlx::PgPool) {
        let app = dev_app(pool);

        let (status, created) = send(
            app.clone(),
            "POST",
            "/api/v1/listings",
            Some(serde_json::json!({
                "property_type": "departamento",
                "listing_type": "renta",
                "price": 18000,
                "construction_area_m2": 90,
                "bedrooms": 2,
                "days_on_market": 5,
                "title": "Depto en San Pedro"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["data"]["id"].as_i64().expect("id");
        // Stored age plus the (partial, rounded up) time since capture.
        let age = created["data"]["current_days_on_market"].as_u64();
        assert!(matches!(age, Some(5 | 6)), "unexpected age {age:?}");
        assert_eq!(created["data"]["price_per_area"], 200.0);
        // The typed age also fills the publication date.
        assert!(created["data"]["publication_date"].is_string());

        let (status, updated) = send(
            app.clone(),
            "PATCH",
            &format!("/api/v1/listings/{id}"),
            Some(serde_json::json!({ "price": 17000, "title": null })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["data"]["price"], 17000.0);
        assert!(updated["data"]["title"].is_null());
        assert_eq!(updated["data"]["bedrooms"], 2);

        let (status, _) = send(app.clone(), "DELETE", &format!("/api/v1/listings/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, json) = send(app, "GET", &format!("/api/v1/listings/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["code"], "not_found");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_listing_validates_body(pool: sqlx::PgPool) {
        let (status, json) = send(
            dev_app(pool),
            "POST",
            "/api/v1/listings",
            Some(serde_json::json!({
                "property_type": "casa",
                "listing_type": "venta",
                "price": -1
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn oversized_price_is_rejected_instead_of_stored_as_null(pool: sqlx::PgPool) {
        let app = dev_app(pool);
        let (status, json) = send(
            app.clone(),
            "POST",
            "/api/v1/listings",
            Some(serde_json::json!({
                "property_type": "casa",
                "listing_type": "venta",
                "price": 1e30
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");

        let (status, json) = send(app, "GET", "/api/v1/listings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn oversized_prompt_bound_excludes_everything(pool: sqlx::PgPool) {
        seed_listing(&pool, "casa", 5_000_000, 3, 200).await;
        let uri = "/api/v1/listings?q=m%C3%A1s%20de%20999999999999999999999999999999";
        let (status, json) = send(dev_app(pool), "GET", uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"].as_array().map(Vec::len), Some(0));
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn create_listing_with_unknown_promoter_is_validation_error(pool: sqlx::PgPool) {
        let (status, json) = send(
            dev_app(pool),
            "POST",
            "/api/v1/listings",
            Some(serde_json::json!({
                "property_type": "casa",
                "listing_type": "venta",
                "promoter_id": 9999
            })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn analysis_summary_uses_land_scope(pool: sqlx::PgPool) {
        seed_listing(&pool, "terreno", 1_000_000, 0, 500).await;
        seed_listing(&pool, "terreno", 600_000, 0, 200).await;
        seed_listing(&pool, "casa", 9_000_000, 4, 300).await;

        let (status, json) = send(dev_app(pool), "GET", "/api/v1/analysis/summary?scope=land", None).await;
        assert_eq!(status, StatusCode::OK);
        let summary = &json["data"]["summary"];
        assert_eq!(summary["count"], 2);
        assert_eq!(summary["median_price"], 800_000.0);
        assert_eq!(summary["median_price_per_area"], 2_500.0);
        assert_eq!(json["data"]["filters"]["property_type"], "terreno");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn analysis_summary_of_nothing_is_zero(pool: sqlx::PgPool) {
        let (status, json) = send(dev_app(pool), "GET", "/api/v1/analysis/summary", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["summary"]["count"], 0);
        assert_eq!(json["data"]["summary"]["median_price"], 0.0);
        assert_eq!(json["data"]["summary"]["average_days_on_market"], 0.0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn inventory_counts_listings_and_promoters(pool: sqlx::PgPool) {
        seed_listing(&pool, "casa", 1, 1, 1).await;
        seed_listing(&pool, "terreno", 1, 0, 1).await;

        let (status, json) = send(dev_app(pool), "GET", "/api/v1/metrics/inventory", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["total_listings"], 2);
        assert_eq!(json["data"]["used_houses"], 1);
        assert_eq!(json["data"]["land"], 1);
        assert_eq!(json["data"]["promoters"], 0);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn promoter_routes_create_update_and_delete(pool: sqlx::PgPool) {
        let app = dev_app(pool);

        let (status, created) = send(
            app.clone(),
            "POST",
            "/api/v1/promoters",
            Some(serde_json::json!({ "name": "  Luis Cantú ", "company": "Habitat MTY" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["data"]["name"], "Luis Cantú");
        let id = created["data"]["id"].as_i64().expect("id");

        let (status, updated) = send(
            app.clone(),
            "PATCH",
            &format!("/api/v1/promoters/{id}"),
            Some(serde_json::json!({ "company": null, "email": "luis@example.com" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(updated["data"]["company"].is_null());
        assert_eq!(updated["data"]["email"], "luis@example.com");

        let (status, list) = send(app.clone(), "GET", "/api/v1/promoters", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["data"].as_array().map(Vec::len), Some(1));

        let (status, _) = send(app.clone(), "DELETE", &format!("/api/v1/promoters/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(app, "GET", &format!("/api/v1/promoters/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn promoter_requires_a_name(pool: sqlx::PgPool) {
        let (status, json) = send(
            dev_app(pool),
            "POST",
            "/api/v1/promoters",
            Some(serde_json::json!({ "name": "   " })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn duplicate_fraccionamiento_is_conflict(pool: sqlx::PgPool) {
        let app = dev_app(pool);
        let body = serde_json::json!({ "nombre": "Valle Oriente" });

        let (status, created) = send(app.clone(), "POST", "/api/v1/fraccionamientos", Some(body.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["data"]["id"].as_i64().expect("id");

        let (status, json) = send(app.clone(), "POST", "/api/v1/fraccionamientos", Some(body)).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["code"], "conflict");

        let (status, renamed) = send(
            app.clone(),
            "PATCH",
            &format!("/api/v1/fraccionamientos/{id}"),
            Some(serde_json::json!({ "nombre": "Valle Poniente" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["data"]["nombre"], "Valle Poniente");

        let (status, _) = send(app, "DELETE", &format!("/api/v1/fraccionamientos/{id}"), None).await;
        assert_eq!(status, StatusCode::OK);
    }
}
