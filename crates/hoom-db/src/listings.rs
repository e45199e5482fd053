//! Database operations for the `listings` table.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use sqlx::PgPool;

use hoom_core::{ListingFilters, ListingRecord, ListingType, PropertyType};

use crate::{DbError, MAX_AREA_M2, MAX_PRICE};

const LISTING_COLUMNS: &str = "id, property_type, listing_type, price, construction_area_m2, \
     land_area_m2, bedrooms, full_bathrooms, half_bathrooms, parking_spaces, levels, \
     is_new_property, publication_date, days_on_market, title, description, location_text, \
     property_url, latitude, longitude, promoter_id, fraccionamiento_id, photos, created_at, \
     updated_at";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `listings` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub property_type: String,
    pub listing_type: String,
    pub price: Option<Decimal>,
    pub construction_area_m2: Option<Decimal>,
    pub land_area_m2: Option<Decimal>,
    pub bedrooms: Option<i32>,
    pub full_bathrooms: Option<i32>,
    pub half_bathrooms: Option<i32>,
    pub parking_spaces: Option<i32>,
    pub levels: Option<i32>,
    pub is_new_property: bool,
    pub publication_date: Option<NaiveDate>,
    pub days_on_market: Option<i32>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_text: Option<String>,
    pub property_url: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub promoter_id: Option<i64>,
    pub fraccionamiento_id: Option<i64>,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ListingRow {
    /// Converts storage types (codes, `NUMERIC`, `INTEGER`) into the domain
    /// record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::InvalidRow`] for an unknown type code or a negative
    /// count.
    pub fn into_record(self) -> Result<ListingRecord, DbError> {
        let id = self.id;
        let invalid = |reason: String| DbError::InvalidRow { id, reason };

        let property_type: PropertyType = self
            .property_type
            .parse()
            .map_err(|e: hoom_core::CoreError| invalid(e.to_string()))?;
        let listing_type: ListingType = self
            .listing_type
            .parse()
            .map_err(|e: hoom_core::CoreError| invalid(e.to_string()))?;

        let count = |column: &str, value: Option<i32>| -> Result<Option<u32>, DbError> {
            value
                .map(|v| u32::try_from(v).map_err(|_| invalid(format!("negative {column}: {v}"))))
                .transpose()
        };

        Ok(ListingRecord {
            id,
            property_type,
            listing_type,
            price: self.price.and_then(|d| d.to_f64()),
            construction_area_m2: self.construction_area_m2.and_then(|d| d.to_f64()),
            land_area_m2: self.land_area_m2.and_then(|d| d.to_f64()),
            bedrooms: count("bedrooms", self.bedrooms)?,
            full_bathrooms: count("full_bathrooms", self.full_bathrooms)?,
            half_bathrooms: count("half_bathrooms", self.half_bathrooms)?,
            parking_spaces: count("parking_spaces", self.parking_spaces)?,
            levels: count("levels", self.levels)?,
            is_new_property: self.is_new_property,
            publication_date: self.publication_date,
            days_on_market: count("days_on_market", self.days_on_market)?,
            created_at: self.created_at,
            title: self.title,
            description: self.description,
            location_text: self.location_text,
            property_url: self.property_url,
            latitude: self.latitude,
            longitude: self.longitude,
            promoter_id: self.promoter_id,
            fraccionamiento_id: self.fraccionamiento_id,
            photos: self.photos,
        })
    }
}

/// Values for a new listing. `created_at` is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub property_type: PropertyType,
    pub listing_type: ListingType,
    pub price: Option<f64>,
    pub construction_area_m2: Option<f64>,
    pub land_area_m2: Option<f64>,
    pub bedrooms: Option<u32>,
    pub full_bathrooms: Option<u32>,
    pub half_bathrooms: Option<u32>,
    pub parking_spaces: Option<u32>,
    pub levels: Option<u32>,
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
    pub photos: Vec<String>,
}

impl NewListing {
    #[must_use]
    pub fn new(property_type: PropertyType, listing_type: ListingType) -> Self {
        Self {
            property_type,
            listing_type,
            price: None,
            construction_area_m2: None,
            land_area_m2: None,
            bedrooms: None,
            full_bathrooms: None,
            half_bathrooms: None,
            parking_spaces: None,
            levels: None,
            is_new_property: false,
            publication_date: None,
            days_on_market: None,
            title: None,
            description: None,
            location_text: None,
            property_url: None,
            latitude: None,
            longitude: None,
            promoter_id: None,
            fraccionamiento_id: None,
            photos: Vec::new(),
        }
    }
}

/// Sparse update. For nullable columns:
///   - `None`          => keep existing value
///   - `Some(None)`    => set to NULL
///   - `Some(Some(v))` => set to `v`
#[derive(Debug, Clone, Default)]
#[allow(clippy::option_option)]
pub struct ListingUpdate {
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
    pub price: Option<Option<f64>>,
    pub construction_area_m2: Option<Option<f64>>,
    pub land_area_m2: Option<Option<f64>>,
    pub bedrooms: Option<Option<u32>>,
    pub full_bathrooms: Option<Option<u32>>,
    pub half_bathrooms: Option<Option<u32>>,
    pub parking_spaces: Option<Option<u32>>,
    pub levels: Option<Option<u32>>,
    pub is_new_property: Option<bool>,
    pub publication_date: Option<Option<NaiveDate>>,
    pub days_on_market: Option<Option<u32>>,
    pub title: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub location_text: Option<Option<String>>,
    pub property_url: Option<Option<String>>,
    pub latitude: Option<Option<f64>>,
    pub longitude: Option<Option<f64>>,
    pub promoter_id: Option<Option<i64>>,
    pub fraccionamiento_id: Option<Option<i64>>,
    pub photos: Option<Vec<String>>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns one page of listings matching `filters`, newest first.
///
/// Every filter field is an optional predicate: `min_*` is `>=`, `max_*` is
/// `<=`, everything else is equality. A NULL column never satisfies a set
/// predicate.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_listings(
    pool: &PgPool,
    filters: &ListingFilters,
    limit: i64,
    offset: i64,
) -> Result<Vec<ListingRow>, DbError> {
    query_filtered(pool, filters, Some(limit), offset).await
}

/// Returns every listing matching `filters`. Used for analysis, which must
/// see the whole matching set rather than one page.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_all_listings(
    pool: &PgPool,
    filters: &ListingFilters,
) -> Result<Vec<ListingRow>, DbError> {
    query_filtered(pool, filters, None, 0).await
}

async fn query_filtered(
    pool: &PgPool,
    filters: &ListingFilters,
    limit: Option<i64>,
    offset: i64,
) -> Result<Vec<ListingRow>, DbError> {
    tracing::debug!(?filters, ?limit, offset, "querying listings");

    let min_price = bound_decimal("min_price", filters.min_price)?;
    let max_price = bound_decimal("max_price", filters.max_price)?;
    let min_construction = bound_decimal(
        "min_construction_area_m2",
        filters.min_construction_area_m2,
    )?;
    let min_land = bound_decimal("min_land_area_m2", filters.min_land_area_m2)?;
    let max_land = bound_decimal("max_land_area_m2", filters.max_land_area_m2)?;

    let sql = format!(
        "SELECT {LISTING_COLUMNS} \
         FROM listings \
         WHERE ($1::TEXT IS NULL OR property_type = $1) \
           AND ($2::TEXT IS NULL OR listing_type = $2) \
           AND ($3::BIGINT IS NULL OR promoter_id = $3) \
           AND ($4::BIGINT IS NULL OR fraccionamiento_id = $4) \
           AND ($5::NUMERIC IS NULL OR price >= $5) \
           AND ($6::NUMERIC IS NULL OR price <= $6) \
           AND ($7::BIGINT IS NULL OR bedrooms >= $7) \
           AND ($8::BIGINT IS NULL OR full_bathrooms >= $8) \
           AND ($9::NUMERIC IS NULL OR construction_area_m2 >= $9) \
           AND ($10::NUMERIC IS NULL OR land_area_m2 >= $10) \
           AND ($11::NUMERIC IS NULL OR land_area_m2 <= $11) \
           AND ($12::BIGINT IS NULL OR levels = $12) \
           AND ($13::BOOL IS NULL OR is_new_property = $13) \
         ORDER BY created_at DESC, id DESC \
         LIMIT $14 OFFSET $15"
    );

    let rows = sqlx::query_as::<_, ListingRow>(&sql)
        .bind(filters.property_type.map(PropertyType::as_str))
        .bind(filters.listing_type.map(ListingType::as_str))
        .bind(filters.promoter_id)
        .bind(filters.fraccionamiento_id)
        .bind(min_price)
        .bind(max_price)
        .bind(filters.min_bedrooms.map(i64::from))
        .bind(filters.min_bathrooms.map(i64::from))
        .bind(min_construction)
        .bind(min_land)
        .bind(max_land)
        .bind(filters.exact_levels.map(i64::from))
        .bind(filters.is_new)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns a single listing by id, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_listing(pool: &PgPool, id: i64) -> Result<Option<ListingRow>, DbError> {
    let sql = format!("SELECT {LISTING_COLUMNS} FROM listings WHERE id = $1");
    let row = sqlx::query_as::<_, ListingRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Inserts a listing and returns the stored row.
///
/// A `days_on_market` figure is stored as given; it describes the listing's
/// age at `created_at`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including CHECK and foreign
/// key violations.
pub async fn create_listing(pool: &PgPool, listing: &NewListing) -> Result<ListingRow, DbError> {
    let sql = format!(
        "INSERT INTO listings \
           (property_type, listing_type, price, construction_area_m2, land_area_m2, bedrooms, \
            full_bathrooms, half_bathrooms, parking_spaces, levels, is_new_property, \
            publication_date, days_on_market, title, description, location_text, property_url, \
            latitude, longitude, promoter_id, fraccionamiento_id, photos) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21, $22) \
         RETURNING {LISTING_COLUMNS}"
    );

    let row = sqlx::query_as::<_, ListingRow>(&sql)
        .bind(listing.property_type.as_str())
        .bind(listing.listing_type.as_str())
        .bind(column_decimal("price", listing.price, MAX_PRICE)?)
        .bind(column_decimal(
            "construction_area_m2",
            listing.construction_area_m2,
            MAX_AREA_M2,
        )?)
        .bind(column_decimal("land_area_m2", listing.land_area_m2, MAX_AREA_M2)?)
        .bind(to_int(listing.bedrooms))
        .bind(to_int(listing.full_bathrooms))
        .bind(to_int(listing.half_bathrooms))
        .bind(to_int(listing.parking_spaces))
        .bind(to_int(listing.levels))
        .bind(listing.is_new_property)
        .bind(listing.publication_date)
        .bind(to_int(listing.days_on_market))
        .bind(listing.title.as_deref())
        .bind(listing.description.as_deref())
        .bind(listing.location_text.as_deref())
        .bind(listing.property_url.as_deref())
        .bind(listing.latitude)
        .bind(listing.longitude)
        .bind(listing.promoter_id)
        .bind(listing.fraccionamiento_id)
        .bind(listing.photos.as_slice())
        .fetch_one(pool)
        .await?;

    tracing::info!(listing_id = row.id, property_type = %listing.property_type, "listing created");
    Ok(row)
}

/// Applies a sparse update in a single `UPDATE … RETURNING`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no listing has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_listing(
    pool: &PgPool,
    id: i64,
    update: &ListingUpdate,
) -> Result<ListingRow, DbError> {
    fn supplied<T>(field: &Option<T>) -> bool {
        field.is_some()
    }

    let sql = format!(
        "UPDATE listings \
         SET property_type        = COALESCE($2, property_type), \
             listing_type         = COALESCE($3, listing_type), \
             is_new_property      = COALESCE($4, is_new_property), \
             photos               = COALESCE($5, photos), \
             price                = CASE WHEN $6::BOOL  THEN $7  ELSE price END, \
             construction_area_m2 = CASE WHEN $8::BOOL  THEN $9  ELSE construction_area_m2 END, \
             land_area_m2         = CASE WHEN $10::BOOL THEN $11 ELSE land_area_m2 END, \
             bedrooms             = CASE WHEN $12::BOOL THEN $13 ELSE bedrooms END, \
             full_bathrooms       = CASE WHEN $14::BOOL THEN $15 ELSE full_bathrooms END, \
             half_bathrooms       = CASE WHEN $16::BOOL THEN $17 ELSE half_bathrooms END, \
             parking_spaces       = CASE WHEN $18::BOOL THEN $19 ELSE parking_spaces END, \
             levels               = CASE WHEN $20::BOOL THEN $21 ELSE levels END, \
             publication_date     = CASE WHEN $22::BOOL THEN $23 ELSE publication_date END, \
             days_on_market       = CASE WHEN $24::BOOL THEN $25 ELSE days_on_market END, \
             title                = CASE WHEN $26::BOOL THEN $27 ELSE title END, \
             description          = CASE WHEN $28::BOOL THEN $29 ELSE description END, \
             location_text        = CASE WHEN $30::BOOL THEN $31 ELSE location_text END, \
             property_url         = CASE WHEN $32::BOOL THEN $33 ELSE property_url END, \
             latitude             = CASE WHEN $34::BOOL THEN $35 ELSE latitude END, \
             longitude            = CASE WHEN $36::BOOL THEN $37 ELSE longitude END, \
             promoter_id          = CASE WHEN $38::BOOL THEN $39 ELSE promoter_id END, \
             fraccionamiento_id   = CASE WHEN $40::BOOL THEN $41 ELSE fraccionamiento_id END, \
             updated_at           = NOW() \
         WHERE id = $1 \
         RETURNING {LISTING_COLUMNS}"
    );

    let row = sqlx::query_as::<_, ListingRow>(&sql)
        .bind(id)
        .bind(update.property_type.map(PropertyType::as_str))
        .bind(update.listing_type.map(ListingType::as_str))
        .bind(update.is_new_property)
        .bind(update.photos.as_deref())
        .bind(supplied(&update.price))
        .bind(column_decimal("price", update.price.flatten(), MAX_PRICE)?)
        .bind(supplied(&update.construction_area_m2))
        .bind(column_decimal(
            "construction_area_m2",
            update.construction_area_m2.flatten(),
            MAX_AREA_M2,
        )?)
        .bind(supplied(&update.land_area_m2))
        .bind(column_decimal(
            "land_area_m2",
            update.land_area_m2.flatten(),
            MAX_AREA_M2,
        )?)
        .bind(supplied(&update.bedrooms))
        .bind(to_int(update.bedrooms.flatten()))
        .bind(supplied(&update.full_bathrooms))
        .bind(to_int(update.full_bathrooms.flatten()))
        .bind(supplied(&update.half_bathrooms))
        .bind(to_int(update.half_bathrooms.flatten()))
        .bind(supplied(&update.parking_spaces))
        .bind(to_int(update.parking_spaces.flatten()))
        .bind(supplied(&update.levels))
        .bind(to_int(update.levels.flatten()))
        .bind(supplied(&update.publication_date))
        .bind(update.publication_date.flatten())
        .bind(supplied(&update.days_on_market))
        .bind(to_int(update.days_on_market.flatten()))
        .bind(supplied(&update.title))
        .bind(update.title.clone().flatten())
        .bind(supplied(&update.description))
        .bind(update.description.clone().flatten())
        .bind(supplied(&update.location_text))
        .bind(update.location_text.clone().flatten())
        .bind(supplied(&update.property_url))
        .bind(update.property_url.clone().flatten())
        .bind(supplied(&update.latitude))
        .bind(update.latitude.flatten())
        .bind(supplied(&update.longitude))
        .bind(update.longitude.flatten())
        .bind(supplied(&update.promoter_id))
        .bind(update.promoter_id.flatten())
        .bind(supplied(&update.fraccionamiento_id))
        .bind(update.fraccionamiento_id.flatten())
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Hard-deletes a listing.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no listing has this id, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_listing(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    tracing::info!(listing_id = id, "listing deleted");
    Ok(())
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// Converts a filter bound. Bounds beyond `Decimal`'s range clamp to its
/// limits so the predicate keeps excluding what the in-memory filter
/// excludes; NaN has no ordering and is rejected.
fn bound_decimal(field: &'static str, value: Option<f64>) -> Result<Option<Decimal>, DbError> {
    let Some(v) = value else {
        return Ok(None);
    };
    if v.is_nan() {
        return Err(DbError::OutOfRange { field, value: v });
    }
    let clamped = Decimal::from_f64(v).unwrap_or(if v > 0.0 {
        Decimal::MAX
    } else {
        Decimal::MIN
    });
    Ok(Some(clamped))
}

/// Converts a value headed for a `NUMERIC` column, rejecting anything the
/// column cannot store instead of writing NULL.
fn column_decimal(
    field: &'static str,
    value: Option<f64>,
    max: f64,
) -> Result<Option<Decimal>, DbError> {
    let Some(v) = value else {
        return Ok(None);
    };
    if !v.is_finite() || v > max {
        return Err(DbError::OutOfRange { field, value: v });
    }
    Decimal::from_f64(v)
        .map(|d| Some(d.round_dp(2)))
        .ok_or(DbError::OutOfRange { field, value: v })
}

/// Counts above `i32::MAX` bind as -1 so the column CHECK rejects them.
fn to_int(value: Option<u32>) -> Option<i32> {
    value.map(|v| i32::try_from(v).unwrap_or(-1))
}
