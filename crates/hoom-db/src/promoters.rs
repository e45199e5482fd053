//! Database operations for the `promoters` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `promoters` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PromoterRow {
    pub id: i64,
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPromoter {
    pub name: String,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Sparse update; `Some(None)` clears a nullable column.
#[derive(Debug, Clone, Default)]
#[allow(clippy::option_option)]
pub struct PromoterUpdate {
    pub name: Option<String>,
    pub company: Option<Option<String>>,
    pub phone: Option<Option<String>>,
    pub email: Option<Option<String>>,
}

/// Returns all promoters ordered by name.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_promoters(pool: &PgPool) -> Result<Vec<PromoterRow>, DbError> {
    let rows = sqlx::query_as::<_, PromoterRow>(
        "SELECT id, name, company, phone, email, created_at, updated_at \
         FROM promoters \
         ORDER BY name, id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Returns a single promoter, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_promoter(pool: &PgPool, id: i64) -> Result<Option<PromoterRow>, DbError> {
    let row = sqlx::query_as::<_, PromoterRow>(
        "SELECT id, name, company, phone, email, created_at, updated_at \
         FROM promoters \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_promoter(pool: &PgPool, promoter: &NewPromoter) -> Result<PromoterRow, DbError> {
    let row = sqlx::query_as::<_, PromoterRow>(
        "INSERT INTO promoters (name, company, phone, email) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, name, company, phone, email, created_at, updated_at",
    )
    .bind(&promoter.name)
    .bind(promoter.company.as_deref())
    .bind(promoter.phone.as_deref())
    .bind(promoter.email.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no promoter has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_promoter(
    pool: &PgPool,
    id: i64,
    update: &PromoterUpdate,
) -> Result<PromoterRow, DbError> {
    let row = sqlx::query_as::<_, PromoterRow>(
        "UPDATE promoters \
         SET name       = COALESCE($2, name), \
             company    = CASE WHEN $3::BOOL THEN $4 ELSE company END, \
             phone      = CASE WHEN $5::BOOL THEN $6 ELSE phone END, \
             email      = CASE WHEN $7::BOOL THEN $8 ELSE email END, \
             updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, name, company, phone, email, created_at, updated_at",
    )
    .bind(id)
    .bind(update.name.as_deref())
    .bind(update.company.is_some())
    .bind(update.company.clone().flatten())
    .bind(update.phone.is_some())
    .bind(update.phone.clone().flatten())
    .bind(update.email.is_some())
    .bind(update.email.clone().flatten())
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Deletes a promoter. Listings that referenced it keep existing with a NULL
/// `promoter_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no promoter has this id, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_promoter(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM promoters WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
