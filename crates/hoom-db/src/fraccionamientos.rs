//! Database operations for the `fraccionamientos` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FraccionamientoRow {
    pub id: i64,
    pub nombre: String,
    pub created_at: DateTime<Utc>,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_fraccionamientos(pool: &PgPool) -> Result<Vec<FraccionamientoRow>, DbError> {
    let rows = sqlx::query_as::<_, FraccionamientoRow>(
        "SELECT id, nombre, created_at FROM fraccionamientos ORDER BY nombre",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails, including a duplicate name.
pub async fn create_fraccionamiento(
    pool: &PgPool,
    nombre: &str,
) -> Result<FraccionamientoRow, DbError> {
    let row = sqlx::query_as::<_, FraccionamientoRow>(
        "INSERT INTO fraccionamientos (nombre) VALUES ($1) RETURNING id, nombre, created_at",
    )
    .bind(nombre)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no development has this id, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn rename_fraccionamiento(
    pool: &PgPool,
    id: i64,
    nombre: &str,
) -> Result<FraccionamientoRow, DbError> {
    sqlx::query_as::<_, FraccionamientoRow>(
        "UPDATE fraccionamientos SET nombre = $2 WHERE id = $1 \
         RETURNING id, nombre, created_at",
    )
    .bind(id)
    .bind(nombre)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no development has this id, or
/// [`DbError::Sqlx`] if the delete fails.
pub async fn delete_fraccionamiento(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query("DELETE FROM fraccionamientos WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
