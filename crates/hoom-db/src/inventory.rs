//! Counts behind the dashboard header cards.

use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, sqlx::FromRow)]
pub struct InventoryCounts {
    pub total_listings: i64,
    pub new_houses: i64,
    pub used_houses: i64,
    pub new_apartments: i64,
    pub used_apartments: i64,
    pub land: i64,
    pub promoters: i64,
}

/// Computes every header count in one round trip.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn inventory_counts(pool: &PgPool) -> Result<InventoryCounts, DbError> {
    let counts = sqlx::query_as::<_, InventoryCounts>(
        "SELECT \
           COUNT(*) AS total_listings, \
           COUNT(*) FILTER (WHERE property_type = 'casa' AND is_new_property) AS new_houses, \
           COUNT(*) FILTER (WHERE property_type = 'casa' AND NOT is_new_property) AS used_houses, \
           COUNT(*) FILTER (WHERE property_type = 'departamento' AND is_new_property) AS new_apartments, \
           COUNT(*) FILTER (WHERE property_type = 'departamento' AND NOT is_new_property) AS used_apartments, \
           COUNT(*) FILTER (WHERE property_type = 'terreno') AS land, \
           (SELECT COUNT(*) FROM promoters) AS promoters \
         FROM listings",
    )
    .fetch_one(pool)
    .await?;

    Ok(counts)
}
