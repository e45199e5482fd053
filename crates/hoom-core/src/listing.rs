use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Kind of property a listing advertises. Serialized with the storage codes
/// used by the listings table (`casa`, `terreno`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "casa")]
    House,
    #[serde(rename = "terreno")]
    Land,
    #[serde(rename = "departamento")]
    Apartment,
    #[serde(rename = "oficina")]
    Office,
    #[serde(rename = "local_comercial")]
    Commercial,
    #[serde(rename = "bodega")]
    Warehouse,
}

impl PropertyType {
    pub const ALL: [PropertyType; 6] = [
        PropertyType::House,
        PropertyType::Land,
        PropertyType::Apartment,
        PropertyType::Office,
        PropertyType::Commercial,
        PropertyType::Warehouse,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::House => "casa",
            PropertyType::Land => "terreno",
            PropertyType::Apartment => "departamento",
            PropertyType::Office => "oficina",
            PropertyType::Commercial => "local_comercial",
            PropertyType::Warehouse => "bodega",
        }
    }

    /// Bedrooms, bathrooms, parking and levels only mean something for
    /// houses and apartments.
    #[must_use]
    pub fn is_residential(self) -> bool {
        matches!(self, PropertyType::House | PropertyType::Apartment)
    }
}

impl std::fmt::Display for PropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::InvalidPropertyType(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingType {
    #[serde(rename = "venta")]
    Sale,
    #[serde(rename = "renta")]
    Rental,
}

impl ListingType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ListingType::Sale => "venta",
            ListingType::Rental => "renta",
        }
    }
}

impl std::fmt::Display for ListingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "venta" => Ok(ListingType::Sale),
            "renta" => Ok(ListingType::Rental),
            other => Err(CoreError::InvalidListingType(other.to_string())),
        }
    }
}

/// Which market a search or summary is about.
///
/// Land analysis reads areas from `land_area_m2`; every other context reads
/// `construction_area_m2`. A single summary never mixes the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketScope {
    #[default]
    General,
    Land,
}

impl MarketScope {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MarketScope::General => "general",
            MarketScope::Land => "land",
        }
    }

    /// Area figure used as the price-per-area denominator in this scope.
    #[must_use]
    pub fn area_of(self, record: &ListingRecord) -> Option<f64> {
        match self {
            MarketScope::General => record.construction_area_m2,
            MarketScope::Land => record.land_area_m2,
        }
    }
}

impl std::fmt::Display for MarketScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketScope {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(MarketScope::General),
            "land" | "terreno" => Ok(MarketScope::Land),
            other => Err(CoreError::InvalidScope(other.to_string())),
        }
    }
}

/// A property listing as read from the record store.
///
/// Only the typed fields feed the parser/aggregator pipeline; the descriptive
/// ones ride along for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub id: i64,
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
    #[serde(default)]
    pub is_new_property: bool,
    pub publication_date: Option<NaiveDate>,
    /// Age of the listing on the day it was captured (see
    /// [`crate::metrics::days_on_market`]).
    pub days_on_market: Option<u32>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location_text: Option<String>,
    #[serde(default)]
    pub property_url: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub promoter_id: Option<i64>,
    #[serde(default)]
    pub fraccionamiento_id: Option<i64>,
    #[serde(default)]
    pub photos: Vec<String>,
}

impl ListingRecord {
    /// Bare record with every optional field unset.
    #[must_use]
    pub fn new(
        id: i64,
        property_type: PropertyType,
        listing_type: ListingType,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
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
            created_at,
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

    /// Price per m² as shown on a listing card: land listings divide by land
    /// area, everything else by construction area.
    #[must_use]
    pub fn price_per_area(&self) -> Option<f64> {
        let scope = if self.property_type == PropertyType::Land {
            MarketScope::Land
        } else {
            MarketScope::General
        };
        let area = scope.area_of(self).filter(|a| *a > 0.0)?;
        self.price.map(|p| p / area)
    }
}
