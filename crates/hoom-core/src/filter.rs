//! Filter values produced by the prompt parser and the filter state they are
//! merged into.

use serde::{Deserialize, Serialize};

use crate::listing::{ListingRecord, ListingType, MarketScope, PropertyType};

/// Structured filter extracted from one free-text prompt.
///
/// Built fresh per parse and never mutated afterwards. `None` means "not
/// mentioned", which is distinct from zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_bedrooms: Option<u32>,
    pub min_bathrooms: Option<u32>,
    pub min_construction_area_m2: Option<f64>,
    pub min_land_area_m2: Option<f64>,
    /// Only produced when parsing in land scope.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_land_area_m2: Option<f64>,
    pub exact_levels: Option<u32>,
    pub is_new: Option<bool>,
}

impl FilterCriteria {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == FilterCriteria::default()
    }
}

/// Complete filter state for a listings view.
///
/// Prompt results are merged into it field by field; fields the prompt did
/// not mention keep whatever the user had already set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingFilters {
    pub scope: MarketScope,
    pub property_type: Option<PropertyType>,
    pub listing_type: Option<ListingType>,
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
}

impl ListingFilters {
    /// Empty state for a scope. Land scope pins the property type to land.
    #[must_use]
    pub fn for_scope(scope: MarketScope) -> Self {
        let mut filters = Self {
            scope,
            ..Self::default()
        };
        filters.pin_scope();
        filters
    }

    /// Overlays every field the criteria set; unset fields are left alone.
    pub fn merge(&mut self, criteria: &FilterCriteria) {
        fn overlay<T: Copy>(slot: &mut Option<T>, value: Option<T>) {
            if value.is_some() {
                *slot = value;
            }
        }

        overlay(&mut self.min_price, criteria.min_price);
        overlay(&mut self.max_price, criteria.max_price);
        overlay(&mut self.min_bedrooms, criteria.min_bedrooms);
        overlay(&mut self.min_bathrooms, criteria.min_bathrooms);
        overlay(
            &mut self.min_construction_area_m2,
            criteria.min_construction_area_m2,
        );
        overlay(&mut self.min_land_area_m2, criteria.min_land_area_m2);
        overlay(&mut self.max_land_area_m2, criteria.max_land_area_m2);
        overlay(&mut self.exact_levels, criteria.exact_levels);
        overlay(&mut self.is_new, criteria.is_new);
        self.pin_scope();
    }

    /// Consuming variant of [`ListingFilters::merge`].
    #[must_use]
    pub fn merged(mut self, criteria: &FilterCriteria) -> Self {
        self.merge(criteria);
        self
    }

    /// Evaluates the filter in memory with the same semantics the record store
    /// applies: `min_*` is `>=`, `max_*` is `<=`, the rest is equality. A null
    /// field on the record never satisfies a predicate that is set.
    #[must_use]
    pub fn matches(&self, record: &ListingRecord) -> bool {
        fn at_least<T: PartialOrd>(bound: Option<T>, value: Option<T>) -> bool {
            bound.is_none_or(|b| value.is_some_and(|v| v >= b))
        }
        fn at_most<T: PartialOrd>(bound: Option<T>, value: Option<T>) -> bool {
            bound.is_none_or(|b| value.is_some_and(|v| v <= b))
        }
        fn equals<T: PartialEq>(wanted: Option<T>, value: Option<T>) -> bool {
            wanted.is_none_or(|w| value.is_some_and(|v| v == w))
        }

        equals(self.property_type, Some(record.property_type))
            && equals(self.listing_type, Some(record.listing_type))
            && equals(self.promoter_id, record.promoter_id)
            && equals(self.fraccionamiento_id, record.fraccionamiento_id)
            && at_least(self.min_price, record.price)
            && at_most(self.max_price, record.price)
            && at_least(self.min_bedrooms, record.bedrooms)
            && at_least(self.min_bathrooms, record.full_bathrooms)
            && at_least(self.min_construction_area_m2, record.construction_area_m2)
            && at_least(self.min_land_area_m2, record.land_area_m2)
            && at_most(self.max_land_area_m2, record.land_area_m2)
            && equals(self.exact_levels, record.levels)
            && equals(self.is_new, Some(record.is_new_property))
    }

    /// Filters a slice in memory, keeping input order.
    #[must_use]
    pub fn apply<'a>(&self, records: &'a [ListingRecord]) -> Vec<&'a ListingRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }

    fn pin_scope(&mut self) {
        if self.scope == MarketScope::Land {
            self.property_type = Some(PropertyType::Land);
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn house(price: Option<f64>, bedrooms: Option<u32>) -> ListingRecord {
        let mut r = ListingRecord::new(1, PropertyType::House, ListingType::Sale, Utc::now());
        r.price = price;
        r.bedrooms = bedrooms;
        r
    }

    #[test]
    fn default_criteria_is_empty() {
        assert!(FilterCriteria::default().is_empty());
        let criteria = FilterCriteria {
            is_new: Some(true),
            ..FilterCriteria::default()
        };
        assert!(!criteria.is_empty());
    }

    #[test]
    fn merge_overlays_only_set_fields() {
        let mut filters = ListingFilters {
            min_price: Some(500_000.0),
            max_price: Some(4_000_000.0),
            listing_type: Some(ListingType::Sale),
            ..ListingFilters::default()
        };
        filters.merge(&FilterCriteria {
            max_price: Some(2_000_000.0),
            min_bedrooms: Some(3),
            ..FilterCriteria::default()
        });

        assert_eq!(filters.min_price, Some(500_000.0));
        assert_eq!(filters.max_price, Some(2_000_000.0));
        assert_eq!(filters.min_bedrooms, Some(3));
        assert_eq!(filters.listing_type, Some(ListingType::Sale));
    }

    #[test]
    fn land_scope_keeps_property_type_pinned() {
        let mut filters = ListingFilters::for_scope(MarketScope::Land);
        assert_eq!(filters.property_type, Some(PropertyType::Land));

        filters.property_type = Some(PropertyType::House);
        filters.merge(&FilterCriteria::default());
        assert_eq!(filters.property_type, Some(PropertyType::Land));
    }

    #[test]
    fn general_scope_leaves_property_type_open() {
        let filters = ListingFilters::for_scope(MarketScope::General);
        assert_eq!(filters.property_type, None);
    }

    #[test]
    fn empty_filters_match_everything() {
        let filters = ListingFilters::default();
        assert!(filters.matches(&house(None, None)));
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let filters = ListingFilters {
            min_price: Some(100.0),
            max_price: Some(200.0),
            ..ListingFilters::default()
        };
        assert!(filters.matches(&house(Some(100.0), None)));
        assert!(filters.matches(&house(Some(200.0), None)));
        assert!(!filters.matches(&house(Some(99.0), None)));
        assert!(!filters.matches(&house(Some(201.0), None)));
    }

    #[test]
    fn null_field_fails_a_set_predicate() {
        let filters = ListingFilters {
            min_bedrooms: Some(2),
            ..ListingFilters::default()
        };
        assert!(!filters.matches(&house(Some(1.0), None)));
        assert!(filters.matches(&house(Some(1.0), Some(2))));
    }

    #[test]
    fn bathrooms_compare_full_bathrooms_only() {
        let mut record = house(None, None);
        record.full_bathrooms = Some(1);
        record.half_bathrooms = Some(3);
        let filters = ListingFilters {
            min_bathrooms: Some(2),
            ..ListingFilters::default()
        };
        assert!(!filters.matches(&record));
    }

    #[test]
    fn is_new_matches_by_equality_when_set() {
        let mut record = house(None, None);
        let filters = ListingFilters {
            is_new: Some(true),
            ..ListingFilters::default()
        };
        assert!(!filters.matches(&record));
        record.is_new_property = true;
        assert!(filters.matches(&record));
    }

    #[test]
    fn land_scope_filters_out_other_types() {
        let filters = ListingFilters::for_scope(MarketScope::Land);
        let mut land = ListingRecord::new(2, PropertyType::Land, ListingType::Sale, Utc::now());
        land.land_area_m2 = Some(250.0);
        let records = vec![house(Some(1.0), None), land];
        let kept = filters.apply(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);
    }

    #[test]
    fn max_land_area_is_an_upper_bound() {
        let filters = ListingFilters {
            max_land_area_m2: Some(300.0),
            ..ListingFilters::for_scope(MarketScope::Land)
        };
        let mut land = ListingRecord::new(3, PropertyType::Land, ListingType::Sale, Utc::now());
        land.land_area_m2 = Some(450.0);
        assert!(!filters.matches(&land));
        land.land_area_m2 = Some(300.0);
        assert!(filters.matches(&land));
    }

    #[test]
    fn criteria_serialize_without_land_upper_bound_when_unset() {
        let json = serde_json::to_value(FilterCriteria::default()).unwrap();
        assert!(json.get("max_land_area_m2").is_none());
        assert!(json["min_price"].is_null());
    }
}
