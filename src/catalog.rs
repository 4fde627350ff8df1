//! In-memory listing filter for the public catalog.
//!
//! All predicates AND together; an unset field imposes no constraint, so
//! the empty filter is the identity. Input order is preserved.

use serde::Deserialize;
use std::str::FromStr;

use crate::models::hostel::HostelSummary;
use crate::models::room::RoomType;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub location: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub amenities: Vec<String>,
    pub room_types: Vec<RoomType>,
    pub min_rating: Option<f64>,
}

/// Query-string form of [`FilterOptions`]; list fields arrive as
/// comma-separated values. Unknown room types are dropped rather than
/// rejected, degrading to "no constraint".
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub location: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub amenities: Option<String>,
    pub room_types: Option<String>,
    pub min_rating: Option<f64>,
}

impl CatalogQuery {
    pub fn into_filter(self) -> FilterOptions {
        FilterOptions {
            location: self.location,
            min_price: self.min_price,
            max_price: self.max_price,
            amenities: split_csv(self.amenities.as_deref()),
            room_types: split_csv(self.room_types.as_deref())
                .iter()
                .filter_map(|s| RoomType::from_str(s).ok())
                .collect(),
            min_rating: self.min_rating,
        }
    }
}

fn split_csv(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn apply_filter(listings: &[HostelSummary], filters: &FilterOptions) -> Vec<HostelSummary> {
    listings
        .iter()
        .filter(|hostel| matches(hostel, filters))
        .cloned()
        .collect()
}

fn matches(hostel: &HostelSummary, filters: &FilterOptions) -> bool {
    if let Some(min) = filters.min_price {
        if hostel.price < min {
            return false;
        }
    }
    if let Some(max) = filters.max_price {
        if hostel.price > max {
            return false;
        }
    }

    if let Some(location) = &filters.location {
        let needle = location.trim().to_lowercase();
        if !needle.is_empty() && !hostel.location.to_lowercase().contains(&needle) {
            return false;
        }
    }

    // Every requested amenity must be present.
    for amenity in &filters.amenities {
        if !hostel.amenities.iter().any(|a| a == amenity) {
            return false;
        }
    }

    // At least one room of any requested type.
    if !filters.room_types.is_empty()
        && !filters
            .room_types
            .iter()
            .any(|t| hostel.room_types.contains(t))
    {
        return false;
    }

    if let Some(min) = filters.min_rating {
        if hostel.rating < min {
            return false;
        }
    }

    true
}
