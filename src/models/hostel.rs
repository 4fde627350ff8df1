use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::room::{Room, RoomType};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Hostel {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub rating: f64,
    pub reviews: i64,
    pub phone: String,
    pub email: String,
    pub whatsapp: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContactInfo {
    pub phone: String,
    pub email: String,
    pub whatsapp: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Denormalized listing row for the public catalog: aggregated room
/// counts, amenity set and room types, plus the main image if one is set.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HostelSummary {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub rating: f64,
    pub reviews: i64,
    pub main_image: Option<String>,
    pub amenities: Vec<String>,
    pub room_types: Vec<RoomType>,
    pub total_rooms: i64,
    pub available_rooms: i64,
    pub contact: ContactInfo,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostelDetail {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub location: String,
    pub price: i64,
    pub rating: f64,
    pub reviews: i64,
    pub contact: ContactInfo,
    pub coordinates: Option<Coordinates>,
    pub amenities: Vec<String>,
    pub images: Vec<HostelImage>,
    pub rooms: Vec<Room>,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct HostelImage {
    pub id: i64,
    pub image_url: String,
    pub is_main: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateHostel {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "Location is required"))]
    pub location: String,
    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price: i64,
    #[validate(custom = "crate::models::validate_phone")]
    pub phone: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub whatsapp: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    /// Image URLs; the first one becomes the main image.
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AttachImage {
    #[validate(length(min = 1, message = "Image URL is required"))]
    pub image_url: String,
    #[serde(default)]
    pub is_main: bool,
}
