use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum RoomType {
    Single,
    Shared,
    SelfContained,
}

impl FromStr for RoomType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single" => Ok(RoomType::Single),
            "shared" => Ok(RoomType::Shared),
            "self-contained" => Ok(RoomType::SelfContained),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum RoomStatus {
    Available,
    Booked,
    Occupied,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: i64,
    pub hostel_id: i64,
    pub room_number: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub room_type: RoomType,
    pub price: i64,
    pub capacity: i64,
    pub status: RoomStatus,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateRoom {
    pub hostel_id: i64,
    #[validate(length(min = 1, message = "Room number is required"))]
    pub room_number: String,
    #[serde(rename = "type")]
    pub room_type: RoomType,
    #[validate(range(min = 1, message = "Price must be positive"))]
    pub price: i64,
    #[validate(range(min = 1, max = 12, message = "Capacity must be between 1 and 12"))]
    pub capacity: i64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amenities: Vec<String>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RoomImage {
    pub id: i64,
    pub image_url: String,
    pub is_main: bool,
}
