use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::room::RoomType;
use crate::payment::PaymentMethod;

/// Deposit due up front, as a percentage of the room price.
pub const DEFAULT_DEPOSIT_PERCENT: i64 = 30;

/// Declined payments allowed before the booking is rejected outright.
pub const MAX_PAYMENT_ATTEMPTS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Rejected,
    Completed,
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub hostel_id: i64,
    pub room_id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub check_in_date: chrono::NaiveDate,
    pub room_type: RoomType,
    pub deposit_amount: i64,
    pub deposit_paid: bool,
    pub status: BookingStatus,
    pub payment_attempts: i64,
    pub special_requests: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateBooking {
    pub hostel_id: i64,
    pub room_id: i64,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Please enter a valid email"))]
    pub email: String,
    #[validate(custom = "crate::models::validate_phone")]
    pub phone: String,
    pub check_in_date: chrono::NaiveDate,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PayBooking {
    pub method: PaymentMethod,
}

/// Ceiling of `price * percent / 100` in integer arithmetic.
pub fn calculate_deposit(price: i64, percent: i64) -> i64 {
    (price * percent + 99) / 100
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deposit_is_thirty_percent_rounded_up() {
        assert_eq!(calculate_deposit(1_000_000, 30), 300_000);
        assert_eq!(calculate_deposit(550_000, 30), 165_000);
        assert_eq!(calculate_deposit(350_000, 30), 105_000);
    }

    #[test]
    fn deposit_rounds_fractions_up() {
        assert_eq!(calculate_deposit(1, 30), 1);
        assert_eq!(calculate_deposit(3, 30), 1);
        assert_eq!(calculate_deposit(4, 30), 2);
    }

    #[test]
    fn deposit_is_monotonic_in_price() {
        let mut last = 0;
        for price in 0..5_000 {
            let deposit = calculate_deposit(price, DEFAULT_DEPOSIT_PERCENT);
            assert!(deposit >= last, "deposit decreased at price {price}");
            last = deposit;
        }
    }
}
