use actix_web::{web, Responder};
use chrono::Utc;
use sqlx::SqlitePool;
use validator::Validate;

use crate::auth::AuthUser;
use crate::handlers::{
    bad_request, conflict, created, forbidden, not_found, server_error, success,
};
use crate::models::booking::{
    calculate_deposit, Booking, BookingStatus, CreateBooking, PayBooking, DEFAULT_DEPOSIT_PERCENT,
    MAX_PAYMENT_ATTEMPTS,
};
use crate::models::room::{Room, RoomStatus};
use crate::models::user::Role;
use crate::payment::{PaymentError, PaymentProvider};

pub async fn create_booking(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    body: web::Json<CreateBooking>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return bad_request(&e.to_string());
    }

    if body.check_in_date < Utc::now().date_naive() {
        return bad_request("Check-in date cannot be in the past");
    }

    // Availability check and insert share one transaction so two requests
    // cannot both book the last available room.
    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(_) => return server_error("Failed to start transaction"),
    };

    let room = match sqlx::query_as::<_, Room>("SELECT * FROM rooms WHERE id = ?")
        .bind(body.room_id)
        .fetch_optional(&mut *tx)
        .await
    {
        Ok(Some(room)) => room,
        Ok(None) => return not_found("Room not found"),
        Err(_) => return server_error("Database error"),
    };

    if room.hostel_id != body.hostel_id {
        return bad_request("Room does not belong to this hostel");
    }
    if room.status != RoomStatus::Available {
        return conflict("Room is no longer available");
    }

    let deposit = calculate_deposit(room.price, DEFAULT_DEPOSIT_PERCENT);

    let booking = match sqlx::query_as::<_, Booking>(
        r#"
        INSERT INTO bookings (user_id, hostel_id, room_id, name, phone, email,
                              check_in_date, room_type, deposit_amount, special_requests)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(user.id)
    .bind(body.hostel_id)
    .bind(body.room_id)
    .bind(&body.name)
    .bind(&body.phone)
    .bind(&body.email)
    .bind(body.check_in_date)
    .bind(room.room_type)
    .bind(deposit)
    .bind(body.special_requests.as_deref())
    .fetch_one(&mut *tx)
    .await
    {
        Ok(booking) => booking,
        Err(_) => return server_error("Failed to create booking"),
    };

    if tx.commit().await.is_err() {
        return server_error("Failed to commit transaction");
    }

    created("Booking request submitted", booking)
}

pub async fn get_booking(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
) -> impl Responder {
    let id = path.into_inner();

    let booking = match sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(booking)) => booking,
        Ok(None) => return not_found("Booking not found"),
        Err(_) => return server_error("Database error"),
    };

    if !can_view_booking(pool.get_ref(), &booking, &user).await {
        return forbidden("Access denied");
    }

    success("Booking retrieved successfully", booking)
}

pub async fn list_bookings(pool: web::Data<SqlitePool>, user: AuthUser) -> impl Responder {
    match sqlx::query_as::<_, Booking>(
        "SELECT * FROM bookings WHERE user_id = ? ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(bookings) => success("Bookings retrieved successfully", bookings),
        Err(_) => server_error("Error fetching bookings"),
    }
}

pub async fn pay_booking(
    pool: web::Data<SqlitePool>,
    provider: web::Data<dyn PaymentProvider>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<PayBooking>,
) -> impl Responder {
    let id = path.into_inner();

    let booking = match sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(booking)) => booking,
        Ok(None) => return not_found("Booking not found"),
        Err(_) => return server_error("Database error"),
    };

    if booking.user_id != user.id {
        return forbidden("You can only pay for your own bookings");
    }

    match booking.status {
        BookingStatus::Pending => {}
        BookingStatus::Confirmed => {
            return conflict("Deposit has already been paid for this booking")
        }
        BookingStatus::Rejected => {
            return conflict("This booking was rejected after repeated failed payments")
        }
        BookingStatus::Completed => return conflict("This booking is already completed"),
    }

    match provider.charge(booking.deposit_amount, body.method).await {
        Ok(receipt) => {
            let mut tx = match pool.begin().await {
                Ok(tx) => tx,
                Err(_) => return server_error("Failed to start transaction"),
            };

            // Guard against a concurrent attempt that confirmed first.
            let updated = match sqlx::query(
                "UPDATE bookings SET deposit_paid = 1, status = 'confirmed' WHERE id = ? AND status = 'pending'",
            )
            .bind(id)
            .execute(&mut *tx)
            .await
            {
                Ok(result) => result.rows_affected(),
                Err(_) => return server_error("Failed to confirm booking"),
            };
            if updated != 1 {
                return conflict("Booking was already processed");
            }

            if sqlx::query("UPDATE rooms SET status = 'booked' WHERE id = ?")
                .bind(booking.room_id)
                .execute(&mut *tx)
                .await
                .is_err()
            {
                return server_error("Failed to update room status");
            }

            if tx.commit().await.is_err() {
                return server_error("Failed to commit transaction");
            }

            let confirmed = match sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = ?")
                .bind(id)
                .fetch_one(pool.get_ref())
                .await
            {
                Ok(booking) => booking,
                Err(_) => return server_error("Database error"),
            };

            success(
                "Deposit paid successfully",
                serde_json::json!({ "booking": confirmed, "receipt": receipt }),
            )
        }
        Err(PaymentError::Declined) => {
            let attempts = booking.payment_attempts + 1;

            if attempts >= MAX_PAYMENT_ATTEMPTS {
                if sqlx::query(
                    "UPDATE bookings SET payment_attempts = ?, status = 'rejected' WHERE id = ?",
                )
                .bind(attempts)
                .bind(id)
                .execute(pool.get_ref())
                .await
                .is_err()
                {
                    return server_error("Database error");
                }
                bad_request("Payment declined. The booking has been rejected after too many failed attempts")
            } else {
                if sqlx::query("UPDATE bookings SET payment_attempts = ? WHERE id = ?")
                    .bind(attempts)
                    .bind(id)
                    .execute(pool.get_ref())
                    .await
                    .is_err()
                {
                    return server_error("Database error");
                }
                bad_request(&format!(
                    "Payment declined. {} attempt(s) remaining",
                    MAX_PAYMENT_ATTEMPTS - attempts
                ))
            }
        }
        Err(PaymentError::Gateway(message)) => {
            // Transient provider trouble does not consume an attempt.
            log::error!("payment gateway error for booking {id}: {message}");
            server_error("Payment service unavailable, please try again")
        }
    }
}

async fn can_view_booking(pool: &SqlitePool, booking: &Booking, user: &AuthUser) -> bool {
    if booking.user_id == user.id || user.role == Role::Admin {
        return true;
    }
    if user.role != Role::HostelOwner {
        return false;
    }
    let owner_id: Option<i64> = sqlx::query_scalar("SELECT owner_id FROM hostels WHERE id = ?")
        .bind(booking.hostel_id)
        .fetch_optional(pool)
        .await
        .unwrap_or(None);
    owner_id == Some(user.id)
}
