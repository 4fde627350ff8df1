pub mod auth;
pub mod bookings;
pub mod hostels;
pub mod rooms;

use actix_web::HttpResponse;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::auth::AuthUser;
use crate::models::user::Role;

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    message: String,
    data: T,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn success<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Ok().json(Envelope {
        success: true,
        message: message.to_string(),
        data,
    })
}

pub fn created<T: Serialize>(message: &str, data: T) -> HttpResponse {
    HttpResponse::Created().json(Envelope {
        success: true,
        message: message.to_string(),
        data,
    })
}

pub fn bad_request(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorBody {
        error: message.to_string(),
    })
}

pub fn unauthorized(message: &str) -> HttpResponse {
    HttpResponse::Unauthorized().json(ErrorBody {
        error: message.to_string(),
    })
}

pub fn forbidden(message: &str) -> HttpResponse {
    HttpResponse::Forbidden().json(ErrorBody {
        error: message.to_string(),
    })
}

pub fn not_found(message: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ErrorBody {
        error: message.to_string(),
    })
}

pub fn conflict(message: &str) -> HttpResponse {
    HttpResponse::Conflict().json(ErrorBody {
        error: message.to_string(),
    })
}

pub fn server_error(message: &str) -> HttpResponse {
    HttpResponse::InternalServerError().json(ErrorBody {
        error: message.to_string(),
    })
}

/// Whether the caller may manage the given hostel: admins always, owners
/// only for their own property. `Ok(None)` means the hostel does not exist.
pub async fn can_access_hostel(
    pool: &SqlitePool,
    hostel_id: i64,
    user: &AuthUser,
) -> Result<Option<bool>, sqlx::Error> {
    let owner_id: Option<i64> = sqlx::query_scalar("SELECT owner_id FROM hostels WHERE id = ?")
        .bind(hostel_id)
        .fetch_optional(pool)
        .await?;

    Ok(owner_id.map(|owner_id| user.role == Role::Admin || owner_id == user.id))
}
