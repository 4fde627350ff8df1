use actix_web::{web, Responder};
use serde::Deserialize;
use sqlx::{Row, SqlitePool};
use validator::Validate;

use crate::auth::AuthUser;
use crate::handlers::{
    bad_request, can_access_hostel, created, forbidden, not_found, server_error, success,
};
use crate::models::hostel::AttachImage;
use crate::models::room::{CreateRoom, Room};
use crate::models::user::Role;

#[derive(Deserialize)]
pub struct RoomsQuery {
    pub hostel_id: i64,
}

pub async fn get_rooms(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    params: web::Query<RoomsQuery>,
) -> impl Responder {
    match can_access_hostel(pool.get_ref(), params.hostel_id, &user).await {
        Ok(Some(true)) => {}
        Ok(Some(false)) => return forbidden("Access denied"),
        Ok(None) => return not_found("Hostel not found"),
        Err(_) => return server_error("Database error"),
    }

    match sqlx::query_as::<_, Room>(
        "SELECT * FROM rooms WHERE hostel_id = ? ORDER BY room_number",
    )
    .bind(params.hostel_id)
    .fetch_all(pool.get_ref())
    .await
    {
        Ok(rooms) => success("Rooms retrieved successfully", rooms),
        Err(_) => return server_error("Error fetching rooms"),
    }
}

pub async fn create_room(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    body: web::Json<CreateRoom>,
) -> impl Responder {
    if !user.has_role(Role::HostelOwner) {
        return forbidden("Only hostel owners can create rooms");
    }
    if let Err(e) = body.validate() {
        return bad_request(&e.to_string());
    }

    match can_access_hostel(pool.get_ref(), body.hostel_id, &user).await {
        Ok(Some(true)) => {}
        Ok(Some(false)) => return forbidden("Access denied"),
        Ok(None) => return not_found("Hostel not found"),
        Err(_) => return server_error("Database error"),
    }

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(_) => return server_error("Failed to start transaction"),
    };

    let room_id = match sqlx::query(
        r#"
        INSERT INTO rooms (hostel_id, room_number, type, price, capacity, description)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(body.hostel_id)
    .bind(&body.room_number)
    .bind(body.room_type)
    .bind(body.price)
    .bind(body.capacity)
    .bind(&body.description)
    .fetch_one(&mut *tx)
    .await
    {
        Ok(row) => row.get::<i64, _>("id"),
        Err(_) => return server_error("Failed to create room"),
    };

    for amenity in &body.amenities {
        if sqlx::query("INSERT INTO room_amenities (room_id, amenity) VALUES (?, ?)")
            .bind(room_id)
            .bind(amenity)
            .execute(&mut *tx)
            .await
            .is_err()
        {
            return server_error("Failed to save amenities");
        }
    }

    if tx.commit().await.is_err() {
        return server_error("Failed to commit transaction");
    }

    created(
        "Room created successfully",
        serde_json::json!({ "roomId": room_id }),
    )
}

pub async fn upload_room_image(
    pool: web::Data<SqlitePool>,
    user: AuthUser,
    path: web::Path<i64>,
    body: web::Json<AttachImage>,
) -> impl Responder {
    let room_id = path.into_inner();

    if let Err(e) = body.validate() {
        return bad_request(&e.to_string());
    }

    let hostel_id: i64 = match sqlx::query_scalar("SELECT hostel_id FROM rooms WHERE id = ?")
        .bind(room_id)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(hostel_id)) => hostel_id,
        Ok(None) => return not_found("Room not found"),
        Err(_) => return server_error("Database error"),
    };

    match can_access_hostel(pool.get_ref(), hostel_id, &user).await {
        Ok(Some(true)) => {}
        Ok(Some(false)) => return forbidden("Access denied"),
        Ok(None) => return not_found("Hostel not found"),
        Err(_) => return server_error("Database error"),
    }

    let mut tx = match pool.begin().await {
        Ok(tx) => tx,
        Err(_) => return server_error("Failed to start transaction"),
    };

    if body.is_main {
        if sqlx::query("UPDATE room_images SET is_main = 0 WHERE room_id = ?")
            .bind(room_id)
            .execute(&mut *tx)
            .await
            .is_err()
        {
            return server_error("Failed to update main image");
        }
    }

    let image_id = match sqlx::query(
        "INSERT INTO room_images (room_id, image_url, is_main) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(room_id)
    .bind(&body.image_url)
    .bind(body.is_main)
    .fetch_one(&mut *tx)
    .await
    {
        Ok(row) => row.get::<i64, _>("id"),
        Err(_) => return server_error("Failed to save image"),
    };

    if tx.commit().await.is_err() {
        return server_error("Failed to commit transaction");
    }

    created(
        "Image uploaded successfully",
        serde_json::json!({ "imageId": image_id }),
    )
}
