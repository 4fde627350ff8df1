use actix_web::{web, Responder};
use sqlx::{Row, SqlitePool};
use validator::Validate;

use crate::auth::generate_token;
use crate::config::Config;
use crate::handlers::{bad_request, created, server_error, success, unauthorized};
use crate::models::user::{LoginRequest, LoginResponse, RegisterRequest, Role, User, UserResponse};

pub async fn register(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    body: web::Json<RegisterRequest>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return bad_request(&e.to_string());
    }

    let role = body.role.unwrap_or(Role::Student);
    if role == Role::Admin {
        return bad_request("Admin accounts cannot be self-registered");
    }

    let existing: Option<i64> = match sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(&body.email)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(row) => row,
        Err(_) => return server_error("Database error"),
    };
    if existing.is_some() {
        return bad_request("Email is already registered");
    }

    let password_hash = match bcrypt::hash(&body.password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(_) => return server_error("Failed to hash password"),
    };

    let phone = body.phone.clone().unwrap_or_default();
    let user_id = match sqlx::query(
        "INSERT INTO users (name, email, phone, password_hash, role) VALUES (?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&body.name)
    .bind(&body.email)
    .bind(&phone)
    .bind(&password_hash)
    .bind(role)
    .fetch_one(pool.get_ref())
    .await
    {
        Ok(row) => row.get::<i64, _>("id"),
        Err(_) => return server_error("Failed to create account"),
    };

    let token = match generate_token(user_id, role, &config.jwt_secret, config.token_ttl_hours) {
        Ok(token) => token,
        Err(_) => return server_error("Failed to issue token"),
    };

    created(
        "Account created successfully",
        LoginResponse {
            token,
            user: UserResponse {
                id: user_id,
                name: body.name.clone(),
                email: body.email.clone(),
                phone,
                role,
            },
        },
    )
}

pub async fn login(
    pool: web::Data<SqlitePool>,
    config: web::Data<Config>,
    body: web::Json<LoginRequest>,
) -> impl Responder {
    if body.email.trim().is_empty() || body.password.is_empty() {
        return bad_request("Please enter both email and password");
    }

    let user = match sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(&body.email)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => return unauthorized("Invalid email or password"),
        Err(_) => return server_error("Database error"),
    };

    match bcrypt::verify(&body.password, &user.password_hash) {
        Ok(true) => {}
        _ => return unauthorized("Invalid email or password"),
    }

    let token = match generate_token(user.id, user.role, &config.jwt_secret, config.token_ttl_hours)
    {
        Ok(token) => token,
        Err(_) => return server_error("Failed to issue token"),
    };

    success(
        "Login successful",
        LoginResponse {
            token,
            user: user.into(),
        },
    )
}
