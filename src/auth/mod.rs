use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{error, web, FromRequest, HttpRequest, HttpResponse};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::config::Config;
use crate::handlers::ErrorBody;
use crate::models::user::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: i64,
    pub role: Role,
    pub exp: usize,
}

pub fn generate_token(
    user_id: i64,
    role: Role,
    secret: &str,
    ttl_hours: i64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let claims = Claims {
        sub: user_id,
        role,
        exp: (Utc::now() + Duration::hours(ttl_hours)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, secret: &str) -> Option<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .ok()
}

/// Authenticated caller, extracted from the `Authorization: Bearer` header.
/// Signature and expiry are checked before any handler runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn has_role(&self, required: Role) -> bool {
        self.role >= required
    }
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        let secret = req
            .app_data::<web::Data<Config>>()
            .map(|config| config.jwt_secret.as_str());

        let result = match (token, secret) {
            (Some(token), Some(secret)) => match verify_token(token, secret) {
                Some(claims) => Ok(AuthUser {
                    id: claims.sub,
                    role: claims.role,
                }),
                None => Err(auth_error("Invalid or expired token")),
            },
            (None, _) => Err(auth_error("Missing bearer token")),
            (_, None) => Err(auth_error("Authentication is not configured")),
        };

        ready(result)
    }
}

fn auth_error(message: &str) -> actix_web::Error {
    error::InternalError::from_response(
        message.to_string(),
        HttpResponse::Unauthorized().json(ErrorBody {
            error: message.to_string(),
        }),
    )
    .into()
}
