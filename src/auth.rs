use actix_web::http::header;
use actix_web::HttpRequest;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

pub const ACCESS_COOKIE: &str = "access_token";
const TOKEN_DAYS: i64 = 2;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub user_id: i64,
    pub guru_id: Option<i64>,
    pub exp: usize,
}

/// Identitas yang dibawa token: user dan (kalau ada) guru miliknya.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
    pub guru_id: Option<i64>,
}

fn jwt_secret() -> Result<String, ApiError> {
    std::env::var("JWT_SECRET").map_err(|_| {
        log::error!("JWT_SECRET belum diset");
        ApiError::server("JWT_SECRET belum diset")
    })
}

pub fn generate_jwt(identity: &Identity) -> Result<String, ApiError> {
    let secret = jwt_secret()?;
    let now = Utc::now();
    let claims = Claims {
        sub: identity.username.clone(),
        user_id: identity.user_id,
        guru_id: identity.guru_id,
        exp: (now + chrono::Duration::days(TOKEN_DAYS)).timestamp() as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| {
        log::error!("Gagal menghasilkan JWT: {:?}", e);
        ApiError::server("Gagal menghasilkan token")
    })
}

pub fn decode_token(token: &str) -> Result<Claims, ApiError> {
    let secret = jwt_secret()?;
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|e| {
        log::warn!("JWT verification failed: {:?}", e);
        ApiError::Unauthorized(format!("Token tidak valid atau kedaluwarsa: {}", e))
    })?;

    Ok(token_data.claims)
}

/// Ambil token dari header `Authorization: Bearer` (aplikasi mobile) atau cookie `access_token`.
fn extract_token(req: &HttpRequest) -> Option<String> {
    let bearer = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    bearer.or_else(|| req.cookie(ACCESS_COOKIE).map(|c| c.value().to_string()))
}

pub fn verify_jwt(req: &HttpRequest) -> Result<Claims, ApiError> {
    let token = extract_token(req).ok_or_else(|| {
        log::warn!("No token found in request to {}", req.path());
        ApiError::Unauthorized("Token tidak ditemukan".into())
    })?;

    decode_token(&token)
}
