// src/utils/jwt.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{config::Config, error::AppError, models::user::UserInfo};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID (as string).
    pub sub: String,
    pub is_admin: bool,
    pub kind: TokenKind,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn user_info(&self) -> Result<UserInfo, AppError> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::Unauthorized("Invalid token subject".to_string()))?;
        Ok(UserInfo {
            user_id,
            is_admin: self.is_admin,
        })
    }
}

/// Signs a new JWT of the given kind, valid for `ttl_minutes`.
pub fn sign_jwt(
    user_id: i64,
    is_admin: bool,
    kind: TokenKind,
    secret: &str,
    ttl_minutes: u64,
) -> Result<String, AppError> {
    let expiration = Utc::now() + Duration::minutes(ttl_minutes as i64);

    let claims = Claims {
        sub: user_id.to_string(),
        is_admin,
        kind,
        exp: expiration.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string, requiring the expected kind.
pub fn verify_jwt(token: &str, secret: &str, expected: TokenKind) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized("Invalid token".to_string()))?;

    if token_data.claims.kind != expected {
        return Err(AppError::Unauthorized("Invalid token".to_string()));
    }

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header against an access token
/// and injects the caller's `UserInfo` into the request extensions.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = verify_jwt(token, &config.jwt_secret, TokenKind::Access)?;
    let user = claims.user_info()?;

    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}
