// src/models/user.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,

    /// Unique login e-mail.
    pub email: String,

    pub full_name: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    pub is_admin: bool,
}

/// Verified identity of the caller, derived from an access token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserInfo {
    pub user_id: i64,
    pub is_admin: bool,
}

/// DTO for requesting an e-mail verification code.
#[derive(Debug, Deserialize, Validate)]
pub struct SendCodeRequest {
    #[validate(email)]
    pub email: String,
}

/// DTO for creating a new user (Registration).
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(
        min = 4,
        max = 50,
        message = "Full name length must be between 4 and 50 characters."
    ))]
    pub full_name: String,
    #[validate(
        length(min = 6, max = 60, message = "Password length must be between 6 and 60 characters."),
        custom(function = validate_strong_password)
    )]
    pub password: String,
    pub verify_code: u32,
}

fn validate_strong_password(password: &str) -> Result<(), validator::ValidationError> {
    if !password.chars().any(|c| "@$!%*?&".contains(c)) {
        return Err(validator::ValidationError::new("weak_password")
            .with_message("Password must contain one of @$!%*?&".into()));
    }
    Ok(())
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(password: &str) -> RegisterRequest {
        RegisterRequest {
            email: "someone@example.com".to_string(),
            full_name: "Some One".to_string(),
            password: password.to_string(),
            verify_code: 12345,
        }
    }

    #[test]
    fn test_password_needs_special_character() {
        assert!(register("plainpass").validate().is_err());
        assert!(register("strong@pass").validate().is_ok());
    }

    #[test]
    fn test_password_length_bounds() {
        assert!(register("a@b").validate().is_err());
        assert!(register(&format!("{}@", "x".repeat(60))).validate().is_err());
    }
}
