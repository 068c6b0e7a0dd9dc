// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Length of generated quiz paths and participant username suffixes.
pub const RANDOM_SUFFIX_LENGTH: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    /// Required unless `use_memory_store` is set.
    pub database_url: Option<String>,
    /// Opt-in throwaway store for demos. Data is lost on restart.
    pub use_memory_store: bool,
    pub jwt_secret: String,
    pub access_token_minutes: u64,
    pub refresh_token_minutes: u64,
    pub verify_code_ttl_seconds: u64,
    pub server_port: u16,
    pub rust_log: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        let use_memory_store = parse_or("USE_MEMORY_STORE", false);
        if database_url.is_none() && !use_memory_store {
            panic!("DATABASE_URL must be set (or USE_MEMORY_STORE=true for a throwaway store)");
        }

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        Self {
            database_url,
            use_memory_store,
            jwt_secret,
            access_token_minutes: parse_or("ACCESS_TOKEN_MINUTES", 30),
            refresh_token_minutes: parse_or("REFRESH_TOKEN_MINUTES", 24 * 60 * 30),
            verify_code_ttl_seconds: parse_or("VERIFY_CODE_TTL_SECONDS", 120),
            server_port: parse_or("SERVER_PORT", 3000),
            rust_log,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_falls_back_on_missing_key() {
        let port: u16 = parse_or("QUIZHUB_SURELY_UNSET_PORT", 4242);
        assert_eq!(port, 4242);
    }
}
