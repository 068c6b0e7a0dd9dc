// src/services/auth_service.rs

use std::{sync::Arc, time::Duration};

use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::user::{
        LoginRequest, RefreshRequest, RegisterRequest, SendCodeRequest, TokenResponse, User,
        UserInfo,
    },
    repositories::UserRepository,
    utils::{
        cache::CodeCache,
        hash::{hash_password, verify_password},
        jwt::{TokenKind, sign_jwt, verify_jwt},
        notifier::Notifier,
        random::verify_code,
    },
};

const TOKEN_TYPE: &str = "Bearer";

/// Account registration, login and token refresh.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    codes: Arc<dyn CodeCache>,
    notifier: Arc<dyn Notifier>,
    config: Config,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        codes: Arc<dyn CodeCache>,
        notifier: Arc<dyn Notifier>,
        config: Config,
    ) -> Self {
        Self {
            users,
            codes,
            notifier,
            config,
        }
    }

    /// Issues a one-time code. Delivery runs detached and never fails the request.
    pub async fn send_verify_code(&self, request: SendCodeRequest) -> AppResult<()> {
        request.validate()?;

        if self.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("email already registered".to_string()));
        }
        if self.codes.get(&request.email).is_some() {
            return Err(AppError::TooManyRequests(
                "a verification code was sent recently".to_string(),
            ));
        }

        let code = verify_code();
        self.codes.set(
            &request.email,
            code.to_string(),
            Duration::from_secs(self.config.verify_code_ttl_seconds),
        );

        let notifier = self.notifier.clone();
        let recipient = request.email;
        tokio::spawn(async move {
            if let Err(e) = notifier.send_code(&recipient, code).await {
                tracing::error!("Failed to deliver verification code to {}: {:?}", recipient, e);
            }
        });

        Ok(())
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<User> {
        request.validate()?;

        if self.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("email already registered".to_string()));
        }

        let expected = request.verify_code.to_string();
        if self.codes.get(&request.email).as_deref() != Some(expected.as_str()) {
            return Err(AppError::Validation("invalid verification code".to_string()));
        }
        self.codes.delete(&request.email);

        let password_hash = hash_password(&request.password)?;
        let user = self
            .users
            .create(&request.email, &request.full_name, &password_hash, false)
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<TokenResponse> {
        request.validate()?;

        let user = self
            .users
            .find_by_email(&request.email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password)? {
            return Err(AppError::Unauthorized(
                "invalid email or password".to_string(),
            ));
        }

        Ok(TokenResponse {
            access_token: self.access_token(&user)?,
            refresh_token: Some(sign_jwt(
                user.id,
                user.is_admin,
                TokenKind::Refresh,
                &self.config.jwt_secret,
                self.config.refresh_token_minutes,
            )?),
            token_type: TOKEN_TYPE,
        })
    }

    /// New access token from a refresh token. The admin flag is re-read from the store.
    pub async fn refresh(&self, request: RefreshRequest) -> AppResult<TokenResponse> {
        let claims = verify_jwt(
            &request.refresh_token,
            &self.config.jwt_secret,
            TokenKind::Refresh,
        )?;
        let info = claims.user_info()?;

        let user = self
            .users
            .find_by_id(info.user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("user no longer exists".to_string()))?;

        Ok(TokenResponse {
            access_token: self.access_token(&user)?,
            refresh_token: None,
            token_type: TOKEN_TYPE,
        })
    }

    pub async fn profile(&self, user: UserInfo) -> AppResult<User> {
        self.users
            .find_by_id(user.user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    /// Creates the configured admin account if it does not exist yet.
    pub async fn seed_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (&self.config.admin_email, &self.config.admin_password)
        else {
            return Ok(());
        };

        if self.users.email_exists(email).await? {
            return Ok(());
        }

        tracing::info!("Seeding admin user: {}", email);
        let password_hash = hash_password(password)?;
        match self.users.create(email, "Administrator", &password_hash, true).await {
            Ok(_) => tracing::info!("Admin user created successfully."),
            // Another instance seeded it first.
            Err(AppError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
        Ok(())
    }

    fn access_token(&self, user: &User) -> AppResult<String> {
        sign_jwt(
            user.id,
            user.is_admin,
            TokenKind::Access,
            &self.config.jwt_secret,
            self.config.access_token_minutes,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{repositories::MemoryStore, utils::cache::MemoryCodeCache, utils::notifier::LogNotifier};

    fn config() -> Config {
        Config {
            database_url: None,
            use_memory_store: true,
            jwt_secret: "auth-service-test".to_string(),
            access_token_minutes: 5,
            refresh_token_minutes: 60,
            verify_code_ttl_seconds: 120,
            server_port: 0,
            rust_log: "info".to_string(),
            admin_email: Some("root@example.com".to_string()),
            admin_password: Some("r00t@pass".to_string()),
        }
    }

    fn service() -> (AuthService, Arc<MemoryCodeCache>) {
        let codes = Arc::new(MemoryCodeCache::new());
        let service = AuthService::new(
            Arc::new(MemoryStore::new()),
            codes.clone(),
            Arc::new(LogNotifier),
            config(),
        );
        (service, codes)
    }

    fn registration(code: u32) -> RegisterRequest {
        RegisterRequest {
            email: "new@example.com".to_string(),
            full_name: "New User".to_string(),
            password: "pa$$word".to_string(),
            verify_code: code,
        }
    }

    #[tokio::test]
    async fn test_code_cooldown_and_registration() {
        let (service, codes) = service();
        let send = || SendCodeRequest {
            email: "new@example.com".to_string(),
        };

        service.send_verify_code(send()).await.unwrap();
        assert!(matches!(
            service.send_verify_code(send()).await,
            Err(AppError::TooManyRequests(_))
        ));

        let code: u32 = codes.get("new@example.com").unwrap().parse().unwrap();
        let wrong = if code == 99999 { 11111 } else { code + 1 };
        assert!(matches!(
            service.register(registration(wrong)).await,
            Err(AppError::Validation(_))
        ));

        let user = service.register(registration(code)).await.unwrap();
        assert!(!user.is_admin);
        assert_eq!(codes.get("new@example.com"), None);

        assert!(matches!(
            service.send_verify_code(send()).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_login_and_refresh() {
        let (service, _) = service();
        service.seed_admin().await.unwrap();
        service.seed_admin().await.unwrap();

        let bad = service
            .login(LoginRequest {
                email: "root@example.com".to_string(),
                password: "nope".to_string(),
            })
            .await;
        assert!(matches!(bad, Err(AppError::Unauthorized(_))));

        let tokens = service
            .login(LoginRequest {
                email: "root@example.com".to_string(),
                password: "r00t@pass".to_string(),
            })
            .await
            .unwrap();
        let access = verify_jwt(&tokens.access_token, "auth-service-test", TokenKind::Access).unwrap();
        assert!(access.is_admin);

        let refresh_token = tokens.refresh_token.unwrap();
        let refreshed = service
            .refresh(RefreshRequest {
                refresh_token,
            })
            .await
            .unwrap();
        assert!(refreshed.refresh_token.is_none());

        // An access token cannot be used to refresh.
        assert!(service
            .refresh(RefreshRequest {
                refresh_token: tokens.access_token,
            })
            .await
            .is_err());
    }
}
