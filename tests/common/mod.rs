// tests/common/mod.rs

#![allow(dead_code)]

use std::sync::Arc;

use quizhub::{
    config::Config,
    repositories::Repositories,
    routes,
    state::AppState,
    utils::{
        cache::{CodeCache, MemoryCodeCache},
        notifier::LogNotifier,
    },
};
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;

pub const ADMIN_EMAIL: &str = "admin@quizhub.test";
pub const ADMIN_PASSWORD: &str = "admin@pass";

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub codes: Arc<MemoryCodeCache>,
}

fn test_config(database_url: Option<String>) -> Config {
    Config {
        use_memory_store: database_url.is_none(),
        database_url,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        access_token_minutes: 10,
        refresh_token_minutes: 60,
        verify_code_ttl_seconds: 120,
        server_port: 0,
        rust_log: "error".to_string(),
        admin_email: Some(ADMIN_EMAIL.to_string()),
        admin_password: Some(ADMIN_PASSWORD.to_string()),
    }
}

/// Spawns the app on a random port on top of the in-memory store.
pub async fn spawn_app() -> TestApp {
    spawn_with(test_config(None), Repositories::in_memory()).await
}

/// Spawns the app on top of the Postgres database named by `DATABASE_URL`.
/// Returns `None` when the variable is not set.
pub async fn spawn_pg_app() -> Option<TestApp> {
    let Some(database_url) = std::env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()) else {
        eprintln!("DATABASE_URL is not set, skipping Postgres test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    Some(spawn_with(test_config(Some(database_url)), Repositories::postgres(pool)).await)
}

async fn spawn_with(config: Config, repos: Repositories) -> TestApp {
    let codes = Arc::new(MemoryCodeCache::new());
    let state = AppState::with_delivery(config, repos, codes.clone(), Arc::new(LogNotifier));
    state.auth.seed_admin().await.expect("Failed to seed admin");

    let app = routes::create_router(state);

    // Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        client: reqwest::Client::new(),
        codes,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Value) -> reqwest::Response {
        let mut request = self.client.post(self.url(path)).json(&body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn put(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .put(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn patch(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn delete(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Runs the send-code → register → login flow and returns the access token.
    pub async fn register_and_login(&self) -> String {
        let email = format!("{}@quizhub.test", uuid::Uuid::new_v4());
        let password = "s3cret!pass";

        let response = self
            .post("/api/auth/register/send-code", None, json!({ "email": email }))
            .await;
        assert_eq!(response.status().as_u16(), 202);

        let code: u32 = self
            .codes
            .get(&email)
            .expect("code was not cached")
            .parse()
            .unwrap();

        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "email": email,
                    "full_name": "Test User",
                    "password": password,
                    "verify_code": code
                }),
            )
            .await;
        assert_eq!(response.status().as_u16(), 201);

        self.login(&email, password).await
    }

    pub async fn login(&self, email: &str, password: &str) -> String {
        let body: Value = self
            .post(
                "/api/auth/login",
                None,
                json!({ "email": email, "password": password }),
            )
            .await
            .json()
            .await
            .expect("Failed to parse login json");
        body["access_token"]
            .as_str()
            .expect("Token not found")
            .to_string()
    }
}
