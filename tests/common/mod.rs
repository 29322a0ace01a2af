//! Shared helpers for the integration tests.

#![allow(dead_code)]

use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;
use trainlog::{
    api::routes::create_router,
    db::{DatabaseClient, TursoClient},
    storage::MemoryBlobStore,
    utils::toml_config::{StorageBackend, TrainlogConfig},
    AppState, CredentialHasher, TokenService,
};

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const PUBLIC_URL: &str = "http://blobs.test";
pub const UPLOAD_LIMIT: usize = 64 * 1024;

pub struct TestApp {
    pub server: TestServer,
    pub db: Arc<dyn DatabaseClient>,
    pub blobs: Arc<MemoryBlobStore>,
    pub tokens: Arc<TokenService>,
}

pub fn test_config() -> TrainlogConfig {
    let mut config = TrainlogConfig::default();
    config.database.url = ":memory:".to_string();
    config.storage.backend = StorageBackend::Memory;
    config.storage.public_url = PUBLIC_URL.to_string();
    config.storage.max_upload_bytes = UPLOAD_LIMIT;
    config
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(test_config()).await
}

pub async fn spawn_app_with(config: TrainlogConfig) -> TestApp {
    let db = TursoClient::new_memory()
        .await
        .expect("Failed to create in-memory database");
    spawn_app_with_db(config, Arc::new(db)).await
}

pub async fn spawn_app_with_db(config: TrainlogConfig, db: Arc<dyn DatabaseClient>) -> TestApp {
    let blobs = Arc::new(MemoryBlobStore::new(&config.storage.public_url));
    let tokens = Arc::new(TokenService::new(TEST_SECRET, config.auth.token_expiry_secs));
    // Cheap Argon2 parameters keep the suite fast
    let hasher = CredentialHasher::with_params(64, 1, 1).expect("valid params");

    let state = AppState {
        config: Arc::new(config),
        db: db.clone(),
        blobs: blobs.clone(),
        hasher: Arc::new(hasher),
        tokens: tokens.clone(),
    };

    let server = TestServer::new(create_router(state)).expect("Failed to create test server");

    TestApp {
        server,
        db,
        blobs,
        tokens,
    }
}

pub fn user_payload(email: &str, password: &str) -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "email": email,
        "password": password
    })
}

impl TestApp {
    /// Registers a user and returns the stored record.
    pub async fn register(&self, email: &str, password: &str) -> Value {
        let response = self
            .server
            .post("/api/users")
            .json(&user_payload(email, password))
            .await;
        response.assert_status_ok();
        response.json()
    }

    /// Exchanges credentials for a bearer token.
    pub async fn token(&self, email: &str, password: &str) -> String {
        let response = self
            .server
            .post("/api/user/verify")
            .json(&json!({ "email": email, "password": password }))
            .await;
        response.assert_status_ok();
        response.text()
    }

    /// Registers a fresh user and returns `(user, token)`.
    pub async fn signed_in(&self, email: &str) -> (Value, String) {
        let user = self.register(email, "correct horse").await;
        let token = self.token(email, "correct horse").await;
        (user, token)
    }
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
