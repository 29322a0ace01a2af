//! # Trainlog - training-log REST server
//!
//! An HTTP/JSON backend for recording animal training: users register and
//! authenticate, then create animals and training-log entries and attach
//! images and videos to them.
//!
//! ## Overview
//!
//! The crate can be used in two ways:
//!
//! 1. **As a standalone server** - Run the `trainlog-server` binary
//! 2. **As a library** - Build the router yourself, e.g. for tests
//!
//! ### Embedding the router
//!
//! ```rust,ignore
//! use trainlog::{api::routes::create_router, AppState, TrainlogConfig};
//!
//! let config = TrainlogConfig::load("trainlog.toml")?;
//! let state = AppState::initialize(config).await?;
//! let app = create_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `swagger-ui` | Interactive API docs at `/swagger-ui` |
//!
//! ## Modules
//!
//! - [`api`] - REST API handlers, routes and OpenAPI document
//! - [`auth`] - Password hashing, bearer tokens and the request gate
//! - [`cli`] - Command-line interface
//! - [`db`] - Persistence (libsql: in-memory, local file, remote Turso)
//! - [`storage`] - Blob storage for uploads
//! - [`types`] - Records and error handling
//! - [`validation`] - Field-level input validation
//! - [`utils`] - Configuration

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rustdoc::missing_crate_level_docs)]

/// HTTP API handlers and routes.
pub mod api;
/// Credential hashing, tokens and middleware.
pub mod auth;
/// Command-line interface.
pub mod cli;
/// Database clients (libsql/Turso).
pub mod db;
/// Blob stores for uploaded media.
pub mod storage;
/// Core types (records, claims, errors).
pub mod types;
/// Configuration utilities.
pub mod utils;
/// Request payload validation.
pub mod validation;

// Re-export commonly used types
pub use auth::{CredentialHasher, TokenService};
pub use db::{DatabaseClient, DatabaseProvider, TursoClient};
pub use storage::{BlobStore, StorageProvider};
pub use types::{AppError, Result};
pub use utils::toml_config::TrainlogConfig;

use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Application state shared across handlers
///
/// Built once at startup and read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    /// Effective configuration
    pub config: Arc<TrainlogConfig>,
    /// Users, animals and training logs
    pub db: Arc<dyn DatabaseClient>,
    /// Uploaded images and videos
    pub blobs: Arc<dyn BlobStore>,
    /// Password hashing
    pub hasher: Arc<CredentialHasher>,
    /// Bearer token issuance and verification
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Opens the database and blob store and resolves the signing secret.
    pub async fn initialize(config: TrainlogConfig) -> anyhow::Result<Self> {
        let secret = config.jwt_secret()?;
        let tokens = TokenService::new(&secret, config.auth.token_expiry_secs);

        let password = &config.auth.password;
        let hasher =
            CredentialHasher::with_params(password.memory_kib, password.iterations, password.parallelism)
                .context("Invalid [auth.password] parameters")?;

        let provider = DatabaseProvider::from_config(&config.database);
        info!(backend = provider.kind(), "opening database");
        let db = provider
            .create_client()
            .await
            .context("Failed to open database")?;

        let blobs = StorageProvider::from_config(&config.storage)
            .create_store()
            .await
            .context("Failed to open blob storage")?;

        Ok(Self {
            config: Arc::new(config),
            db: Arc::from(db),
            blobs,
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
        })
    }
}
