//! HTTP API Handlers and Routes
//!
//! This module provides the REST API layer, built on the Axum web framework.
//!
//! # Module Structure
//!
//! - [`api::handlers`](crate::api::handlers) - Request handlers for each endpoint
//! - [`api::routes`](crate::api::routes) - Route definitions and router configuration
//! - [`api::docs`](crate::api::docs) - OpenAPI document
//!
//! # API Endpoints
//!
//! ## Public
//! - `GET /api/health` - Liveness probe
//! - `POST /api/users` - Register a user
//! - `POST /api/user/login` - Check credentials
//! - `POST /api/user/verify` - Check credentials and receive a bearer token
//!
//! ## Protected
//! - `POST /api/animals` - Create an animal
//! - `POST /api/training` - Record a training session
//! - `GET /api/admin/{animals,users,training}` - Paged listings (`count`, `offset`)
//! - `POST /api/file/upload` - Upload an image or video and link it to a record
//!
//! # Authentication
//!
//! Protected endpoints require a token from `/api/user/verify`:
//! ```text
//! Authorization: Bearer <token>
//! ```
//!
//! # OpenAPI Documentation
//!
//! The document is served at `/api-docs/openapi.json`. When the `swagger-ui`
//! feature is enabled, interactive documentation is available at
//! `/swagger-ui/`.

/// OpenAPI document.
pub mod docs;
/// Request and response handlers for all API endpoints.
pub mod handlers;
/// Router configuration and route definitions.
pub mod routes;
