//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by resource.

/// Paged admin listings.
pub mod admin;
/// Animal creation.
pub mod animals;
/// Multipart upload and record linking.
pub mod files;
/// Liveness probe.
pub mod health;
/// Credential checks and token issuance.
pub mod session;
/// Training log creation.
pub mod training;
/// User registration.
pub mod users;
