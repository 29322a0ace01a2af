//! Authentication and authorization.
//!
//! # Module Structure
//!
//! - [`auth::password`](crate::auth::password) - Argon2id credential hashing
//! - [`auth::jwt`](crate::auth::jwt) - bearer token issuance and verification
//! - [`auth::middleware`](crate::auth::middleware) - interceptor chain and the `AuthUser` extractor
//!
//! # Security Features
//!
//! - **Password Hashing**: Argon2id (memory-hard), PHC-formatted digests
//! - **Tokens**: HS256 JWTs signed with a single shared secret; expiry is
//!   opt-in through `auth.token_expiry_secs`
//! - **Gate**: every route outside the public prefixes needs
//!   `Authorization: Bearer <token>`
//!
//! # Extracting the identity in handlers
//!
//! ```ignore
//! async fn protected_handler(AuthUser(claims): AuthUser) -> impl IntoResponse {
//!     format!("Hello, {}!", claims.first_name)
//! }
//! ```
//!
//! # Configuration
//!
//! ```toml
//! [auth]
//! jwt_secret_env = "JWT_SECRET"
//! token_expiry_secs = 86400
//! public_paths = ["/api/user", "/api/health"]
//! ```

/// Bearer token issuance and verification.
pub mod jwt;
/// Request gate and identity extractor.
pub mod middleware;
/// Password hashing and verification.
pub mod password;

pub use jwt::TokenService;
pub use middleware::{AuthUser, InterceptorChain};
pub use password::CredentialHasher;
