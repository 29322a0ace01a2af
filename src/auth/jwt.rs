use crate::types::{AppError, Claims, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::collections::HashSet;

/// Issues and verifies HS256 bearer tokens.
///
/// Issuer and verifier are the same process, so a single shared secret is
/// enough. Tokens carry no expiry unless one is configured.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_secs: Option<u64>,
}

impl TokenService {
    /// Creates a new TokenService.
    ///
    /// # Arguments
    /// * `secret` - Shared signing key
    /// * `expiry_secs` - Token lifetime in seconds, `None` for non-expiring tokens
    pub fn new(secret: &str, expiry_secs: Option<u64>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_secs,
        }
    }

    pub fn expiry_secs(&self) -> Option<u64> {
        self.expiry_secs
    }

    /// Signs `claims` into a compact JWT.
    ///
    /// When expiry is configured and the claims carry no `exp`, one is stamped
    /// relative to now.
    pub fn issue(&self, claims: &Claims) -> Result<String> {
        let mut claims = claims.clone();
        if let (Some(expiry), None) = (self.expiry_secs, claims.exp) {
            let now = Utc::now().timestamp().max(0) as u64;
            let exp = now.checked_add(expiry).ok_or_else(|| {
                AppError::Internal(format!("Token expiry of {}s is out of range", expiry))
            })?;
            claims.exp = Some(exp);
        }

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies a token's signature (and expiry, when configured) and returns
    /// the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation())
            .map(|data| data.claims)
            .map_err(|e| AppError::Unauthorized(format!("invalid token: {}", e)))
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        let mut required = HashSet::new();
        if self.expiry_secs.is_some() {
            required.insert("exp".to_string());
        }
        validation.required_spec_claims = required;
        validation
    }
}
