//! Request gate for protected routes.
//!
//! Every request runs through an [`InterceptorChain`] before reaching its
//! handler. Each stage either forwards the request (possibly annotated with
//! extensions), dispatches it straight to the handler, or rejects it with a
//! terminal response.

use crate::auth::jwt::TokenService;
use crate::types::{AppError, Claims};
use axum::{
    extract::{FromRequestParts, OriginalUri, Request},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::debug;

/// Outcome of one interceptor.
pub enum Flow {
    /// Hand the request to the next interceptor.
    Continue(Request),
    /// Skip the remaining interceptors and run the handler.
    Dispatch(Request),
    /// Answer with this response; the handler never runs.
    Reject(Response),
}

pub trait Interceptor: Send + Sync {
    fn name(&self) -> &'static str;

    fn intercept(&self, req: Request) -> Flow;
}

/// Ordered list of interceptors applied to every gated request.
#[derive(Default)]
pub struct InterceptorChain {
    stages: Vec<Box<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a stage to the end of the chain.
    pub fn with(mut self, stage: impl Interceptor + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Public-path bypass, then bearer extraction, then token verification.
    pub fn standard(tokens: Arc<TokenService>, public_prefixes: Vec<String>) -> Self {
        Self::new()
            .with(PublicPaths::new(public_prefixes))
            .with(BearerExtraction)
            .with(TokenVerification::new(tokens))
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Runs the stages in order. `Ok` carries the request to hand to the
    /// handler, `Err` the terminal response.
    pub fn apply(&self, mut req: Request) -> Result<Request, Response> {
        for stage in &self.stages {
            match stage.intercept(req) {
                Flow::Continue(next) => req = next,
                Flow::Dispatch(next) => {
                    debug!(stage = stage.name(), "request dispatched without further checks");
                    return Ok(next);
                }
                Flow::Reject(response) => {
                    debug!(
                        stage = stage.name(),
                        status = %response.status(),
                        "request rejected"
                    );
                    return Err(response);
                }
            }
        }
        Ok(req)
    }
}

pub async fn auth_middleware(chain: Arc<InterceptorChain>, req: Request, next: Next) -> Response {
    match chain.apply(req) {
        Ok(req) => next.run(req).await,
        Err(response) => response,
    }
}

/// Full request path, even when the router is nested.
fn request_path(req: &Request) -> &str {
    req.extensions()
        .get::<OriginalUri>()
        .map(|uri| uri.0.path())
        .unwrap_or_else(|| req.uri().path())
}

/// Lets requests under the configured prefixes through unauthenticated.
///
/// Matching is a plain string prefix, so `/api/user` also covers
/// `/api/users`.
pub struct PublicPaths {
    prefixes: Vec<String>,
}

impl PublicPaths {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    pub fn is_public(&self, path: &str) -> bool {
        self.prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }
}

impl Interceptor for PublicPaths {
    fn name(&self) -> &'static str {
        "public-paths"
    }

    fn intercept(&self, req: Request) -> Flow {
        if self.is_public(request_path(&req)) {
            Flow::Dispatch(req)
        } else {
            Flow::Continue(req)
        }
    }
}

/// Raw token taken from the `Authorization` header, awaiting verification.
#[derive(Clone)]
pub struct BearerToken(pub String);

/// Requires `Authorization: Bearer <token>`.
pub struct BearerExtraction;

impl BearerExtraction {
    fn token(req: &Request) -> Option<String> {
        req.headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }
}

impl Interceptor for BearerExtraction {
    fn name(&self) -> &'static str {
        "bearer-extraction"
    }

    fn intercept(&self, mut req: Request) -> Flow {
        match Self::token(&req) {
            Some(token) => {
                req.extensions_mut().insert(BearerToken(token));
                Flow::Continue(req)
            }
            None => Flow::Reject(
                AppError::Unauthorized("no Authorization header".to_string()).into_response(),
            ),
        }
    }
}

/// Verifies the extracted token and stores its [`Claims`] on the request.
pub struct TokenVerification {
    tokens: Arc<TokenService>,
}

impl TokenVerification {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }
}

impl Interceptor for TokenVerification {
    fn name(&self) -> &'static str {
        "token-verification"
    }

    fn intercept(&self, mut req: Request) -> Flow {
        let Some(BearerToken(token)) = req.extensions_mut().remove::<BearerToken>() else {
            return Flow::Reject(
                AppError::Unauthorized("no Authorization header".to_string()).into_response(),
            );
        };

        match self.tokens.verify(&token) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                Flow::Continue(req)
            }
            Err(e) => {
                debug!("token verification failed: {}", e);
                Flow::Reject(AppError::Unauthorized("invalid token".to_string()).into_response())
            }
        }
    }
}

/// Extractor for the identity attached by [`TokenVerification`].
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| AppError::Unauthorized("no authenticated identity".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;

    const SECRET: &str = "middleware-test-secret-32-characters";

    fn tokens() -> Arc<TokenService> {
        Arc::new(TokenService::new(SECRET, None))
    }

    fn chain() -> InterceptorChain {
        InterceptorChain::standard(tokens(), vec!["/api/user".to_string()])
    }

    fn request(path: &str, auth: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri(path);
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(Body::empty()).expect("valid request")
    }

    fn claims() -> Claims {
        Claims {
            id: "user-1".to_string(),
            email: "a@b.com".to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
            profile_picture: None,
            exp: None,
        }
    }

    #[test]
    fn test_standard_order() {
        assert_eq!(
            chain().stage_names(),
            vec!["public-paths", "bearer-extraction", "token-verification"]
        );
    }

    #[test]
    fn test_public_prefix_bypasses_auth() {
        for path in ["/api/user/login", "/api/user/verify", "/api/users"] {
            let req = chain().apply(request(path, None)).expect("should pass");
            assert!(req.extensions().get::<Claims>().is_none());
        }
    }

    #[test]
    fn test_missing_header_rejected() {
        let response = chain()
            .apply(request("/api/animals", None))
            .expect_err("should reject");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_non_bearer_scheme_rejected() {
        let response = chain()
            .apply(request("/api/animals", Some("Basic dXNlcjpwdw==")))
            .expect_err("should reject");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let response = chain()
            .apply(request("/api/animals", Some("Bearer ")))
            .expect_err("should reject");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_invalid_token_rejected() {
        let response = chain()
            .apply(request("/api/animals", Some("Bearer not.a.token")))
            .expect_err("should reject");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_valid_token_attaches_claims() {
        let token = tokens().issue(&claims()).expect("should issue");
        let req = chain()
            .apply(request("/api/animals", Some(&format!("Bearer {}", token))))
            .expect("should pass");

        assert_eq!(req.extensions().get::<Claims>(), Some(&claims()));
        assert!(req.extensions().get::<BearerToken>().is_none());
    }

    #[test]
    fn test_verification_without_extraction_rejects() {
        let chain = InterceptorChain::new().with(TokenVerification::new(tokens()));
        let response = chain
            .apply(request("/api/animals", None))
            .expect_err("should reject");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_empty_chain_forwards() {
        let req = InterceptorChain::new()
            .apply(request("/anything", None))
            .expect("should pass");
        assert_eq!(req.uri().path(), "/anything");
    }

    #[test]
    fn test_original_uri_used_for_nested_routes() {
        let mut req = request("/login", None);
        req.extensions_mut()
            .insert(OriginalUri("/api/user/login".parse().expect("valid uri")));

        assert!(chain().apply(req).is_ok());
    }
}
