use crate::{
    types::{AppError, Claims, Result, User},
    validation::{FieldReader, Valid, Validate},
    AppState,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Validate for Credentials {
    fn from_fields(fields: &mut FieldReader<'_>) -> Option<Self> {
        let email = fields.string("email");
        let password = fields.string("password");

        Some(Self {
            email: email?,
            password: password?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// Looks up the user and checks the password against the stored hash.
async fn authenticate(state: &AppState, credentials: &Credentials) -> Result<User> {
    let Some(user) = state.db.get_user_by_email(&credentials.email).await? else {
        warn!("credential check failed: unknown email");
        return Err(AppError::Unauthorized("User not found".to_string()));
    };

    if !state.hasher.verify(&credentials.password, &user.password_hash) {
        warn!(user_id = %user.id, "credential check failed: wrong password");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    Ok(user)
}

/// Check credentials without issuing a token
#[utoipa::path(
    post,
    path = "/api/user/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Credentials are valid", body = MessageResponse),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unknown email or wrong password")
    ),
    tag = "session"
)]
pub async fn login(
    State(state): State<AppState>,
    Valid(credentials): Valid<Credentials>,
) -> Result<Json<MessageResponse>> {
    authenticate(&state, &credentials).await?;

    Ok(Json(MessageResponse {
        message: "Logged in".to_string(),
    }))
}

/// Check credentials and issue a bearer token
///
/// The token is returned as the plain-text body.
#[utoipa::path(
    post,
    path = "/api/user/verify",
    request_body = Credentials,
    responses(
        (status = 200, description = "Signed bearer token", body = String, content_type = "text/plain"),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Unknown email or wrong password")
    ),
    tag = "session"
)]
pub async fn verify(
    State(state): State<AppState>,
    Valid(credentials): Valid<Credentials>,
) -> Result<String> {
    let user = authenticate(&state, &credentials).await?;
    let token = state.tokens.issue(&Claims::from(&user))?;

    info!(user_id = %user.id, "token issued");
    Ok(token)
}
