use crate::{
    types::{AppError, Result, User},
    validation::{FieldReader, Valid, Validate},
    AppState,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

/// Registration payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub profile_picture: Option<String>,
}

impl Validate for CreateUserRequest {
    fn from_fields(fields: &mut FieldReader<'_>) -> Option<Self> {
        let first_name = fields.string("firstName");
        let last_name = fields.string("lastName");
        let email = fields.non_empty_string("email");
        let password = fields.non_empty_string("password");
        let profile_picture = fields.optional_string("profilePicture");

        Some(Self {
            first_name: first_name?,
            last_name: last_name?,
            email: email?,
            password: password?,
            profile_picture: profile_picture?,
        })
    }
}

/// Register a new user
///
/// The stored record is returned as-is, so `password` holds the Argon2 hash.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Valid(payload): Valid<CreateUserRequest>,
) -> Result<Json<User>> {
    let password_hash = state.hasher.hash(&payload.password)?;

    let user = User {
        id: Uuid::new_v4().to_string(),
        first_name: payload.first_name,
        last_name: payload.last_name,
        email: payload.email,
        password_hash,
        profile_picture: payload.profile_picture,
    };

    state.db.create_user(&user).await.map_err(|e| match e {
        AppError::Conflict(_) => {
            AppError::Conflict(format!("A user with email {} already exists", user.email))
        }
        other => other,
    })?;

    info!(user_id = %user.id, "user registered");
    Ok(Json(user))
}
