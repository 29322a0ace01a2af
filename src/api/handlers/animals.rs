use crate::{
    auth::AuthUser,
    types::{Animal, Result},
    validation::{FieldReader, Valid, Validate},
    AppState,
};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnimalRequest {
    pub name: String,
    /// Defaults to 0
    pub hours_trained: Option<f64>,
    /// Defaults to the caller when absent or blank
    pub owner: Option<String>,
    pub date_of_birth: Option<DateTime<Utc>>,
    pub profile_picture: Option<String>,
}

impl Validate for CreateAnimalRequest {
    fn from_fields(fields: &mut FieldReader<'_>) -> Option<Self> {
        let name = fields.string("name");
        let hours_trained = fields.optional_non_negative_number("hoursTrained");
        let owner = fields.optional_string("owner");
        let date_of_birth = fields.optional_date("dateOfBirth");
        let profile_picture = fields.optional_string("profilePicture");

        Some(Self {
            name: name?,
            hours_trained: hours_trained?,
            owner: owner?,
            date_of_birth: date_of_birth?,
            profile_picture: profile_picture?,
        })
    }
}

/// Create an animal
#[utoipa::path(
    post,
    path = "/api/animals",
    request_body = CreateAnimalRequest,
    responses(
        (status = 200, description = "Animal created", body = Animal),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "animals"
)]
pub async fn create_animal(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Valid(payload): Valid<CreateAnimalRequest>,
) -> Result<Json<Animal>> {
    let animal = Animal {
        id: Uuid::new_v4().to_string(),
        name: payload.name,
        hours_trained: payload.hours_trained.unwrap_or(0.0),
        owner: payload
            .owner
            .filter(|owner| !owner.trim().is_empty())
            .unwrap_or(claims.id),
        date_of_birth: payload.date_of_birth,
        profile_picture: payload.profile_picture,
    };

    state.db.create_animal(&animal).await?;

    info!(animal_id = %animal.id, owner = %animal.owner, "animal created");
    Ok(Json(animal))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_payload() {
        let request = CreateAnimalRequest::validate(&json!({ "name": "Rex" })).expect("should pass");
        assert_eq!(request.name, "Rex");
        assert_eq!(request.hours_trained, None);
        assert_eq!(request.owner, None);
    }

    #[test]
    fn test_negative_hours_rejected() {
        let errors = CreateAnimalRequest::validate(&json!({ "name": "Rex", "hoursTrained": -1 }))
            .expect_err("should fail");
        assert!(errors.contains("hoursTrained"));
    }

    #[test]
    fn test_date_of_birth_coerced() {
        let request = CreateAnimalRequest::validate(&json!({
            "name": "Rex",
            "hoursTrained": 12.5,
            "dateOfBirth": "2020-02-29"
        }))
        .expect("should pass");

        let dob = request.date_of_birth.expect("date");
        assert_eq!(dob.to_rfc3339(), "2020-02-29T00:00:00+00:00");
    }
}
