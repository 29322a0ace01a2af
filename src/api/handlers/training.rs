use crate::{
    auth::AuthUser,
    types::{Result, TrainingLog},
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
pub struct CreateTrainingLogRequest {
    pub date: DateTime<Utc>,
    pub description: String,
    /// Must be greater than 0
    pub hours: f64,
    pub animal: String,
    /// Defaults to the caller when absent or blank
    pub user: Option<String>,
    pub training_log_video: Option<String>,
}

impl Validate for CreateTrainingLogRequest {
    fn from_fields(fields: &mut FieldReader<'_>) -> Option<Self> {
        let date = fields.date("date");
        let description = fields.string("description");
        let hours = fields.positive_number("hours");
        let animal = fields.string("animal");
        let user = fields.optional_string("user");
        let training_log_video = fields.optional_string("trainingLogVideo");

        Some(Self {
            date: date?,
            description: description?,
            hours: hours?,
            animal: animal?,
            user: user?,
            training_log_video: training_log_video?,
        })
    }
}

/// Record a training session
#[utoipa::path(
    post,
    path = "/api/training",
    request_body = CreateTrainingLogRequest,
    responses(
        (status = 200, description = "Training log created", body = TrainingLog),
        (status = 400, description = "Invalid input"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "training"
)]
pub async fn create_training_log(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Valid(payload): Valid<CreateTrainingLogRequest>,
) -> Result<Json<TrainingLog>> {
    let log = TrainingLog {
        id: Uuid::new_v4().to_string(),
        date: payload.date,
        description: payload.description,
        hours: payload.hours,
        animal: payload.animal,
        user: payload
            .user
            .filter(|user| !user.trim().is_empty())
            .unwrap_or(claims.id),
        training_log_video: payload.training_log_video,
    };

    state.db.create_training_log(&log).await?;

    info!(log_id = %log.id, animal = %log.animal, "training log created");
    Ok(Json(log))
}
