use crate::{
    types::{Animal, Page, Result, TrainingLog, UserSummary},
    validation::{FieldReader, Validate, ValidQuery},
    AppState,
};
use axum::{extract::State, Json};
use serde::Deserialize;
use utoipa::IntoParams;

pub const MAX_PAGE_SIZE: i64 = 50;

/// Paging parameters shared by the admin listings
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Items per page, 1 to 50 (default 10)
    pub count: Option<u32>,
    /// Items to skip (default 0)
    pub offset: Option<u32>,
}

impl Validate for Page {
    fn from_fields(fields: &mut FieldReader<'_>) -> Option<Self> {
        let count = fields.coerced_integer("count", 10, 1, Some(MAX_PAGE_SIZE));
        let offset = fields.coerced_integer("offset", 0, 0, Some(u32::MAX as i64));

        Some(Page {
            count: count? as u32,
            offset: offset? as u32,
        })
    }
}

/// List animals
#[utoipa::path(
    get,
    path = "/api/admin/animals",
    params(PageParams),
    responses(
        (status = 200, description = "One page of animals", body = Vec<Animal>),
        (status = 400, description = "Invalid paging parameters"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_animals(
    State(state): State<AppState>,
    ValidQuery(page): ValidQuery<Page>,
) -> Result<Json<Vec<Animal>>> {
    Ok(Json(state.db.list_animals(page).await?))
}

/// List users without their password hashes
#[utoipa::path(
    get,
    path = "/api/admin/users",
    params(PageParams),
    responses(
        (status = 200, description = "One page of users", body = Vec<UserSummary>),
        (status = 400, description = "Invalid paging parameters"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_users(
    State(state): State<AppState>,
    ValidQuery(page): ValidQuery<Page>,
) -> Result<Json<Vec<UserSummary>>> {
    Ok(Json(state.db.list_users(page).await?))
}

/// List training logs
#[utoipa::path(
    get,
    path = "/api/admin/training",
    params(PageParams),
    responses(
        (status = 200, description = "One page of training logs", body = Vec<TrainingLog>),
        (status = 400, description = "Invalid paging parameters"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "admin"
)]
pub async fn list_training_logs(
    State(state): State<AppState>,
    ValidQuery(page): ValidQuery<Page>,
) -> Result<Json<Vec<TrainingLog>>> {
    Ok(Json(state.db.list_training_logs(page).await?))
}
