//! OpenAPI document for the HTTP API.
//!
//! Served as JSON at `/api-docs/openapi.json`, and through Swagger UI at
//! `/swagger-ui` when the `swagger-ui` feature is enabled.

use crate::api::handlers::{admin, animals, files, health, session, training, users};
use crate::types::{Animal, TrainingLog, User, UserSummary};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Registers the bearer-token scheme referenced by the protected routes.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /api/user/verify"))
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Trainlog API",
        description = "Users, animals and training logs, with bearer-token auth and media uploads."
    ),
    paths(
        health::health,
        users::create_user,
        animals::create_animal,
        training::create_training_log,
        admin::list_animals,
        admin::list_users,
        admin::list_training_logs,
        session::login,
        session::verify,
        files::upload,
    ),
    components(schemas(
        User,
        UserSummary,
        Animal,
        TrainingLog,
        health::HealthResponse,
        users::CreateUserRequest,
        animals::CreateAnimalRequest,
        training::CreateTrainingLogRequest,
        session::Credentials,
        session::MessageResponse,
        files::UploadKind,
        files::UploadForm,
        files::UploadResponse,
    )),
    tags(
        (name = "health", description = "Liveness"),
        (name = "users", description = "Registration"),
        (name = "animals", description = "Animal records"),
        (name = "training", description = "Training sessions"),
        (name = "admin", description = "Paged listings"),
        (name = "session", description = "Credential checks and token issuance"),
        (name = "files", description = "Image and video uploads")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_routes_documented() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/health",
            "/api/users",
            "/api/animals",
            "/api/training",
            "/api/admin/animals",
            "/api/admin/users",
            "/api/admin/training",
            "/api/user/login",
            "/api/user/verify",
            "/api/file/upload",
        ] {
            assert!(doc.paths.paths.contains_key(path), "{} missing", path);
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
