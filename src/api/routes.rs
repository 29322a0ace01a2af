use crate::api::handlers::{admin, animals, files, health, session, training, users};
use crate::auth::middleware::{auth_middleware, InterceptorChain};
use crate::utils::toml_config::StorageBackend;
use crate::AppState;
use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    let uploads = Router::new()
        .route("/file/upload", post(files::upload))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes));

    Router::new()
        .route("/health", get(health::health))
        .route("/users", post(users::create_user))
        .route("/animals", post(animals::create_animal))
        .route("/training", post(training::create_training_log))
        .route("/admin/animals", get(admin::list_animals))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/training", get(admin::list_training_logs))
        .route("/user/login", post(session::login))
        .route("/user/verify", post(session::verify))
        .merge(uploads)
}

#[cfg(feature = "swagger-ui")]
fn docs_routes() -> Router<AppState> {
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(
        SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", crate::api::docs::ApiDoc::openapi()),
    )
}

#[cfg(not(feature = "swagger-ui"))]
fn docs_routes() -> Router<AppState> {
    use utoipa::OpenApi;

    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { axum::Json(crate::api::docs::ApiDoc::openapi()) }),
    )
}

/// Builds the complete application: API routes, docs, the local blob mount,
/// the authentication gate and the HTTP layers.
pub fn create_router(state: AppState) -> Router {
    let chain = Arc::new(InterceptorChain::standard(
        state.tokens.clone(),
        state.config.auth.public_paths.clone(),
    ));

    let mut app = Router::new()
        .nest("/api", api_routes(state.config.storage.max_upload_bytes))
        .merge(docs_routes());

    if state.config.storage.backend == StorageBackend::Local {
        app = app.nest_service("/files", ServeDir::new(&state.config.storage.root));
    }

    app.layer(middleware::from_fn(move |req, next| {
        auth_middleware(chain.clone(), req, next)
    }))
    .layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            )
            .layer(CompressionLayer::new()),
    )
    .with_state(state)
}
