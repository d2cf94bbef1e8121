pub mod applications;
pub mod users;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Assemble the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(user_routes())
        // Everything below the guard
        .merge(application_routes(state.clone()))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn user_routes() -> Router<AppState> {
    Router::new().route("/users", post(users::create_user))
}

fn application_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/applications",
            get(applications::list_applications).post(applications::create_application),
        )
        .route(
            "/applications/:id",
            get(applications::get_application)
                .put(applications::update_application)
                .delete(applications::delete_application),
        )
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
}

async fn root() -> Json<Value> {
    Json(json!({ "name": "interview-tracker", "status": "ok" }))
}

async fn health(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    state.store.health_check().await?;
    Ok(Json(json!({ "status": "ok", "database": "up" })))
}
