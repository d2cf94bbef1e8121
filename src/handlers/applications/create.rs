use axum::{extract::State, http::StatusCode, Extension, Json};
use serde_json::Value;

use super::schemas::CreateApplicationBody;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// POST /applications - create an application with its initial timelines
pub async fn create_application(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(body): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let (fields, timelines) = CreateApplicationBody::parse(&body).map_err(ApiError::validation)?;

    let application = state
        .store
        .create_application(user.id, fields, &timelines)
        .await?;

    tracing::info!(
        application_id = application.id,
        user_id = user.id,
        "created application"
    );
    Ok(StatusCode::CREATED)
}
