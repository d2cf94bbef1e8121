use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde_json::Value;

use super::schemas::UpdateApplicationBody;
use crate::db::models::{apply_patch, timelines_match};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// PUT /applications/:id - partial update.
///
/// Scalar fields present in the body are merged onto the entity; absent
/// fields stay untouched. A present `timelines` key replaces the whole
/// timeline set when its content differs from what is persisted, including
/// an empty list meaning "remove all". An identical list is a no-op so
/// timeline row ids stay stable.
pub async fn update_application(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(application_id): Path<i64>,
    Json(body): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let record = state
        .store
        .get_application(application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    if record.application.user_id != user.id {
        return Err(ApiError::forbidden("No access to the application"));
    }

    let update = UpdateApplicationBody::parse(&body).map_err(ApiError::validation)?;

    let entries = update
        .timelines
        .filter(|entries| !timelines_match(&record.timelines, entries));
    let replaced = entries.is_some();

    let merged = apply_patch(record.application, update.patch);
    state
        .store
        .update_application(&merged, entries.as_deref())
        .await?;

    if replaced {
        tracing::info!(application_id, "replaced timelines");
    }
    Ok(StatusCode::OK)
}
