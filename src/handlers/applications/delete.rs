use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension,
};

use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// DELETE /applications/:id - cascade delete of the aggregate
pub async fn delete_application(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(application_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let record = state
        .store
        .get_application(application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    if record.application.user_id != user.id {
        return Err(ApiError::forbidden("No access to the application"));
    }

    state.store.delete_application(application_id).await?;

    Ok(StatusCode::OK)
}
