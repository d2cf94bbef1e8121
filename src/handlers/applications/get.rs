use axum::{
    extract::{Path, State},
    Extension, Json,
};

use super::schemas::{
    ApplicationFull, ApplicationResponse, ApplicationSummary, ApplicationsResponse,
};
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::state::AppState;

/// GET /applications - summary projections of the caller's applications.
///
/// A caller owning no applications gets 404, not an empty list. Unusual,
/// but it is the published contract and clients rely on it.
pub async fn list_applications(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApplicationsResponse>, ApiError> {
    let applications = state.store.list_applications(user.id).await?;

    if applications.is_empty() {
        return Err(ApiError::not_found("Applications not found"));
    }

    Ok(Json(ApplicationsResponse {
        applications: applications.iter().map(ApplicationSummary::from).collect(),
    }))
}

/// GET /applications/:id - full projection including ordered timelines
pub async fn get_application(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(application_id): Path<i64>,
) -> Result<Json<ApplicationResponse>, ApiError> {
    let record = state
        .store
        .get_application(application_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Application not found"))?;

    if record.application.user_id != user.id {
        return Err(ApiError::forbidden("No access to the application"));
    }

    Ok(Json(ApplicationResponse {
        application: ApplicationFull::from(&record),
    }))
}
