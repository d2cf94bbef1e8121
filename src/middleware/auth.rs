use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::extract_bearer_token;
use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated caller context resolved by the guard.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub sub: String,
}

/// Authorization guard: verify the bearer token, extract the subject and
/// resolve (or lazily create) the internal user, then inject it into the
/// request. Any failure short-circuits with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(request.headers())?;

    let claims = state.verifier.verify(&token).await?;
    let subject = claims.subject()?.to_string();

    let user = state.store.get_or_create_user(&subject).await?;

    request.extensions_mut().insert(CurrentUser {
        id: user.id,
        sub: subject,
    });

    Ok(next.run(request).await)
}
