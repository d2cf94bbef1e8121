use axum::{extract::State, http::StatusCode, Json};
use serde_json::Value;

use crate::db::models::UserRole;
use crate::error::ApiError;
use crate::state::AppState;
use crate::validation::{
    body_loc, validate_email, validate_enum, validate_username, FieldError,
};

/// POST /users - profile registration. The only endpoint that does not
/// require an Authorization header.
pub async fn create_user(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let (name, email, role) = parse_body(&body).map_err(ApiError::validation)?;

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(ApiError::conflict("User with the same email already exists."));
    }

    let user = state.store.create_profile_user(&name, &email, role).await?;

    tracing::info!(user_id = user.id, "registered user");
    Ok(StatusCode::CREATED)
}

fn parse_body(body: &Value) -> Result<(String, String, UserRole), Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = match body.get("name").and_then(Value::as_str) {
        Some(raw) => match validate_username(body_loc(&[Value::from("name")]), raw) {
            Ok(name) => Some(title_case(&name)),
            Err(err) => {
                errors.push(err);
                None
            }
        },
        None => {
            errors.push(FieldError::missing(body_loc(&[Value::from("name")])));
            None
        }
    };

    let email = match body.get("email").and_then(Value::as_str) {
        Some(raw) => match validate_email(body_loc(&[Value::from("email")]), &raw.to_lowercase()) {
            Ok(email) => Some(email),
            Err(err) => {
                errors.push(err);
                None
            }
        },
        None => {
            errors.push(FieldError::missing(body_loc(&[Value::from("email")])));
            None
        }
    };

    let role = match body.get("role").and_then(Value::as_str) {
        Some(raw) => match validate_enum(
            body_loc(&[Value::from("role")]),
            raw,
            UserRole::MEMBERS,
            UserRole::parse,
        ) {
            Ok(role) => Some(role),
            Err(err) => {
                errors.push(err);
                None
            }
        },
        None => {
            errors.push(FieldError::missing(body_loc(&[Value::from("role")])));
            None
        }
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok((name.unwrap(), email.unwrap(), role.unwrap()))
}

/// Normalize a display name the way registration always has: lowercase,
/// then capitalize each word.
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn title_cases_names() {
        assert_eq!(title_case("jane doe"), "Jane Doe");
        assert_eq!(title_case("JANE"), "Jane");
        assert_eq!(title_case("  jane   doe "), "Jane Doe");
    }

    #[test]
    fn parses_valid_body() {
        let body = json!({"name": "jane doe", "email": "Jane@Example.COM", "role": "user"});
        let (name, email, role) = parse_body(&body).unwrap();
        assert_eq!(name, "Jane Doe");
        assert_eq!(email, "jane@example.com");
        assert_eq!(role, UserRole::User);
    }

    #[test]
    fn collects_missing_fields() {
        let errors = parse_body(&json!({})).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().all(|e| e.kind == "value_error.missing"));
    }

    #[test]
    fn rejects_bad_role() {
        let body = json!({"name": "jane", "email": "jane@example.com", "role": "root"});
        let errors = parse_body(&body).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, "type_error.enum");
    }
}
