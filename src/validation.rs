// Field-level request validation.
//
// Every validator returns either the normalized value or a `FieldError`
// shaped like `{loc, msg, type}` so the 422 body lists one entry per
// offending field.
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

pub const MIN_TEXT_LEN: usize = 1;
pub const MAX_TEXT_LEN: usize = 400;

pub const MIN_LENGTH_USERNAME: usize = 3;
pub const MAX_LENGTH_USERNAME: usize = 20;
pub const MIN_LENGTH_EMAIL: usize = 5;
pub const MAX_LENGTH_EMAIL: usize = 100;

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Zа-яА-Я0-9 _-]+$").expect("username pattern"));
static USERNAME_FIRST_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Zа-яА-Я]").expect("username first letter pattern"));
static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w\.-]+@[\w\.-]+\.\w+$").expect("email pattern"));

/// A single validation failure, serialized as `{loc, msg, type}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub loc: Vec<Value>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: Vec<Value>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc,
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    /// Required field absent from the request body.
    pub fn missing(loc: Vec<Value>) -> Self {
        Self::new(loc, "field required", "value_error.missing")
    }

    pub fn value_error(loc: Vec<Value>, msg: impl Into<String>) -> Self {
        Self::new(loc, msg, "value_error")
    }

    pub fn type_error(loc: Vec<Value>, msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::new(loc, msg, kind)
    }
}

/// Build a `loc` path rooted at the request body.
pub fn body_loc(parts: &[Value]) -> Vec<Value> {
    let mut loc = vec![Value::from("body")];
    loc.extend(parts.iter().cloned());
    loc
}

/// Trim and bound-check a free-text field. Returns the trimmed value.
pub fn validate_length(
    loc: Vec<Value>,
    field: &str,
    value: &str,
    min_len: usize,
    max_len: usize,
) -> Result<String, FieldError> {
    let trimmed = value.trim();
    if trimmed.chars().count() > max_len {
        return Err(FieldError::value_error(
            loc,
            format!("{} cannot exceed {} characters", field, max_len),
        ));
    }
    if trimmed.chars().count() < min_len {
        return Err(FieldError::value_error(
            loc,
            format!("{} cannot be less {} characters", field, min_len),
        ));
    }
    Ok(trimmed.to_string())
}

/// Coerce `attractiveness_scale` to an integer and range-check it.
///
/// Accepts a JSON number or a numeric string, matching the loose coercion
/// the public API has always allowed.
pub fn validate_attractiveness_scale(loc: Vec<Value>, value: &Value) -> Result<i32, FieldError> {
    let parsed = match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    let scale = parsed.ok_or_else(|| {
        FieldError::type_error(
            loc.clone(),
            "attractiveness_scale must be integer",
            "type_error.integer",
        )
    })?;
    if !(1..=5).contains(&scale) {
        return Err(FieldError::value_error(
            loc,
            "attractiveness_scale must be in range 1..5",
        ));
    }
    Ok(scale as i32)
}

/// Membership check against a declared enum, reporting the permitted set.
pub fn validate_enum<T, F>(
    loc: Vec<Value>,
    value: &str,
    permitted: &[&str],
    parse: F,
) -> Result<T, FieldError>
where
    F: Fn(&str) -> Option<T>,
{
    parse(value).ok_or_else(|| {
        let allowed = permitted
            .iter()
            .map(|m| format!("'{}'", m))
            .collect::<Vec<_>>()
            .join(", ");
        FieldError::type_error(
            loc,
            format!(
                "value is not a valid enumeration member; permitted: {}",
                allowed
            ),
            "type_error.enum",
        )
    })
}

/// Username for profile registration: letters first, then letters, digits,
/// spaces, underscores or dashes, 3..=20 chars.
pub fn validate_username(loc: Vec<Value>, username: &str) -> Result<String, FieldError> {
    let username = username.trim();
    if !USERNAME_PATTERN.is_match(username) {
        return Err(FieldError::value_error(
            loc,
            "Invalid username. pattern: ^[a-zA-Zа-яА-Я0-9 _-]+$",
        ));
    }
    if !USERNAME_FIRST_LETTER.is_match(username) {
        return Err(FieldError::value_error(
            loc,
            "Invalid username. First symbol should be a letter.",
        ));
    }
    let len = username.chars().count();
    if len < MIN_LENGTH_USERNAME || len > MAX_LENGTH_USERNAME {
        return Err(FieldError::value_error(
            loc,
            format!(
                "Invalid username. Length should be >= {} and <= {}",
                MIN_LENGTH_USERNAME, MAX_LENGTH_USERNAME
            ),
        ));
    }
    Ok(username.to_string())
}

/// Email for profile registration.
pub fn validate_email(loc: Vec<Value>, email: &str) -> Result<String, FieldError> {
    let email = email.trim();
    if !EMAIL_PATTERN.is_match(email) {
        return Err(FieldError::value_error(
            loc,
            r"Invalid email address. pattern: ^[\w\.-]+@[\w\.-]+\.\w+$",
        ));
    }
    let len = email.chars().count();
    if len < MIN_LENGTH_EMAIL || len > MAX_LENGTH_EMAIL {
        return Err(FieldError::value_error(
            loc,
            format!(
                "Invalid email address. Length should be >= {} and <= {}",
                MIN_LENGTH_EMAIL, MAX_LENGTH_EMAIL
            ),
        ));
    }
    Ok(email.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn loc(field: &str) -> Vec<Value> {
        body_loc(&[Value::from(field)])
    }

    #[test]
    fn length_trims_and_accepts_in_bounds() {
        let out = validate_length(loc("status"), "status", "  Pending  ", 1, 400).unwrap();
        assert_eq!(out, "Pending");
    }

    #[test]
    fn length_rejects_blank_after_trim() {
        let err = validate_length(loc("company_name"), "company_name", "   ", 1, 400).unwrap_err();
        assert_eq!(err.kind, "value_error");
        assert_eq!(err.msg, "company_name cannot be less 1 characters");
        assert_eq!(err.loc, vec![json!("body"), json!("company_name")]);
    }

    #[test]
    fn length_rejects_over_max() {
        let long = "x".repeat(401);
        let err = validate_length(loc("status"), "status", &long, 1, 400).unwrap_err();
        assert_eq!(err.msg, "status cannot exceed 400 characters");
        // exactly at the bound is fine
        let ok = "x".repeat(400);
        assert!(validate_length(loc("status"), "status", &ok, 1, 400).is_ok());
    }

    #[test]
    fn scale_accepts_boundaries_and_numeric_strings() {
        assert_eq!(
            validate_attractiveness_scale(loc("attractiveness_scale"), &json!(1)).unwrap(),
            1
        );
        assert_eq!(
            validate_attractiveness_scale(loc("attractiveness_scale"), &json!(5)).unwrap(),
            5
        );
        assert_eq!(
            validate_attractiveness_scale(loc("attractiveness_scale"), &json!("3")).unwrap(),
            3
        );
    }

    #[test]
    fn scale_rejects_out_of_range() {
        for bad in [json!(0), json!(6), json!(-1)] {
            let err =
                validate_attractiveness_scale(loc("attractiveness_scale"), &bad).unwrap_err();
            assert_eq!(err.kind, "value_error");
            assert_eq!(err.msg, "attractiveness_scale must be in range 1..5");
        }
    }

    #[test]
    fn scale_rejects_non_integer() {
        for bad in [json!("five"), json!(true), json!([1])] {
            let err =
                validate_attractiveness_scale(loc("attractiveness_scale"), &bad).unwrap_err();
            assert_eq!(err.kind, "type_error.integer");
        }
    }

    #[test]
    fn enum_reports_permitted_members() {
        let err = validate_enum(
            loc("status_category"),
            "hello",
            &["red", "blue"],
            |_| None::<()>,
        )
        .unwrap_err();
        assert_eq!(err.kind, "type_error.enum");
        assert!(err.msg.contains("'red', 'blue'"));
    }

    #[test]
    fn username_rules() {
        assert_eq!(
            validate_username(loc("name"), "  Jane Doe  ").unwrap(),
            "Jane Doe"
        );
        assert!(validate_username(loc("name"), "1jane").is_err());
        assert!(validate_username(loc("name"), "j@ne").is_err());
        assert!(validate_username(loc("name"), "jo").is_err());
        assert!(validate_username(loc("name"), &"j".repeat(21)).is_err());
    }

    #[test]
    fn email_rules() {
        assert_eq!(
            validate_email(loc("email"), " jane@example.com ").unwrap(),
            "jane@example.com"
        );
        assert!(validate_email(loc("email"), "not-an-email").is_err());
        assert!(validate_email(loc("email"), "a@b").is_err());
    }
}
