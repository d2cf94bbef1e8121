// Request body parsing and response projections for the application
// endpoints.
//
// Bodies arrive as raw JSON and are validated field by field so every 422
// reports `{loc, msg, type}` entries. All violations are collected and
// reported together. A field that is absent or JSON null is simply not
// applied (partial-update semantics for PUT, optional fields for POST).
use serde::Serialize;
use serde_json::Value;

use crate::db::models::{
    Application, ApplicationPatch, ApplicationRecord, NewApplication, OnSiteRemote,
    StatusCategory, Timeline, TimelineEntry,
};
use crate::validation::{
    body_loc, validate_attractiveness_scale, validate_enum, validate_length, FieldError,
    MAX_TEXT_LEN, MIN_TEXT_LEN,
};

// ---------------------------------------------------------------------------
// Request parsing

/// Validated POST /applications body.
pub struct CreateApplicationBody;

impl CreateApplicationBody {
    pub fn parse(body: &Value) -> Result<(NewApplication, Vec<TimelineEntry>), Vec<FieldError>> {
        if !body.is_object() {
            return Err(vec![FieldError::type_error(
                body_loc(&[]),
                "value is not a valid dict",
                "type_error.dict",
            )]);
        }

        let mut errors = Vec::new();

        let company_name = required_text(body, "company_name", &mut errors);
        let job_title = required_text(body, "job_title", &mut errors);
        let status = required_text(body, "status", &mut errors);
        let attractiveness_scale = required_scale(body, &mut errors);
        let status_category = required_status_category(body, &mut errors);

        let official_website = optional_text(body, "official_website", &mut errors);
        let icon = optional_text(body, "icon", &mut errors);
        let job_description_link = optional_text(body, "job_description_link", &mut errors);
        let salary = optional_text(body, "salary", &mut errors);
        let location = optional_text(body, "location", &mut errors);
        let apply_icon = optional_bool(body, "apply_icon", &mut errors);
        let on_site_remote = optional_on_site_remote(body, &mut errors);
        let notes = optional_notes(body, &mut errors);
        let timelines = match present(body, "timelines") {
            Some(value) => parse_timelines(value, &mut errors),
            None => Vec::new(),
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        // All required fields validated above; unwraps cannot fire here.
        Ok((
            NewApplication {
                company_name: company_name.unwrap(),
                official_website,
                apply_icon: apply_icon.unwrap_or(false),
                icon,
                job_title: job_title.unwrap(),
                job_description_link,
                attractiveness_scale: attractiveness_scale.unwrap(),
                status: status.unwrap(),
                status_category: status_category.unwrap(),
                salary,
                location,
                on_site_remote,
                notes,
            },
            timelines,
        ))
    }
}

/// Validated PUT /applications/:id body: a typed patch plus, separately,
/// the timeline list when the `timelines` key was present.
#[derive(Debug)]
pub struct ApplicationUpdate {
    pub patch: ApplicationPatch,
    pub timelines: Option<Vec<TimelineEntry>>,
}

pub struct UpdateApplicationBody;

impl UpdateApplicationBody {
    pub fn parse(body: &Value) -> Result<ApplicationUpdate, Vec<FieldError>> {
        if !body.is_object() {
            return Err(vec![FieldError::type_error(
                body_loc(&[]),
                "value is not a valid dict",
                "type_error.dict",
            )]);
        }

        let mut errors = Vec::new();

        let patch = ApplicationPatch {
            company_name: optional_text(body, "company_name", &mut errors),
            official_website: optional_text(body, "official_website", &mut errors),
            apply_icon: optional_bool(body, "apply_icon", &mut errors),
            icon: optional_text(body, "icon", &mut errors),
            job_title: optional_text(body, "job_title", &mut errors),
            job_description_link: optional_text(body, "job_description_link", &mut errors),
            attractiveness_scale: present(body, "attractiveness_scale").and_then(|v| {
                collect(
                    validate_attractiveness_scale(field_loc("attractiveness_scale"), v),
                    &mut errors,
                )
            }),
            status: optional_text(body, "status", &mut errors),
            status_category: required_status_category_if_present(body, &mut errors),
            salary: optional_text(body, "salary", &mut errors),
            location: optional_text(body, "location", &mut errors),
            on_site_remote: optional_on_site_remote(body, &mut errors),
            notes: optional_notes(body, &mut errors),
        };

        let timelines =
            present(body, "timelines").map(|value| parse_timelines(value, &mut errors));

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ApplicationUpdate { patch, timelines })
    }
}

fn field_loc(field: &str) -> Vec<Value> {
    body_loc(&[Value::from(field)])
}

/// A field counts as present only when supplied and not JSON null.
fn present<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    match body.get(field) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn collect<T>(result: Result<T, FieldError>, errors: &mut Vec<FieldError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            errors.push(err);
            None
        }
    }
}

fn expect_str<'a>(value: &'a Value, field: &str, errors: &mut Vec<FieldError>) -> Option<&'a str> {
    match value.as_str() {
        Some(s) => Some(s),
        None => {
            errors.push(FieldError::type_error(
                field_loc(field),
                "str type expected",
                "type_error.str",
            ));
            None
        }
    }
}

fn required_text(body: &Value, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(value) = present(body, field) else {
        errors.push(FieldError::missing(field_loc(field)));
        return None;
    };
    let s = expect_str(value, field, errors)?;
    collect(
        validate_length(field_loc(field), field, s, MIN_TEXT_LEN, MAX_TEXT_LEN),
        errors,
    )
}

fn optional_text(body: &Value, field: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let value = present(body, field)?;
    let s = expect_str(value, field, errors)?;
    collect(
        validate_length(field_loc(field), field, s, MIN_TEXT_LEN, MAX_TEXT_LEN),
        errors,
    )
}

fn optional_bool(body: &Value, field: &str, errors: &mut Vec<FieldError>) -> Option<bool> {
    let value = present(body, field)?;
    match value.as_bool() {
        Some(b) => Some(b),
        None => {
            errors.push(FieldError::type_error(
                field_loc(field),
                "value could not be parsed to a boolean",
                "type_error.bool",
            ));
            None
        }
    }
}

/// Free text, unbounded. Only the type is checked.
fn optional_notes(body: &Value, errors: &mut Vec<FieldError>) -> Option<String> {
    let value = present(body, "notes")?;
    expect_str(value, "notes", errors).map(str::to_string)
}

fn required_scale(body: &Value, errors: &mut Vec<FieldError>) -> Option<i32> {
    let Some(value) = present(body, "attractiveness_scale") else {
        errors.push(FieldError::missing(field_loc("attractiveness_scale")));
        return None;
    };
    collect(
        validate_attractiveness_scale(field_loc("attractiveness_scale"), value),
        errors,
    )
}

fn required_status_category(body: &Value, errors: &mut Vec<FieldError>) -> Option<StatusCategory> {
    let Some(value) = present(body, "status_category") else {
        errors.push(FieldError::missing(field_loc("status_category")));
        return None;
    };
    parse_status_category(value, errors)
}

fn required_status_category_if_present(
    body: &Value,
    errors: &mut Vec<FieldError>,
) -> Option<StatusCategory> {
    let value = present(body, "status_category")?;
    parse_status_category(value, errors)
}

fn parse_status_category(value: &Value, errors: &mut Vec<FieldError>) -> Option<StatusCategory> {
    let raw = value.as_str().unwrap_or_default();
    collect(
        validate_enum(
            field_loc("status_category"),
            raw,
            StatusCategory::MEMBERS,
            StatusCategory::parse,
        ),
        errors,
    )
}

fn optional_on_site_remote(body: &Value, errors: &mut Vec<FieldError>) -> Option<OnSiteRemote> {
    let value = present(body, "on_site_remote")?;
    let raw = value.as_str().unwrap_or_default();
    collect(
        validate_enum(
            field_loc("on_site_remote"),
            raw,
            OnSiteRemote::MEMBERS,
            OnSiteRemote::parse,
        ),
        errors,
    )
}

fn parse_timelines(value: &Value, errors: &mut Vec<FieldError>) -> Vec<TimelineEntry> {
    let Some(items) = value.as_array() else {
        errors.push(FieldError::type_error(
            field_loc("timelines"),
            "value is not a valid list",
            "type_error.list",
        ));
        return Vec::new();
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        if !item.is_object() {
            errors.push(FieldError::type_error(
                body_loc(&[Value::from("timelines"), Value::from(index)]),
                "value is not a valid dict",
                "type_error.dict",
            ));
            continue;
        }
        let name = timeline_field(item, index, "name", errors);
        let value = timeline_field(item, index, "value", errors);
        if let (Some(name), Some(value)) = (name, value) {
            entries.push(TimelineEntry { name, value });
        }
    }
    entries
}

fn timeline_field(
    item: &Value,
    index: usize,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let loc = body_loc(&[Value::from("timelines"), Value::from(index), Value::from(field)]);
    let Some(value) = present(item, field) else {
        errors.push(FieldError::missing(loc));
        return None;
    };
    let Some(s) = value.as_str() else {
        errors.push(FieldError::type_error(loc, "str type expected", "type_error.str"));
        return None;
    };
    collect(
        validate_length(loc, field, s, MIN_TEXT_LEN, MAX_TEXT_LEN),
        errors,
    )
}

// ---------------------------------------------------------------------------
// Response projections

/// Summary projection for the list endpoint.
#[derive(Debug, Serialize)]
pub struct ApplicationSummary {
    pub id: i64,
    pub company_name: String,
    pub job_title: String,
    pub status: String,
    pub attractiveness_scale: i32,
    pub status_category: StatusCategory,
}

impl From<&Application> for ApplicationSummary {
    fn from(application: &Application) -> Self {
        Self {
            id: application.id,
            company_name: application.company_name.clone(),
            job_title: application.job_title.clone(),
            status: application.status.clone(),
            attractiveness_scale: application.attractiveness_scale,
            status_category: application.status_category,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TimelineOut {
    pub id: i64,
    pub name: String,
    pub value: String,
}

impl From<&Timeline> for TimelineOut {
    fn from(timeline: &Timeline) -> Self {
        Self {
            id: timeline.id,
            name: timeline.name.clone(),
            value: timeline.value.clone(),
        }
    }
}

/// Full projection for the get-one endpoint. Null-valued optional fields
/// are omitted from the serialized output.
#[derive(Debug, Serialize)]
pub struct ApplicationFull {
    pub id: i64,
    pub company_name: String,
    pub job_title: String,
    pub status: String,
    pub attractiveness_scale: i32,
    pub status_category: StatusCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub official_website: Option<String>,
    pub apply_icon: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_site_remote: Option<OnSiteRemote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub archived: bool,
    pub timelines: Vec<TimelineOut>,
}

impl From<&ApplicationRecord> for ApplicationFull {
    fn from(record: &ApplicationRecord) -> Self {
        let application = &record.application;
        Self {
            id: application.id,
            company_name: application.company_name.clone(),
            job_title: application.job_title.clone(),
            status: application.status.clone(),
            attractiveness_scale: application.attractiveness_scale,
            status_category: application.status_category,
            official_website: application.official_website.clone(),
            apply_icon: application.apply_icon,
            icon: application.icon.clone(),
            job_description_link: application.job_description_link.clone(),
            salary: application.salary.clone(),
            location: application.location.clone(),
            on_site_remote: application.on_site_remote,
            notes: application.notes.clone(),
            archived: application.archived,
            timelines: record.timelines.iter().map(TimelineOut::from).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApplicationsResponse {
    pub applications: Vec<ApplicationSummary>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub application: ApplicationFull,
}
