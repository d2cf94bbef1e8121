use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Traffic-light style category shown next to an application's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "status_category", rename_all = "lowercase")]
pub enum StatusCategory {
    Red,
    Blue,
    Green,
    Yellow,
    Orange,
    Purple,
}

impl StatusCategory {
    pub const MEMBERS: &'static [&'static str] =
        &["red", "blue", "green", "yellow", "orange", "purple"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "red" => Some(Self::Red),
            "blue" => Some(Self::Blue),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "orange" => Some(Self::Orange),
            "purple" => Some(Self::Purple),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "on_site_remote", rename_all = "lowercase")]
pub enum OnSiteRemote {
    Remote,
    Onsite,
    Hybrid,
}

impl OnSiteRemote {
    pub const MEMBERS: &'static [&'static str] = &["remote", "onsite", "hybrid"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "remote" => Some(Self::Remote),
            "onsite" => Some(Self::Onsite),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRole {
    User,
    Admin,
}

impl UserRole {
    pub const MEMBERS: &'static [&'static str] = &["user", "admin"];

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// Internal identity. `sub` is the identity provider's stable subject and is
/// set on the lazy-provisioning path; profile-only users registered through
/// POST /users carry name/email/role instead.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub sub: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

/// The primary tracked entity. Owned by exactly one user for its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub official_website: Option<String>,
    pub apply_icon: bool,
    pub icon: Option<String>,
    pub job_title: String,
    pub job_description_link: Option<String>,
    pub attractiveness_scale: i32,
    pub status: String,
    pub status_category: StatusCategory,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub on_site_remote: Option<OnSiteRemote>,
    pub notes: Option<String>,
    pub archived: bool,
}

/// A named milestone attached to an application. Never edited in place;
/// the whole set is replaced when its content changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Timeline {
    pub id: i64,
    pub user_id: i64,
    pub application_id: i64,
    pub name: String,
    pub value: String,
}

/// An application fetched eagerly together with its ordered timelines.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationRecord {
    pub application: Application,
    pub timelines: Vec<Timeline>,
}

/// Validated payload for creating an application. `user_id` and `archived`
/// are supplied by the store, never by the client.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApplication {
    pub company_name: String,
    pub official_website: Option<String>,
    pub apply_icon: bool,
    pub icon: Option<String>,
    pub job_title: String,
    pub job_description_link: Option<String>,
    pub attractiveness_scale: i32,
    pub status: String,
    pub status_category: StatusCategory,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub on_site_remote: Option<OnSiteRemote>,
    pub notes: Option<String>,
}

/// Validated (name, value) pair for a timeline row to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineEntry {
    pub name: String,
    pub value: String,
}

/// Typed partial update. A `None` field was absent from the request body
/// and leaves the entity untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationPatch {
    pub company_name: Option<String>,
    pub official_website: Option<String>,
    pub apply_icon: Option<bool>,
    pub icon: Option<String>,
    pub job_title: Option<String>,
    pub job_description_link: Option<String>,
    pub attractiveness_scale: Option<i32>,
    pub status: Option<String>,
    pub status_category: Option<StatusCategory>,
    pub salary: Option<String>,
    pub location: Option<String>,
    pub on_site_remote: Option<OnSiteRemote>,
    pub notes: Option<String>,
}

/// Merge supplied patch fields onto the entity. Pure so the merge policy is
/// testable without any I/O.
pub fn apply_patch(mut application: Application, patch: ApplicationPatch) -> Application {
    if let Some(v) = patch.company_name {
        application.company_name = v;
    }
    if let Some(v) = patch.official_website {
        application.official_website = Some(v);
    }
    if let Some(v) = patch.apply_icon {
        application.apply_icon = v;
    }
    if let Some(v) = patch.icon {
        application.icon = Some(v);
    }
    if let Some(v) = patch.job_title {
        application.job_title = v;
    }
    if let Some(v) = patch.job_description_link {
        application.job_description_link = Some(v);
    }
    if let Some(v) = patch.attractiveness_scale {
        application.attractiveness_scale = v;
    }
    if let Some(v) = patch.status {
        application.status = v;
    }
    if let Some(v) = patch.status_category {
        application.status_category = v;
    }
    if let Some(v) = patch.salary {
        application.salary = Some(v);
    }
    if let Some(v) = patch.location {
        application.location = Some(v);
    }
    if let Some(v) = patch.on_site_remote {
        application.on_site_remote = Some(v);
    }
    if let Some(v) = patch.notes {
        application.notes = Some(v);
    }
    application
}

/// True when the persisted timelines already hold exactly the requested
/// ordered (name, value) pairs. Used to skip a pointless delete+reinsert
/// so row ids stay stable on no-op updates.
pub fn timelines_match(current: &[Timeline], requested: &[TimelineEntry]) -> bool {
    current.len() == requested.len()
        && current
            .iter()
            .zip(requested)
            .all(|(t, e)| t.name == e.name && t.value == e.value)
}
