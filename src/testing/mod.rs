
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{AuthError, TokenVerifier, VerifiedClaims};
use crate::db::models::{
    Application, ApplicationRecord, NewApplication, Timeline, TimelineEntry, User, UserRole,
};
use crate::db::store::{Store, StoreError};
use crate::handlers;
use crate::state::AppState;

pub const TOKEN_A: &str = "token-user-a";
pub const TOKEN_B: &str = "token-user-b";
pub const TOKEN_FLAT_SUB: &str = "token-flat-sub";

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    applications: Vec<Application>,
    timelines: Vec<Timeline>,
    next_user_id: i64,
    next_application_id: i64,
    next_timeline_id: i64,
}

/// Store implementation backed by plain vectors, mirroring the Postgres
/// store's contract including id assignment, insertion order, and the
/// all-or-nothing behavior of the aggregate mutations.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_timeline_writes: AtomicBool,
}

impl MemoryStore {
    /// Make timeline inserts fail, simulating a store error mid-mutation.
    pub fn fail_timeline_writes(&self, fail: bool) {
        self.fail_timeline_writes.store(fail, Ordering::SeqCst);
    }

    fn timeline_write_error(&self) -> Option<StoreError> {
        if self.fail_timeline_writes.load(Ordering::SeqCst) {
            Some(StoreError::Sqlx(sqlx::Error::PoolClosed))
        } else {
            None
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn get_or_create_user(&self, sub: &str) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(user) = inner.users.iter().find(|u| u.sub.as_deref() == Some(sub)) {
            return Ok(user.clone());
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            sub: Some(sub.to_string()),
            name: None,
            email: None,
            role: None,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .users
            .iter()
            .find(|u| u.email.as_deref() == Some(email))
            .cloned())
    }

    async fn create_profile_user(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.iter().any(|u| u.email.as_deref() == Some(email)) {
            return Err(StoreError::Conflict(
                "User with the same email already exists.".to_string(),
            ));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            sub: None,
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            role: Some(role),
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn create_application(
        &self,
        owner_user_id: i64,
        fields: NewApplication,
        entries: &[TimelineEntry],
    ) -> Result<Application, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !entries.is_empty() {
            if let Some(err) = self.timeline_write_error() {
                return Err(err);
            }
        }
        inner.next_application_id += 1;
        let application = Application {
            id: inner.next_application_id,
            user_id: owner_user_id,
            company_name: fields.company_name,
            official_website: fields.official_website,
            apply_icon: fields.apply_icon,
            icon: fields.icon,
            job_title: fields.job_title,
            job_description_link: fields.job_description_link,
            attractiveness_scale: fields.attractiveness_scale,
            status: fields.status,
            status_category: fields.status_category,
            salary: fields.salary,
            location: fields.location,
            on_site_remote: fields.on_site_remote,
            notes: fields.notes,
            archived: false,
        };
        inner.applications.push(application.clone());
        for entry in entries {
            inner.next_timeline_id += 1;
            let timeline = Timeline {
                id: inner.next_timeline_id,
                user_id: owner_user_id,
                application_id: application.id,
                name: entry.name.clone(),
                value: entry.value.clone(),
            };
            inner.timelines.push(timeline);
        }
        Ok(application)
    }

    async fn create_timeline(
        &self,
        owner_user_id: i64,
        application_id: i64,
        entry: TimelineEntry,
    ) -> Result<Timeline, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if let Some(err) = self.timeline_write_error() {
            return Err(err);
        }
        inner.next_timeline_id += 1;
        let timeline = Timeline {
            id: inner.next_timeline_id,
            user_id: owner_user_id,
            application_id,
            name: entry.name,
            value: entry.value,
        };
        inner.timelines.push(timeline.clone());
        Ok(timeline)
    }

    async fn list_applications(&self, owner_user_id: i64) -> Result<Vec<Application>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .applications
            .iter()
            .filter(|a| a.user_id == owner_user_id)
            .cloned()
            .collect())
    }

    async fn get_application(
        &self,
        application_id: i64,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        let Some(application) = inner
            .applications
            .iter()
            .find(|a| a.id == application_id)
            .cloned()
        else {
            return Ok(None);
        };
        let timelines = inner
            .timelines
            .iter()
            .filter(|t| t.application_id == application_id)
            .cloned()
            .collect();
        Ok(Some(ApplicationRecord {
            application,
            timelines,
        }))
    }

    async fn get_timeline(&self, timeline_id: i64) -> Result<Option<Timeline>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.timelines.iter().find(|t| t.id == timeline_id).cloned())
    }

    async fn update_application(
        &self,
        application: &Application,
        entries: Option<&[TimelineEntry]>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if entries.is_some() {
            if let Some(err) = self.timeline_write_error() {
                return Err(err);
            }
        }
        if let Some(existing) = inner
            .applications
            .iter_mut()
            .find(|a| a.id == application.id)
        {
            *existing = application.clone();
        }
        if let Some(entries) = entries {
            inner.timelines.retain(|t| t.application_id != application.id);
            for entry in entries {
                inner.next_timeline_id += 1;
                let timeline = Timeline {
                    id: inner.next_timeline_id,
                    user_id: application.user_id,
                    application_id: application.id,
                    name: entry.name.clone(),
                    value: entry.value.clone(),
                };
                inner.timelines.push(timeline);
            }
        }
        Ok(())
    }

    async fn delete_timelines_of(&self, application_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.timelines.retain(|t| t.application_id != application_id);
        Ok(())
    }

    async fn delete_application(&self, application_id: i64) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.timelines.retain(|t| t.application_id != application_id);
        inner.applications.retain(|a| a.id != application_id);
        Ok(())
    }
}

/// Verifier mapping fixed test tokens to subjects, no cryptography involved.
pub struct StaticVerifier {
    tokens: HashMap<&'static str, &'static str>,
}

impl Default for StaticVerifier {
    fn default() -> Self {
        let mut tokens = HashMap::new();
        tokens.insert(TOKEN_A, "auth0|user-a");
        tokens.insert(TOKEN_B, "auth0|user-b");
        tokens.insert(TOKEN_FLAT_SUB, "user-without-provider");
        Self { tokens }
    }
}

#[async_trait]
impl TokenVerifier for StaticVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedClaims, AuthError> {
        self.tokens
            .get(token)
            .map(|sub| VerifiedClaims {
                sub: sub.to_string(),
            })
            .ok_or_else(|| AuthError::InvalidToken("unknown test token".to_string()))
    }
}

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
}

pub fn test_context() -> TestContext {
    let store = Arc::new(MemoryStore::default());
    let state = AppState::new(store.clone(), Arc::new(StaticVerifier::default()));
    TestContext {
        app: handlers::router(state),
        store,
    }
}

/// Build a request, optionally authenticated and with a JSON body.
pub fn request(
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Drive one request through the router, returning status and raw body.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

/// Like `send`, but parses the body as JSON.
pub async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, req).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}
