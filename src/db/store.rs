use async_trait::async_trait;
use thiserror::Error;

use crate::db::models::{
    Application, ApplicationRecord, NewApplication, Timeline, TimelineEntry, User, UserRole,
};

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Data-access contract for the application/timeline aggregate.
///
/// Pure data operations: no authorization logic, no business rules. Every
/// query is scoped by explicit identifiers. Each mutating operation covers
/// one whole request-level write and commits or rolls back as one unit, so
/// a mid-operation failure never leaves a partial aggregate behind.
/// Injected into handlers as `Arc<dyn Store>` so tests can substitute an
/// in-memory implementation.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe for the health endpoint.
    async fn health_check(&self) -> Result<(), StoreError>;

    /// Resolve the internal user for a verified subject, creating the row
    /// lazily on first sight.
    async fn get_or_create_user(&self, sub: &str) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_profile_user(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, StoreError>;

    /// Insert a new application owned by `owner_user_id` (`archived` false)
    /// together with its initial timeline entries, in the supplied order, as
    /// one transaction.
    async fn create_application(
        &self,
        owner_user_id: i64,
        fields: NewApplication,
        entries: &[TimelineEntry],
    ) -> Result<Application, StoreError>;

    async fn create_timeline(
        &self,
        owner_user_id: i64,
        application_id: i64,
        entry: TimelineEntry,
    ) -> Result<Timeline, StoreError>;

    /// All applications for a user, in stable id order.
    async fn list_applications(&self, owner_user_id: i64) -> Result<Vec<Application>, StoreError>;

    /// Fetch one application together with its full, ordered timeline
    /// collection. Eager by contract, not by accident.
    async fn get_application(
        &self,
        application_id: i64,
    ) -> Result<Option<ApplicationRecord>, StoreError>;

    async fn get_timeline(&self, timeline_id: i64) -> Result<Option<Timeline>, StoreError>;

    /// Persist the scalar fields of an already-merged application and, when
    /// `entries` is supplied, delete its existing timelines and insert the
    /// new set in the supplied order - all in the same transaction.
    async fn update_application(
        &self,
        application: &Application,
        entries: Option<&[TimelineEntry]>,
    ) -> Result<(), StoreError>;

    async fn delete_timelines_of(&self, application_id: i64) -> Result<(), StoreError>;

    /// Delete all timelines, then the application row, as one transaction.
    async fn delete_application(&self, application_id: i64) -> Result<(), StoreError>;
}
