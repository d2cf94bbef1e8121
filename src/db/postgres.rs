use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, Executor, PgPool};
use tracing::info;

use crate::config::DatabaseConfig;
use crate::db::models::{
    Application, ApplicationRecord, NewApplication, Timeline, TimelineEntry, User, UserRole,
};
use crate::db::store::{Store, StoreError};

const SCHEMA: &str = include_str!("schema.sql");

const APPLICATION_COLUMNS: &str = "id, user_id, company_name, official_website, apply_icon, icon, \
     job_title, job_description_link, attractiveness_scale, status, status_category, salary, \
     location, on_site_remote, notes, archived";

/// Postgres-backed store over a pooled connection resource.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
            .connect(&config.url)
            .await?;
        info!("connected to database");
        Ok(Self { pool })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the idempotent schema bootstrap.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        self.pool.execute(SCHEMA).await?;
        info!("schema up to date");
        Ok(())
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn get_or_create_user(&self, sub: &str) -> Result<User, StoreError> {
        // Upsert so two first-time requests from the same subject cannot race
        // into a unique violation.
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (sub) VALUES ($1)
             ON CONFLICT (sub) DO UPDATE SET sub = EXCLUDED.sub
             RETURNING id, sub, name, email, role",
        )
        .bind(sub)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, sub, name, email, role FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_profile_user(
        &self,
        name: &str,
        email: &str,
        role: UserRole,
    ) -> Result<User, StoreError> {
        let result = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, role) VALUES ($1, $2, $3)
             RETURNING id, sub, name, email, role",
        )
        .bind(name)
        .bind(email)
        .bind(role)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                StoreError::Conflict("User with the same email already exists.".to_string()),
            ),
            Err(other) => Err(other.into()),
        }
    }

    async fn create_application(
        &self,
        owner_user_id: i64,
        fields: NewApplication,
        entries: &[TimelineEntry],
    ) -> Result<Application, StoreError> {
        let mut tx = self.pool.begin().await?;

        let application = sqlx::query_as::<_, Application>(&format!(
            "INSERT INTO applications (user_id, company_name, official_website, apply_icon, icon, \
             job_title, job_description_link, attractiveness_scale, status, status_category, \
             salary, location, on_site_remote, notes, archived)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, FALSE)
             RETURNING {APPLICATION_COLUMNS}"
        ))
        .bind(owner_user_id)
        .bind(fields.company_name)
        .bind(fields.official_website)
        .bind(fields.apply_icon)
        .bind(fields.icon)
        .bind(fields.job_title)
        .bind(fields.job_description_link)
        .bind(fields.attractiveness_scale)
        .bind(fields.status)
        .bind(fields.status_category)
        .bind(fields.salary)
        .bind(fields.location)
        .bind(fields.on_site_remote)
        .bind(fields.notes)
        .fetch_one(&mut *tx)
        .await?;

        for entry in entries {
            sqlx::query(
                "INSERT INTO timelines (user_id, application_id, name, value)
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(owner_user_id)
            .bind(application.id)
            .bind(&entry.name)
            .bind(&entry.value)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(application)
    }

    async fn create_timeline(
        &self,
        owner_user_id: i64,
        application_id: i64,
        entry: TimelineEntry,
    ) -> Result<Timeline, StoreError> {
        let timeline = sqlx::query_as::<_, Timeline>(
            "INSERT INTO timelines (user_id, application_id, name, value)
             VALUES ($1, $2, $3, $4)
             RETURNING id, user_id, application_id, name, value",
        )
        .bind(owner_user_id)
        .bind(application_id)
        .bind(entry.name)
        .bind(entry.value)
        .fetch_one(&self.pool)
        .await?;
        Ok(timeline)
    }

    async fn list_applications(&self, owner_user_id: i64) -> Result<Vec<Application>, StoreError> {
        let applications = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE user_id = $1 ORDER BY id"
        ))
        .bind(owner_user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(applications)
    }

    async fn get_application(
        &self,
        application_id: i64,
    ) -> Result<Option<ApplicationRecord>, StoreError> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1"
        ))
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(application) = application else {
            return Ok(None);
        };

        let timelines = sqlx::query_as::<_, Timeline>(
            "SELECT id, user_id, application_id, name, value
             FROM timelines WHERE application_id = $1 ORDER BY id",
        )
        .bind(application_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(ApplicationRecord {
            application,
            timelines,
        }))
    }

    async fn get_timeline(&self, timeline_id: i64) -> Result<Option<Timeline>, StoreError> {
        let timeline = sqlx::query_as::<_, Timeline>(
            "SELECT id, user_id, application_id, name, value FROM timelines WHERE id = $1",
        )
        .bind(timeline_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(timeline)
    }

    async fn update_application(
        &self,
        application: &Application,
        entries: Option<&[TimelineEntry]>,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "UPDATE applications SET company_name = $1, official_website = $2, apply_icon = $3, \
             icon = $4, job_title = $5, job_description_link = $6, attractiveness_scale = $7, \
             status = $8, status_category = $9, salary = $10, location = $11, \
             on_site_remote = $12, notes = $13
             WHERE id = $14",
        )
        .bind(&application.company_name)
        .bind(&application.official_website)
        .bind(application.apply_icon)
        .bind(&application.icon)
        .bind(&application.job_title)
        .bind(&application.job_description_link)
        .bind(application.attractiveness_scale)
        .bind(&application.status)
        .bind(application.status_category)
        .bind(&application.salary)
        .bind(&application.location)
        .bind(application.on_site_remote)
        .bind(&application.notes)
        .bind(application.id)
        .execute(&mut *tx)
        .await?;

        if let Some(entries) = entries {
            sqlx::query("DELETE FROM timelines WHERE application_id = $1")
                .bind(application.id)
                .execute(&mut *tx)
                .await?;

            for entry in entries {
                sqlx::query(
                    "INSERT INTO timelines (user_id, application_id, name, value)
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(application.user_id)
                .bind(application.id)
                .bind(&entry.name)
                .bind(&entry.value)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_timelines_of(&self, application_id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM timelines WHERE application_id = $1")
            .bind(application_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_application(&self, application_id: i64) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM timelines WHERE application_id = $1")
            .bind(application_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(application_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(application_id, "deleted application");
        Ok(())
    }
}
