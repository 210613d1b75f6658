//! PostgreSQL user directory.

use crate::directory::{NewUser, UserDirectory, UserId, UserRecord};
use crate::errors::SessionError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, instrument};

const UNIQUE_EMAIL_CONSTRAINT: &str = "users_email_unique";

#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a small pool to `database_url`.
    pub async fn connect(database_url: &str) -> Result<Self, SessionError> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| {
                error!(target: "session.directory", error = %e, "Failed to connect to database");
                SessionError::Directory(format!("Failed to connect to database: {}", e))
            })?;

        Ok(Self::new(pool))
    }

    /// Apply the bundled migrations.
    pub async fn migrate(&self) -> Result<(), SessionError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| SessionError::Directory(format!("Migration failed: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn is_unique_email_violation(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => {
            db.is_unique_violation() && db.constraint() == Some(UNIQUE_EMAIL_CONSTRAINT)
        }
        _ => false,
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip_all)]
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, SessionError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT
                id, first_name, last_name, email, password_hash,
                avatar, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::Directory(format!("Failed to fetch user by email: {}", e)))
    }

    #[instrument(skip_all)]
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, SessionError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT
                id, first_name, last_name, email, password_hash,
                avatar, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SessionError::Directory(format!("Failed to fetch user by id: {}", e)))
    }

    #[instrument(skip_all)]
    async fn create(&self, user: NewUser) -> Result<UserRecord, SessionError> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (first_name, last_name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING
                id, first_name, last_name, email, password_hash,
                avatar, created_at, updated_at
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_email_violation(&e) {
                SessionError::EmailTaken
            } else {
                SessionError::Directory(format!("Failed to create user: {}", e))
            }
        })
    }
}
