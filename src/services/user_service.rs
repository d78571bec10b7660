use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, google::GoogleIdentity, AuthError};
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::User;
use crate::error::ApiError;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Account is disabled")]
    Disabled,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::DuplicateEmail(email) => {
                ApiError::conflict(format!("Email '{}' is already registered", email))
            }
            UserError::InvalidCredentials => ApiError::unauthorized("Invalid email or password"),
            UserError::Disabled => ApiError::forbidden("Account is disabled"),
            UserError::Auth(e) => e.into(),
            UserError::DatabaseManager(e) => e.into(),
            UserError::Database(e) => e.into(),
        }
    }
}

const USER_COLUMNS: &str = "id, email, name, password_hash, google_sub, is_active, \
                            created_at, updated_at, trashed_at, deleted_at";

/// Platform account management against the system registry database
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub async fn new() -> Result<Self, UserError> {
        Ok(Self {
            pool: DatabaseManager::main_pool().await?,
        })
    }

    pub fn with_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account with a password credential
    pub async fn register(&self, email: &str, name: &str, password: &str) -> Result<User, UserError> {
        let email = email.trim().to_lowercase();

        if self.find_by_email(&email).await?.is_some() {
            return Err(UserError::DuplicateEmail(email));
        }

        let password_hash = auth::hash_password(password)?;

        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .bind(name)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Registered user {} ({})", user.email, user.id);
        Ok(user)
    }

    /// Verify a password credential and return the account
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserError> {
        let email = email.trim().to_lowercase();

        let user = self
            .find_by_email(&email)
            .await?
            .ok_or(UserError::InvalidCredentials)?;

        if !user.is_active || user.deleted_at.is_some() || user.trashed_at.is_some() {
            return Err(UserError::Disabled);
        }

        let stored = user
            .password_hash
            .as_deref()
            .ok_or(UserError::InvalidCredentials)?;

        if !auth::verify_password(password, stored)? {
            return Err(UserError::InvalidCredentials);
        }

        Ok(user)
    }

    /// Find or provision the account asserted by a verified Google identity.
    /// An existing password account with the same email is linked rather
    /// than duplicated.
    pub async fn ensure_google_user(&self, identity: &GoogleIdentity) -> Result<User, UserError> {
        let email = identity.email.trim().to_lowercase();

        let existing = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE (google_sub = $1 OR email = $2) AND deleted_at IS NULL"
        ))
        .bind(&identity.sub)
        .bind(&email)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(user) = existing {
            if !user.is_active || user.trashed_at.is_some() {
                return Err(UserError::Disabled);
            }

            if user.google_sub.as_deref() != Some(identity.sub.as_str()) {
                let linked = sqlx::query_as::<_, User>(&format!(
                    "UPDATE users SET google_sub = $1, updated_at = now() \
                     WHERE id = $2 \
                     RETURNING {USER_COLUMNS}"
                ))
                .bind(&identity.sub)
                .bind(user.id)
                .fetch_one(&self.pool)
                .await?;
                return Ok(linked);
            }

            return Ok(user);
        }

        let name = identity.name.clone().unwrap_or_else(|| email.clone());
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (email, name, google_sub) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&email)
        .bind(&name)
        .bind(&identity.sub)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Provisioned Google user {} ({})", user.email, user.id);
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}
