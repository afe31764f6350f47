use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::database::models::{User, UserRole};

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("Email already registered")]
    EmailTaken,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

const USER_COLUMNS: &str = "id, email, password_hash, role, created_at";

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a user on any executor, so callers composing multi-row
    /// writes (registration creates a user plus a store) can run it inside
    /// their own transaction.
    pub async fn create_user_with(
        executor: impl sqlx::postgres::PgExecutor<'_>,
        email: &str,
        password: &str,
        role: UserRole,
    ) -> Result<User, UserServiceError> {
        let email = email.trim().to_lowercase();
        let password_hash = bcrypt::hash(password, config::config().security.bcrypt_cost)?;

        let query = format!(
            "INSERT INTO users (id, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            USER_COLUMNS
        );
        let result = sqlx::query_as::<_, User>(&query)
            .bind(Uuid::new_v4())
            .bind(&email)
            .bind(&password_hash)
            .bind(role)
            .fetch_one(executor)
            .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err))
                if matches!(db_err.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
            {
                Err(UserServiceError::EmailTaken)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Verify credentials and return the user. The bcrypt check runs even
    /// when no user row matches, keeping the timing of both failures close.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        let email = email.trim().to_lowercase();
        let query = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&query)
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;

        match user {
            Some(user) => {
                if bcrypt::verify(password, &user.password_hash)? {
                    Ok(user)
                } else {
                    Err(UserServiceError::InvalidCredentials)
                }
            }
            None => {
                // Burn a comparable amount of work before failing
                let _ = bcrypt::verify(password, DUMMY_HASH);
                Err(UserServiceError::InvalidCredentials)
            }
        }
    }

    pub async fn find_by_id(&self, user_id: Uuid) -> Result<Option<User>, UserServiceError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

// bcrypt hash of an unguessable sentinel, used only to equalize timing
const DUMMY_HASH: &str = "$2b$12$C6UzMDM.H6dfI/f/IKcEeO5cEav9l0Lg5p8H1QyCNIkzXAfqJtGi6";
