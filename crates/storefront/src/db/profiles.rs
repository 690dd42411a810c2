//! Profile repository.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use clothstore_core::{Email, UserId};

use super::RepositoryError;
use crate::models::Profile;

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: uuid::Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

impl ProfileRow {
    fn into_profile(self) -> Result<Profile, RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok(Profile {
            id: UserId::new(self.id),
            name: self.name,
            email,
            created_at: self.created_at,
        })
    }
}

/// Repository for customer profile reads and provisioning.
pub struct ProfileRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepository<'a> {
    /// Create a new profile repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a profile by user ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT id, name, email, created_at FROM storefront.profile WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(self.pool)
        .await?;

        row.map(ProfileRow::into_profile).transpose()
    }

    /// Create a profile for an account the auth provider just issued.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the id or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        id: UserId,
        name: &str,
        email: &Email,
    ) -> Result<Profile, RepositoryError> {
        let row: ProfileRow = sqlx::query_as(
            "INSERT INTO storefront.profile (id, name, email) \
             VALUES ($1, $2, $3) \
             RETURNING id, name, email, created_at",
        )
        .bind(id.as_uuid())
        .bind(name)
        .bind(email.as_str())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("profile already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.into_profile()
    }
}
