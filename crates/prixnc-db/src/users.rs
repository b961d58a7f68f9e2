//! Database operations for the `users` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub nom: String,
    pub prenom: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRow {
    /// `"<prenom> <nom>"`.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{} {}", self.prenom, self.nom)
    }
}

/// Fields for a signup. `password_hash` must already be hashed.
#[derive(Debug, Clone)]
pub struct NewUser<'a> {
    pub nom: &'a str,
    pub prenom: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Trimmed, lowercased email as stored in `users.email`.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Inserts a user and returns its id.
///
/// # Errors
///
/// Returns [`DbError::DuplicateEmail`] if the email is taken, or
/// [`DbError::Sqlx`] for any other failure.
pub async fn create_user(pool: &PgPool, user: &NewUser<'_>) -> Result<i64, DbError> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (nom, prenom, email, password_hash) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id",
    )
    .bind(user.nom.trim())
    .bind(user.prenom.trim())
    .bind(normalize_email(user.email))
    .bind(user.password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DbError::DuplicateEmail;
            }
        }
        DbError::Sqlx(e)
    })
}

/// Looks a user up by email (case-insensitive), `None` when absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, nom, prenom, email, password_hash, created_at \
         FROM users \
         WHERE email = $1",
    )
    .bind(normalize_email(email))
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Fetches a user by id.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] when no row has `id`, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_user(pool: &PgPool, id: i64) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>(
        "SELECT id, nom, prenom, email, password_hash, created_at \
         FROM users \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)
}
