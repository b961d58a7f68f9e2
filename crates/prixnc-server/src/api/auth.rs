//! Email/password signup and signin against the `users` table.
//!
//! Success bodies follow the legacy contract (`{message, userId}` and
//! `{id, name, email}`); failures use the regular error envelope.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Extension, Json};
use prixnc_db::{DbError, NewUser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::extract::ApiJson;
use super::{map_db_error, ApiError, AppState};
use crate::middleware::RequestId;

const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub(super) enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed")]
    PasswordHash,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Db(#[from] DbError),
}

impl AuthError {
    fn into_api_error(self, request_id: &str) -> ApiError {
        match self {
            AuthError::InvalidCredentials => {
                ApiError::new(request_id, "unauthorized", "Email ou mot de passe incorrect")
            }
            AuthError::Validation(message) => ApiError::validation(request_id, message),
            AuthError::Db(DbError::DuplicateEmail) => {
                ApiError::new(request_id, "conflict", "Cet email est déjà utilisé")
            }
            AuthError::Db(e) => map_db_error(request_id, &e),
            AuthError::PasswordHash => {
                tracing::error!("password hashing failed");
                ApiError::new(
                    request_id,
                    "internal_error",
                    "Erreur lors de la création du compte",
                )
            }
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SignupRequest {
    #[serde(default)]
    pub nom: String,
    #[serde(default)]
    pub prenom: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct SignupResponse {
    pub message: &'static str,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub(super) struct SigninRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub(super) struct SigninResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
}

fn validate_signup(request: &SignupRequest) -> Result<(), AuthError> {
    let fields = [
        &request.nom,
        &request.prenom,
        &request.email,
        &request.password,
    ];
    if fields.iter().any(|f| f.trim().is_empty()) {
        return Err(AuthError::Validation(
            "Tous les champs sont requis".to_string(),
        ));
    }
    if !request.email.contains('@') {
        return Err(AuthError::Validation("Email invalide".to_string()));
    }
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "Le mot de passe doit contenir au moins {MIN_PASSWORD_LENGTH} caractères"
        )));
    }
    Ok(())
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .map_err(|_| AuthError::InvalidCredentials)
}

/// Runs `f` on the blocking thread pool.
async fn blocking<T, F>(f: F) -> Result<T, AuthError>
where
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|_| AuthError::PasswordHash)?
}

async fn register(state: &AppState, request: SignupRequest) -> Result<i64, AuthError> {
    validate_signup(&request)?;

    let password = request.password;
    let password_hash = blocking(move || hash_password(&password)).await?;

    let id = prixnc_db::create_user(
        &state.pool,
        &NewUser {
            nom: &request.nom,
            prenom: &request.prenom,
            email: &request.email,
            password_hash: &password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = id, "user registered");
    Ok(id)
}

async fn authenticate(state: &AppState, request: SigninRequest) -> Result<SigninResponse, AuthError> {
    if request.email.trim().is_empty() || request.password.is_empty() {
        return Err(AuthError::InvalidCredentials);
    }

    let user = prixnc_db::find_user_by_email(&state.pool, &request.email)
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    let password = request.password;
    let hash = user.password_hash.clone();
    blocking(move || verify_password(&password, &hash)).await?;

    Ok(SigninResponse {
        id: user.id,
        name: user.display_name(),
        email: user.email,
    })
}

pub(super) async fn signup(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = register(&state, request)
        .await
        .map_err(|e| e.into_api_error(&req_id.0))?;

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "Utilisateur créé avec succès",
            user_id,
        }),
    ))
}

pub(super) async fn signin(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiJson(request): ApiJson<SigninRequest>,
) -> Result<Json<SigninResponse>, ApiError> {
    let email = request.email.clone();
    match authenticate(&state, request).await {
        Ok(user) => Ok(Json(user)),
        Err(e) => {
            if matches!(e, AuthError::InvalidCredentials) {
                tracing::debug!(email = %email, "signin rejected");
            }
            Err(e.into_api_error(&req_id.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup_request(password: &str) -> SignupRequest {
        SignupRequest {
            nom: "Wamytan".to_string(),
            prenom: "Léa".to_string(),
            email: "lea@example.nc".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn hash_then_verify_accepts_only_the_hashed_password() {
        let hash = hash_password("motdepasse").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("motdepasse", &hash).is_ok());
        assert!(matches!(
            verify_password("autre-chose", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn same_password_hashes_differently() {
        assert_ne!(hash_password("motdepasse").unwrap(), hash_password("motdepasse").unwrap());
    }

    #[test]
    fn garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("x", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn signup_validation() {
        assert!(validate_signup(&signup_request("12345678")).is_ok());
        assert!(matches!(
            validate_signup(&signup_request("court")),
            Err(AuthError::Validation(_))
        ));

        let mut missing = signup_request("12345678");
        missing.prenom = "  ".to_string();
        let err = validate_signup(&missing).unwrap_err();
        assert_eq!(err.to_string(), "Tous les champs sont requis");
    }
}
