//! `Json` and `Query` extractors whose rejections use the error envelope.

use axum::{
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{request::Parts, Extensions, StatusCode},
    Json,
};
use serde::de::DeserializeOwned;

use super::ApiError;
use crate::middleware::RequestId;

/// JSON body extractor. A missing content type, malformed JSON or a body of
/// the wrong shape becomes a `validation_error`.
#[derive(Debug)]
pub(super) struct ApiJson<T>(pub T);

/// Query string extractor with the same rejection handling as [`ApiJson`].
#[derive(Debug)]
pub(super) struct ApiQuery<T>(pub T);

fn request_id_of(extensions: &Extensions) -> String {
    extensions
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default()
}

pub(super) fn rejected(request_id: &str, status: StatusCode, detail: String) -> ApiError {
    tracing::debug!(status = status.as_u16(), detail = %detail, "request rejected by extractor");
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(request_id, "payload_too_large", detail);
    }
    ApiError::validation(request_id, detail)
}

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let request_id = request_id_of(req.extensions());
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejected(
                &request_id,
                rejection.status(),
                rejection.body_text(),
            )),
        }
    }
}

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(rejected(
                &request_id_of(&parts.extensions),
                rejection.status(),
                rejection.body_text(),
            )),
        }
    }
}
