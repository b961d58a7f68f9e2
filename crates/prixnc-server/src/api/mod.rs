mod auth;
mod cart;
mod catalog;
mod extract;
mod relay;
mod shopping;

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use prixnc_assistant::{AssistantError, OpenAiChatClient, ShoppingAssistant, TesseractEngine};
use prixnc_catalog::{CatalogError, PrixNcClient};
use prixnc_core::{AppConfig, GeoPoint};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    request_id, session_id, RequestId, REQUEST_ID_HEADER, SESSION_ID_HEADER,
};

pub use cart::CartStore;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub assistant: ShoppingAssistant,
    pub carts: CartStore,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Builds the catalog client, OCR engine and (when a key is configured)
    /// the chat model from `config`.
    ///
    /// # Errors
    ///
    /// Fails when the catalog base URL is invalid or an HTTP client cannot be
    /// built.
    pub fn from_config(pool: PgPool, config: &AppConfig) -> anyhow::Result<Self> {
        let catalog = PrixNcClient::new(
            &config.catalog_base_url,
            config.catalog_timeout_secs,
            &config.user_agent,
            config.default_page_size,
        )?;
        let model = OpenAiChatClient::from_config(config)?;
        if model.is_none() {
            tracing::warn!(
                "OPENAI_API_KEY not set; item extraction uses the line filter and pattern analysis is disabled"
            );
        }

        let assistant = ShoppingAssistant::new(
            Arc::new(TesseractEngine::from_config(config)),
            model.map(|m| Arc::new(m) as Arc<dyn prixnc_assistant::ChatModel>),
            catalog,
        );

        Ok(Self {
            pool,
            assistant,
            carts: CartStore::default(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
    chat_model: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(request_id: String, data: T) -> Json<Self> {
        Json(Self {
            data,
            meta: ResponseMeta::new(request_id),
        })
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn validation(request_id: &str, message: impl Into<String>) -> Self {
        Self::new(request_id, "validation_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "payload_too_large" => StatusCode::PAYLOAD_TOO_LARGE,
            "ocr_error" => StatusCode::UNPROCESSABLE_ENTITY,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            "model_unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_catalog_error(request_id: &str, error: &CatalogError) -> ApiError {
    match error {
        CatalogError::NotFound { what } => {
            tracing::debug!(what = %what, "catalog lookup found nothing");
            ApiError::new(request_id, "not_found", "Aucun produit trouvé")
        }
        CatalogError::InvalidBaseUrl { .. } => {
            tracing::error!(error = %error, "catalog client misconfigured");
            ApiError::new(request_id, "internal_error", "Erreur serveur")
        }
        CatalogError::Http(_) | CatalogError::Upstream { .. } | CatalogError::Deserialize { .. } => {
            tracing::warn!(error = %error, "catalog request failed");
            ApiError::new(
                request_id,
                "upstream_error",
                "Erreur API : le service de prix est indisponible, veuillez réessayer",
            )
        }
    }
}

pub(super) fn map_assistant_error(request_id: &str, error: &AssistantError) -> ApiError {
    match error {
        AssistantError::Ocr(reason) => {
            tracing::warn!(reason = %reason, "ocr failed");
            ApiError::new(
                request_id,
                "ocr_error",
                "Impossible de lire le texte de l'image",
            )
        }
        AssistantError::Model(reason) => {
            tracing::warn!(reason = %reason, "chat model failed");
            ApiError::new(
                request_id,
                "upstream_error",
                "Le service de recommandations est indisponible",
            )
        }
        AssistantError::Catalog(e) => map_catalog_error(request_id, e),
    }
}

pub(super) fn map_db_error(request_id: &str, error: &prixnc_db::DbError) -> ApiError {
    tracing::error!(error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "Erreur serveur")
}

/// `lat`/`lon` must be given together and lie within valid ranges.
pub(super) fn parse_location(
    request_id: &str,
    lat: Option<f64>,
    lon: Option<f64>,
) -> Result<Option<GeoPoint>, ApiError> {
    match (lat, lon) {
        (None, None) => Ok(None),
        (Some(lat), Some(lon))
            if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) =>
        {
            Ok(Some(GeoPoint::new(lat, lon)))
        }
        (Some(_), Some(_)) => Err(ApiError::validation(
            request_id,
            "lat doit être compris entre -90 et 90 et lon entre -180 et 180",
        )),
        _ => Err(ApiError::validation(
            request_id,
            "lat et lon doivent être fournis ensemble",
        )),
    }
}

fn build_cors() -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);
    let session_id = HeaderName::from_static(SESSION_ID_HEADER);
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, request_id.clone(), session_id.clone()])
        .expose_headers([request_id, session_id])
}

pub fn build_app(state: AppState) -> Router {
    let upload_limit = state.max_upload_bytes;

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/search", get(catalog::search))
        .route("/api/v1/products/{id}", get(catalog::product_by_id))
        .route("/api/v1/products/{id}/details", get(catalog::product_details))
        .route(
            "/api/v1/shopping-list",
            post(shopping::shopping_list_image).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/v1/shopping-list/text", post(shopping::shopping_list_text))
        .route("/api/v1/recommendations", post(shopping::recommendations))
        .route("/api/v1/route", post(shopping::route))
        .route("/api/v1/patterns", post(shopping::patterns))
        .route("/api/v1/cart", get(cart::get_cart).delete(cart::clear_cart))
        .route("/api/v1/cart/items", post(cart::add_item))
        .route("/api/v1/cart/items/{id}", delete(cart::remove_item))
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/prixnc", get(relay::relay))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(axum::middleware::from_fn(session_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let chat_model = if state.assistant.has_model() {
        "configured"
    } else {
        "disabled"
    };

    match prixnc_db::ping(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            ApiResponse::new(
                req_id.0,
                HealthData {
                    status: "ok",
                    database: "ok",
                    chat_model,
                },
            ),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                ApiResponse::new(
                    req_id.0,
                    HealthData {
                        status: "degraded",
                        database: "unavailable",
                        chat_model,
                    },
                ),
            )
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support;
