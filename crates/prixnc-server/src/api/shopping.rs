//! Shopping-list pipeline, aggregation, route and pattern endpoints.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    Extension, Json,
};
use prixnc_assistant::{
    aggregate_best_prices, cheapest_picks, optimize_shopping_route, PatternAnalysis, Purchase,
    ShoppingListOutcome, ShoppingRecommendation, ShoppingRoute,
};
use prixnc_core::{GeoPoint, Product};
use serde::{Deserialize, Serialize};

use super::cart::CartView;
use super::extract::{rejected, ApiJson};
use super::{map_assistant_error, parse_location, ApiError, ApiResponse, AppState};
use crate::middleware::{RequestId, SessionId};

const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
pub(super) struct ShoppingListResponse {
    #[serde(flatten)]
    pub outcome: ShoppingListOutcome,
    pub recommendation: ShoppingRecommendation,
    /// Number of cheapest picks that were not already in the cart.
    pub added_to_cart: usize,
    pub cart: CartView,
}

#[derive(Debug, Deserialize)]
pub(super) struct TextListRequest {
    pub text: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RecommendationRequest {
    pub search_results: Vec<Vec<Product>>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RouteRequest {
    pub products: Vec<Product>,
    pub location: GeoPoint,
}

#[derive(Debug, Deserialize)]
pub(super) struct PatternsRequest {
    pub history: Vec<Purchase>,
}

fn multipart_error(request_id: &str, error: &MultipartError) -> ApiError {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::new(request_id, "payload_too_large", "L'image est trop volumineuse");
    }
    ApiError::new(request_id, "bad_request", error.body_text())
}

fn parse_coordinate(request_id: &str, field: &str, raw: &str) -> Result<f64, ApiError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ApiError::validation(request_id, format!("{field} n'est pas un nombre")))
}

/// Aggregates the outcome and puts every item's cheapest offer in the cart.
async fn finish_list(
    state: &AppState,
    session: &SessionId,
    outcome: ShoppingListOutcome,
) -> ShoppingListResponse {
    let recommendation = aggregate_best_prices(&outcome.search_results);
    let picks = cheapest_picks(&outcome.search_results);
    let (added_to_cart, cart) = state.carts.add_all(session, picks).await;

    tracing::info!(
        session = %session.0,
        items = outcome.items().len(),
        added_to_cart,
        "shopping list matched"
    );

    ShoppingListResponse {
        outcome,
        recommendation,
        added_to_cart,
        cart,
    }
}

pub(super) async fn shopping_list_image(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionId>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<ShoppingListResponse>>, ApiError> {
    let mut multipart =
        multipart.map_err(|e| rejected(&req_id.0, e.status(), e.body_text()))?;
    let mut image = None;
    let mut lat = None;
    let mut lon = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&req_id.0, &e))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(IMAGE_FIELD) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| multipart_error(&req_id.0, &e))?;
                image = Some(bytes);
            }
            Some(coord @ ("lat" | "lon")) => {
                let raw = field
                    .text()
                    .await
                    .map_err(|e| multipart_error(&req_id.0, &e))?;
                let value = parse_coordinate(&req_id.0, coord, &raw)?;
                if coord == "lat" {
                    lat = Some(value);
                } else {
                    lon = Some(value);
                }
            }
            _ => {}
        }
    }

    let image = image
        .filter(|bytes| !bytes.is_empty())
        .ok_or_else(|| ApiError::validation(&req_id.0, "Le champ image est requis"))?;
    let location = parse_location(&req_id.0, lat, lon)?;

    tracing::debug!(bytes = image.len(), "shopping list image received");

    let outcome = state
        .assistant
        .process_image(&image, location)
        .await
        .map_err(|e| map_assistant_error(&req_id.0, &e))?;

    let response = finish_list(&state, &session, outcome).await;
    Ok(ApiResponse::new(req_id.0, response))
}

pub(super) async fn shopping_list_text(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionId>,
    ApiJson(body): ApiJson<TextListRequest>,
) -> Result<Json<ApiResponse<ShoppingListResponse>>, ApiError> {
    if body.text.trim().is_empty() {
        return Err(ApiError::validation(&req_id.0, "Le texte de la liste est vide"));
    }
    if let Some(point) = body.location {
        parse_location(&req_id.0, Some(point.latitude), Some(point.longitude))?;
    }

    let outcome = state
        .assistant
        .process_text(body.text.trim().to_string(), body.location)
        .await;

    let response = finish_list(&state, &session, outcome).await;
    Ok(ApiResponse::new(req_id.0, response))
}

pub(super) async fn recommendations(
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<RecommendationRequest>,
) -> Json<ApiResponse<ShoppingRecommendation>> {
    ApiResponse::new(req_id.0, aggregate_best_prices(&body.search_results))
}

pub(super) async fn route(
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<RouteRequest>,
) -> Result<Json<ApiResponse<ShoppingRoute>>, ApiError> {
    let user = parse_location(
        &req_id.0,
        Some(body.location.latitude),
        Some(body.location.longitude),
    )?
    .unwrap_or(body.location);

    Ok(ApiResponse::new(
        req_id.0,
        optimize_shopping_route(&body.products, user),
    ))
}

pub(super) async fn patterns(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiJson(body): ApiJson<PatternsRequest>,
) -> Result<Json<ApiResponse<PatternAnalysis>>, ApiError> {
    let has_purchases = body.history.iter().any(|p| !p.products.is_empty());
    if has_purchases && !state.assistant.has_model() {
        return Err(ApiError::new(
            &req_id.0,
            "model_unavailable",
            "L'analyse des achats nécessite un modèle configuré (OPENAI_API_KEY)",
        ));
    }

    let analysis = state
        .assistant
        .analyze_patterns(&body.history)
        .await
        .map_err(|e| map_assistant_error(&req_id.0, &e))?;

    Ok(ApiResponse::new(req_id.0, analysis))
}
