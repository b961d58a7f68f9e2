use axum::{
    extract::{Path, State},
    Extension, Json,
};
use prixnc_catalog::{apply_user_location_to_points, SearchParams};
use prixnc_core::{Product, ProductDetails, SearchResult, SortBy};
use serde::Deserialize;

use super::extract::ApiQuery;
use super::{map_catalog_error, parse_location, ApiError, ApiResponse, AppState};
use crate::middleware::RequestId;

/// Largest page size a caller may request.
const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Deserialize)]
pub(super) struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub sort: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub(super) struct DetailsQuery {
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

pub(super) async fn search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    ApiQuery(params): ApiQuery<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResult>>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::validation(&req_id.0, "Le paramètre query est requis"))?;

    let sort_by = params
        .sort
        .as_deref()
        .map(str::parse::<SortBy>)
        .transpose()
        .map_err(|e| ApiError::validation(&req_id.0, e))?;

    let size = params.size.unwrap_or(state.assistant.catalog().default_page_size());
    if size == 0 || size > MAX_PAGE_SIZE {
        return Err(ApiError::validation(
            &req_id.0,
            format!("size doit être compris entre 1 et {MAX_PAGE_SIZE}"),
        ));
    }

    let location = parse_location(&req_id.0, params.lat, params.lon)?;

    let search = SearchParams::new(query)
        .with_page(params.page.unwrap_or(0))
        .with_page_size(size)
        .with_location(location)
        .with_sort(sort_by);

    let result = state
        .assistant
        .catalog()
        .search(&search)
        .await
        .map_err(|e| map_catalog_error(&req_id.0, &e))?;

    Ok(ApiResponse::new(req_id.0, result))
}

pub(super) async fn product_by_id(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Product>>, ApiError> {
    let product = state
        .assistant
        .catalog()
        .get_product_by_id(&id)
        .await
        .map_err(|e| map_catalog_error(&req_id.0, &e))?;

    Ok(ApiResponse::new(req_id.0, product))
}

pub(super) async fn product_details(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
    ApiQuery(params): ApiQuery<DetailsQuery>,
) -> Result<Json<ApiResponse<ProductDetails>>, ApiError> {
    let name = params
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::validation(&req_id.0, "Le paramètre name est requis"))?;
    let location = parse_location(&req_id.0, params.lat, params.lon)?;

    let mut details = state
        .assistant
        .catalog()
        .get_details(&id, name)
        .await
        .map_err(|e| map_catalog_error(&req_id.0, &e))?;

    if let Some(user) = location {
        apply_user_location_to_points(&mut details.selling_points, user);
    }

    Ok(ApiResponse::new(req_id.0, details))
}
