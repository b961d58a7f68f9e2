//! Same-origin relay to the prix.nc catalog.
//!
//! Unlike the `/api/v1` routes this endpoint answers in the catalog's own
//! shape and reports failures as `{ "error", "details" }`.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use prixnc_catalog::{CatalogError, RelayRequest, DEFAULT_SORT, PRODUCT_ENDPOINT, SEARCH_ENDPOINT};
use serde::Deserialize;
use serde_json::{json, Value};

use super::AppState;

const ACTION_GET_ID_PRODUIT: &str = "getIdProduit";
const ACTION_SELLING_POINTS: &str = "sellingPoints";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RelayQuery {
    pub query: Option<String>,
    pub page: Option<String>,
    pub size: Option<String>,
    pub sort: Option<String>,
    pub endpoint: Option<String>,
    pub action: Option<String>,
    pub id_produit: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
}

/// What a relay call resolved to before touching the network.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum RelayPlan {
    ResolveId { name: String },
    Forward(RelayRequest),
}

#[derive(Debug, PartialEq, Eq)]
pub(super) struct PlanError(pub String);

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(super) fn plan(params: RelayQuery, default_size: u32) -> Result<RelayPlan, PlanError> {
    match params.action.as_deref() {
        Some(ACTION_GET_ID_PRODUIT) => {
            return non_empty(params.name)
                .map(|name| RelayPlan::ResolveId { name })
                .ok_or_else(|| PlanError("Le paramètre name est requis".to_string()));
        }
        Some(ACTION_SELLING_POINTS) => {
            return non_empty(params.id_produit)
                .map(|id_produit| RelayPlan::Forward(RelayRequest::SellingPoints { id_produit }))
                .ok_or_else(|| PlanError("Le paramètre idProduit est requis".to_string()));
        }
        Some(other) => return Err(PlanError(format!("Action inconnue : {other}"))),
        None => {}
    }

    let endpoint = non_empty(params.endpoint).unwrap_or_else(|| SEARCH_ENDPOINT.to_string());
    if !RelayRequest::is_allowed_endpoint(&endpoint) {
        return Err(PlanError(format!("Endpoint non autorisé : {endpoint}")));
    }

    if endpoint == PRODUCT_ENDPOINT {
        if let Some(id) = non_empty(params.id) {
            return Ok(RelayPlan::Forward(RelayRequest::Product { id }));
        }
    }

    Ok(RelayPlan::Forward(RelayRequest::Search {
        endpoint,
        query: params.query.unwrap_or_default(),
        page: non_empty(params.page).unwrap_or_else(|| "0".to_string()),
        size: non_empty(params.size).unwrap_or_else(|| default_size.to_string()),
        sort: non_empty(params.sort).unwrap_or_else(|| DEFAULT_SORT.to_string()),
    }))
}

fn failure(status: StatusCode, error: &str, details: impl Into<String>) -> Response {
    (
        status,
        Json(json!({ "error": error, "details": details.into() })),
    )
        .into_response()
}

fn server_error(error: &CatalogError) -> Response {
    tracing::error!(error = %error, "relay request failed");
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Erreur serveur",
        error.to_string(),
    )
}

pub(super) async fn relay(
    State(state): State<AppState>,
    params: Result<Query<RelayQuery>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            return failure(StatusCode::BAD_REQUEST, "Requête invalide", rejection.body_text());
        }
    };
    let catalog = state.assistant.catalog();

    let request = match plan(params, catalog.default_page_size()) {
        Ok(RelayPlan::Forward(request)) => request,
        Ok(RelayPlan::ResolveId { name }) => {
            return match catalog.resolve_catalog_id(&name).await {
                Ok(id) => Json(json!({ "idProduit": id })).into_response(),
                Err(CatalogError::NotFound { .. }) => failure(
                    StatusCode::NOT_FOUND,
                    "Aucun produit trouvé",
                    format!("aucun résultat pour \"{name}\""),
                ),
                Err(CatalogError::Upstream { status, url, body }) => {
                    tracing::warn!(status, url = %url, "catalog rejected id lookup");
                    failure(
                        StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                        "Erreur API",
                        body,
                    )
                }
                Err(e) => server_error(&e),
            };
        }
        Err(PlanError(message)) => {
            return failure(StatusCode::BAD_REQUEST, "Requête invalide", message);
        }
    };

    let raw = match catalog.fetch_raw(&request).await {
        Ok(raw) => raw,
        Err(e) => return server_error(&e),
    };

    if !raw.is_success() {
        tracing::warn!(status = raw.status, "catalog returned non-success status to relay");
        let status = StatusCode::from_u16(raw.status).unwrap_or(StatusCode::BAD_GATEWAY);
        return failure(status, "Erreur API", raw.body);
    }

    match serde_json::from_str::<Value>(&raw.body) {
        Ok(body) => Json(body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "catalog returned a non-JSON body to relay");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Erreur serveur",
                e.to_string(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> RelayQuery {
        let mut q = RelayQuery::default();
        for (key, value) in pairs {
            let value = Some((*value).to_string());
            match *key {
                "query" => q.query = value,
                "page" => q.page = value,
                "size" => q.size = value,
                "sort" => q.sort = value,
                "endpoint" => q.endpoint = value,
                "action" => q.action = value,
                "idProduit" => q.id_produit = value,
                "name" => q.name = value,
                "id" => q.id = value,
                other => panic!("unknown param {other}"),
            }
        }
        q
    }

    #[test]
    fn bare_request_is_a_default_search() {
        let planned = plan(params(&[("query", "lait")]), 15).unwrap();
        assert_eq!(
            planned,
            RelayPlan::Forward(RelayRequest::Search {
                endpoint: "produitsprix/search".to_string(),
                query: "lait".to_string(),
                page: "0".to_string(),
                size: "15".to_string(),
                sort: "nom,asc".to_string(),
            })
        );
    }

    #[test]
    fn product_endpoint_with_id_fetches_one_product() {
        let planned = plan(params(&[("endpoint", "produits"), ("id", "42")]), 15).unwrap();
        assert_eq!(
            planned,
            RelayPlan::Forward(RelayRequest::Product {
                id: "42".to_string()
            })
        );
    }

    #[test]
    fn product_endpoint_without_id_falls_back_to_listing() {
        let planned = plan(params(&[("endpoint", "produits")]), 15).unwrap();
        assert!(matches!(
            planned,
            RelayPlan::Forward(RelayRequest::Search { ref endpoint, .. }) if endpoint == "produits"
        ));
    }

    #[test]
    fn actions_take_precedence_over_endpoint() {
        let planned = plan(
            params(&[("action", "sellingPoints"), ("idProduit", "7"), ("endpoint", "nope")]),
            15,
        )
        .unwrap();
        assert_eq!(
            planned,
            RelayPlan::Forward(RelayRequest::SellingPoints {
                id_produit: "7".to_string()
            })
        );

        let planned = plan(params(&[("action", "getIdProduit"), ("name", "Lait")]), 15).unwrap();
        assert_eq!(
            planned,
            RelayPlan::ResolveId {
                name: "Lait".to_string()
            }
        );
    }

    #[test]
    fn unknown_endpoint_and_missing_action_args_are_rejected() {
        assert!(plan(params(&[("endpoint", "../admin")]), 15).is_err());
        assert!(plan(params(&[("action", "getIdProduit")]), 15).is_err());
        assert!(plan(params(&[("action", "sellingPoints"), ("idProduit", " ")]), 15).is_err());
        assert!(plan(params(&[("action", "delete")]), 15).is_err());
    }
}
