use super::search::SEARCH_PATH;
use super::{PrixNcClient, SELLING_POINTS_PATH};
use crate::error::CatalogError;

pub const SEARCH_ENDPOINT: &str = SEARCH_PATH;
pub const PRODUCT_ENDPOINT: &str = "produits";

/// Endpoints a relay caller may name explicitly.
const ALLOWED_ENDPOINTS: &[&str] = &[SEARCH_ENDPOINT, PRODUCT_ENDPOINT];

/// One upstream call forwarded verbatim by the relay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayRequest {
    /// `GET /{endpoint}?nom=&page=&size=&sort=`
    Search {
        endpoint: String,
        query: String,
        page: String,
        size: String,
        sort: String,
    },
    /// `GET /produits/{id}`
    Product { id: String },
    /// `GET /relevesprix/search/findByIdProduit...?idProduit=`
    SellingPoints { id_produit: String },
}

impl RelayRequest {
    #[must_use]
    pub fn is_allowed_endpoint(endpoint: &str) -> bool {
        ALLOWED_ENDPOINTS.contains(&endpoint)
    }
}

/// Upstream status and body, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl PrixNcClient {
    /// Performs the upstream call for `request` and returns status and body
    /// without checking either.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] on transport failure, or
    /// [`CatalogError::InvalidBaseUrl`] if the target URL cannot be built.
    pub async fn fetch_raw(&self, request: &RelayRequest) -> Result<RawResponse, CatalogError> {
        let url = match request {
            RelayRequest::Search {
                endpoint,
                query,
                page,
                size,
                sort,
            } => self.endpoint_url(
                endpoint,
                &[
                    ("nom", query.clone()),
                    ("page", page.clone()),
                    ("size", size.clone()),
                    ("sort", sort.clone()),
                ],
            )?,
            RelayRequest::Product { id } => self.product_url(id)?,
            RelayRequest::SellingPoints { id_produit } => {
                self.endpoint_url(SELLING_POINTS_PATH, &[("idProduit", id_produit.clone())])?
            }
        };

        tracing::debug!(url = %url, "relaying catalog request");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        Ok(RawResponse { status, body })
    }
}
