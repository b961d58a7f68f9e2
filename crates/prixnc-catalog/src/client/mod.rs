//! HTTP client for the prix.nc price catalog.

mod details;
mod relay;
mod search;

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::CatalogError;

pub use relay::{RawResponse, RelayRequest, PRODUCT_ENDPOINT, SEARCH_ENDPOINT};
pub use search::{SearchParams, DEFAULT_SORT};

/// Upstream listing of selling points for one catalog product, ordered by
/// (price per unit, price, store name) on the catalog side.
pub(crate) const SELLING_POINTS_PATH: &str =
    "relevesprix/search/findByIdProduitOrderByPrixParUniteAscPrixAscMagasinAsc";

/// Client for the prix.nc REST API.
///
/// Every call is a single attempt: non-2xx answers become
/// [`CatalogError::Upstream`] and are never retried here. Callers decide
/// whether to offer a retry.
#[derive(Debug, Clone)]
pub struct PrixNcClient {
    pub(super) client: Client,
    /// API root without trailing slash, e.g. `https://prix.nc/api/v1`.
    pub(super) base_url: String,
    pub(super) default_page_size: u32,
}

impl PrixNcClient {
    /// Creates a client with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`CatalogError::InvalidBaseUrl`] if
    /// `base_url` is not an absolute URL.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
        default_page_size: u32,
    ) -> Result<Self, CatalogError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base_url).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client,
            base_url,
            default_page_size: default_page_size.max(1),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Builds `{base_url}/{path}?{query}` with every query value URL-encoded.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidBaseUrl`] if the joined URL does not parse.
    pub(super) fn endpoint_url(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Url, CatalogError> {
        let raw = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut url = reqwest::Url::parse(&raw).map_err(|e| CatalogError::InvalidBaseUrl {
            base_url: self.base_url.clone(),
            reason: format!("\"{raw}\" is not a valid URL: {e}"),
        })?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// GETs `url` and deserializes the JSON body as `T`.
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Http`] on network or TLS failure.
    /// - [`CatalogError::Upstream`] for any non-2xx status.
    /// - [`CatalogError::Deserialize`] if the body does not match `T`.
    pub(super) async fn get_json<T: DeserializeOwned>(
        &self,
        url: reqwest::Url,
        context: &str,
    ) -> Result<T, CatalogError> {
        tracing::debug!(url = %url, "catalog request");

        let response = self
            .client
            .get(url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), url = %url, "catalog returned non-success status");
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Upstream {
                status: status.as_u16(),
                url: url.to_string(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str::<T>(&body).map_err(|e| CatalogError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
