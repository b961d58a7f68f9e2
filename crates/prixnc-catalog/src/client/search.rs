use prixnc_core::{GeoPoint, Pagination, Product, SearchResult, SortBy};

use super::PrixNcClient;
use crate::error::CatalogError;
use crate::normalize::{apply_user_location, normalize_product, sort_by_distance};
use crate::types::{HalCollection, PageInfo, ProduitPrix, PRODUITS_PRIX_KEY};

pub(crate) const SEARCH_PATH: &str = "produitsprix/search";

/// Upstream sort sent when the caller does not ask for one.
pub const DEFAULT_SORT: &str = "nom,asc";

/// Parameters of a product search.
///
/// `page` is zero-indexed. `page_size` falls back to the client default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    pub query: String,
    pub page: u32,
    pub page_size: Option<u32>,
    pub location: Option<GeoPoint>,
    pub sort_by: Option<SortBy>,
}

impl SearchParams {
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = Some(size);
        self
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<GeoPoint>) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_sort(mut self, sort_by: Option<SortBy>) -> Self {
        self.sort_by = sort_by;
        self
    }
}

/// Maps a [`SortBy`] to the upstream `sort` parameter.
///
/// Distance has no upstream equivalent; results are re-ordered locally.
#[must_use]
pub(crate) fn upstream_sort(sort_by: Option<SortBy>) -> &'static str {
    match sort_by {
        Some(SortBy::Price) => "meilleurPrix,asc",
        Some(SortBy::Store) => "secteurConso,asc",
        Some(SortBy::Distance) | None => DEFAULT_SORT,
    }
}

impl PrixNcClient {
    /// Searches the catalog by product name.
    ///
    /// Pagination echoes the requested page and size so repeated calls with
    /// the same parameters report the same `current_page`. Totals come from
    /// the upstream `page` block (`totalPages` defaults to 1, `totalElements`
    /// to 0).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Upstream`] on non-2xx, [`CatalogError::Http`]
    /// on transport failure, or [`CatalogError::Deserialize`] when the body
    /// is not a valid collection.
    pub async fn search(&self, params: &SearchParams) -> Result<SearchResult, CatalogError> {
        let page_size = params.page_size.unwrap_or(self.default_page_size).max(1);
        let (rows, page) = self
            .search_rows(
                &params.query,
                params.page,
                page_size,
                upstream_sort(params.sort_by),
            )
            .await?;

        let mut products: Vec<Product> = rows.into_iter().map(normalize_product).collect();

        if let Some(user) = params.location {
            apply_user_location(&mut products, user);
        }
        if params.sort_by == Some(SortBy::Distance) {
            sort_by_distance(&mut products);
        }

        let pagination = Pagination {
            current_page: params.page,
            total_pages: page.as_ref().and_then(|p| p.total_pages).unwrap_or(1),
            total_items: page.as_ref().and_then(|p| p.total_elements).unwrap_or(0),
            page_size,
        };

        tracing::debug!(
            query = %params.query,
            page = params.page,
            count = products.len(),
            total = pagination.total_items,
            "catalog search complete"
        );

        Ok(SearchResult {
            products,
            pagination,
        })
    }

    /// Fetches a single product by its catalog id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the catalog answers 404, and
    /// the usual upstream errors otherwise.
    pub async fn get_product_by_id(&self, id: &str) -> Result<Product, CatalogError> {
        let url = self.product_url(id)?;
        match self
            .get_json::<ProduitPrix>(url, &format!("produits/{id}"))
            .await
        {
            Ok(row) => Ok(normalize_product(row)),
            Err(CatalogError::Upstream { status: 404, .. }) => Err(CatalogError::NotFound {
                what: format!("product {id}"),
            }),
            Err(e) => Err(e),
        }
    }

    /// Raw `produitsprix/search` rows plus the paging block.
    pub(super) async fn search_rows(
        &self,
        query: &str,
        page: u32,
        size: u32,
        sort: &str,
    ) -> Result<(Vec<ProduitPrix>, Option<PageInfo>), CatalogError> {
        let url = self.endpoint_url(
            SEARCH_PATH,
            &[
                ("nom", query.to_string()),
                ("page", page.to_string()),
                ("size", size.to_string()),
                ("sort", sort.to_string()),
            ],
        )?;

        let collection: HalCollection = self.get_json(url, SEARCH_PATH).await?;
        let rows = collection
            .items::<ProduitPrix>(PRODUITS_PRIX_KEY)
            .map_err(|e| CatalogError::Deserialize {
                context: format!("{SEARCH_PATH} _embedded.{PRODUITS_PRIX_KEY}"),
                source: e,
            })?;

        Ok((rows, collection.page))
    }

    /// `{base}/produits/{id}` with `id` escaped as a single path segment.
    pub(super) fn product_url(&self, id: &str) -> Result<reqwest::Url, CatalogError> {
        let mut url = self.endpoint_url(super::relay::PRODUCT_ENDPOINT, &[])?;
        url.path_segments_mut()
            .map_err(|()| CatalogError::InvalidBaseUrl {
                base_url: self.base_url.clone(),
                reason: "base URL cannot carry path segments".to_string(),
            })?
            .push(id);
        Ok(url)
    }
}
