use prixnc_core::{ProductDetails, SellingPoint};

use super::search::DEFAULT_SORT;
use super::{PrixNcClient, SELLING_POINTS_PATH};
use crate::error::CatalogError;
use crate::normalize::{normalize_product, normalize_selling_point};
use crate::types::{HalCollection, ProduitPrix, ReleveePrix, RELEVES_PRIX_KEY};

/// The id lookup only inspects the first page of a one-row search.
const RESOLVE_PAGE_SIZE: u32 = 1;

impl PrixNcClient {
    /// Loads a product with every selling point the catalog knows for it.
    ///
    /// Two sequential calls: the catalog id is resolved from `product_name`,
    /// then the selling points for that id are listed. The returned
    /// `product.id` is `product_id` as given by the caller and its `price` is
    /// the lowest selling-point price.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the name resolves to no
    /// candidate or the listing has no selling points.
    pub async fn get_details(
        &self,
        product_id: &str,
        product_name: &str,
    ) -> Result<ProductDetails, CatalogError> {
        let row = self.resolve_product(product_name).await?;
        let catalog_id = row.catalog_id();
        let points = self.fetch_selling_points(&catalog_id).await?;

        if points.is_empty() {
            return Err(CatalogError::NotFound {
                what: format!("selling points for \"{product_name}\""),
            });
        }

        let mut product = normalize_product(row);
        product.id = product_id.to_string();

        tracing::debug!(
            product_id,
            catalog_id = %catalog_id,
            selling_points = points.len(),
            "loaded product details"
        );

        Ok(ProductDetails::new(product, points))
    }

    /// Resolves a product name to its catalog id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] when the search has no hit.
    pub async fn resolve_catalog_id(&self, product_name: &str) -> Result<String, CatalogError> {
        Ok(self.resolve_product(product_name).await?.catalog_id())
    }

    /// Lists the selling points for a catalog id, in upstream order
    /// (price per unit, then price, then store name, all ascending).
    ///
    /// # Errors
    ///
    /// Returns the usual upstream errors. An empty listing is not an error here.
    pub async fn fetch_selling_points(
        &self,
        catalog_id: &str,
    ) -> Result<Vec<SellingPoint>, CatalogError> {
        let url = self.endpoint_url(SELLING_POINTS_PATH, &[("idProduit", catalog_id.to_string())])?;
        let collection: HalCollection = self.get_json(url, RELEVES_PRIX_KEY).await?;
        let rows = collection
            .items::<ReleveePrix>(RELEVES_PRIX_KEY)
            .map_err(|e| CatalogError::Deserialize {
                context: format!("_embedded.{RELEVES_PRIX_KEY}"),
                source: e,
            })?;

        Ok(rows.into_iter().map(normalize_selling_point).collect())
    }

    async fn resolve_product(&self, product_name: &str) -> Result<ProduitPrix, CatalogError> {
        let (rows, _) = self
            .search_rows(product_name, 0, RESOLVE_PAGE_SIZE, DEFAULT_SORT)
            .await?;

        pick_candidate(rows, product_name).ok_or_else(|| CatalogError::NotFound {
            what: format!("product named \"{product_name}\""),
        })
    }
}

/// Exact case-insensitive name match, else the first row.
pub(crate) fn pick_candidate(rows: Vec<ProduitPrix>, name: &str) -> Option<ProduitPrix> {
    let wanted = name.trim().to_lowercase();
    let exact = rows
        .iter()
        .position(|row| row.nom.trim().to_lowercase() == wanted);

    let index = exact.unwrap_or(0);
    rows.into_iter().nth(index)
}
