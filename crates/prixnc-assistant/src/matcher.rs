//! Concurrent per-item catalog search.

use futures::future::join_all;
use prixnc_catalog::{PrixNcClient, SearchParams};
use prixnc_core::{GeoPoint, Product, SortBy};

/// Searches the catalog once per item, all requests in flight together.
///
/// The output has one list per input item, in input order. A failed search
/// yields an empty list for that item and never aborts the batch.
pub async fn match_all(
    client: &PrixNcClient,
    items: &[String],
    location: Option<GeoPoint>,
) -> Vec<Vec<Product>> {
    let searches = items.iter().map(|item| async move {
        let params = SearchParams::new(item.as_str())
            .with_location(location)
            .with_sort(Some(SortBy::Price));

        match client.search(&params).await {
            Ok(result) => result.products,
            Err(e) => {
                tracing::warn!(item = %item, error = %e, "item search failed; using empty match");
                Vec::new()
            }
        }
    });

    let results = join_all(searches).await;

    let failed_or_empty = results.iter().filter(|r| r.is_empty()).count();
    tracing::debug!(
        items = items.len(),
        empty = failed_or_empty,
        "matched shopping list items"
    );

    results
}
