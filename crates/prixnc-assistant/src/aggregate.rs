//! Best-price aggregation over a matched shopping list.

use std::collections::BTreeMap;

use indexmap::IndexMap;
use prixnc_core::Product;
use serde::{Deserialize, Serialize};

/// Where to buy a basket and what it costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingRecommendation {
    /// Per store, its cheapest offer for each distinct product name.
    pub best_price_stores: BTreeMap<String, Vec<Product>>,
    /// Per store, the sum of `best_price_stores[store]`.
    pub store_totals: BTreeMap<String, f64>,
    /// Lowest price among each item's candidates, `None` when no candidate
    /// has a price.
    pub item_lowest_prices: Vec<Option<f64>>,
    /// Sum of the item minimums.
    pub best_total: f64,
    pub cheapest_store: Option<String>,
    /// Cheapest single-store total minus `best_total`. Negative when that
    /// store does not carry every item.
    pub savings: Option<f64>,
}

/// Aggregates one candidate list per shopping-list item.
///
/// Products without a price take no part in minimums or totals.
#[must_use]
pub fn aggregate_best_prices(search_results: &[Vec<Product>]) -> ShoppingRecommendation {
    let item_lowest_prices: Vec<Option<f64>> = search_results
        .iter()
        .map(|candidates| Product::lowest_price(candidates))
        .collect();
    let best_total: f64 = item_lowest_prices.iter().flatten().sum();

    let mut by_store: BTreeMap<String, IndexMap<String, Product>> = BTreeMap::new();
    for product in search_results.iter().flatten() {
        let Some(price) = product.price else {
            continue;
        };
        let offers = by_store.entry(product.store.name.clone()).or_default();
        match offers.get(&product.name).and_then(|kept| kept.price) {
            Some(kept) if kept <= price => {}
            _ => {
                offers.insert(product.name.clone(), product.clone());
            }
        }
    }

    let best_price_stores: BTreeMap<String, Vec<Product>> = by_store
        .into_iter()
        .map(|(store, offers)| (store, offers.into_values().collect()))
        .collect();

    let store_totals: BTreeMap<String, f64> = best_price_stores
        .iter()
        .map(|(store, products)| {
            let total: f64 = products.iter().filter_map(|p| p.price).sum();
            (store.clone(), total)
        })
        .collect();

    let cheapest = store_totals
        .iter()
        .fold(None::<(&String, f64)>, |best, (store, &total)| match best {
            Some((_, best_total)) if best_total <= total => best,
            _ => Some((store, total)),
        });

    let cheapest_store = cheapest.map(|(store, _)| store.clone());
    let savings = cheapest.map(|(_, total)| total - best_total);

    ShoppingRecommendation {
        best_price_stores,
        store_totals,
        item_lowest_prices,
        best_total,
        cheapest_store,
        savings,
    }
}

/// The cheapest priced candidate of every item that has one, in item order.
#[must_use]
pub fn cheapest_picks(search_results: &[Vec<Product>]) -> Vec<Product> {
    search_results
        .iter()
        .filter_map(|candidates| Product::cheapest(candidates).cloned())
        .collect()
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
