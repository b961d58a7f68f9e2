//! Store visiting order for a set of chosen products.
//!
//! This is not a shortest-path solver. Stores are visited in ascending order
//! of their precomputed `distance`, and the reported length is the sum of the
//! legs along that order.

use std::cmp::Ordering;

use indexmap::IndexMap;
use prixnc_core::{GeoPoint, Product, Store, StoreLocation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteStop {
    pub store: Store,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoppingRoute {
    pub route: Vec<RouteStop>,
    /// Kilometers from the user through every located stop, in route order.
    pub total_distance: f64,
}

/// Groups `products` by store id and orders the stops by distance.
///
/// Stops keep first-seen order among equal distances; stores without a
/// distance come last. A stop without coordinates adds no leg and leaves
/// the current position unchanged.
#[must_use]
pub fn optimize_shopping_route(products: &[Product], user: GeoPoint) -> ShoppingRoute {
    let mut stops: IndexMap<&str, RouteStop> = IndexMap::new();
    for product in products {
        stops
            .entry(product.store.id.as_str())
            .or_insert_with(|| RouteStop {
                store: product.store.clone(),
                products: Vec::new(),
            })
            .products
            .push(product.clone());
    }

    let mut route: Vec<RouteStop> = stops.into_values().collect();
    route.sort_by(|a, b| by_distance(a.store.distance, b.store.distance));

    let mut current = user;
    let mut total_distance = 0.0;
    for stop in &route {
        if let Some(point) = stop
            .store
            .location
            .as_ref()
            .and_then(StoreLocation::coordinates)
        {
            total_distance += current.distance_km(&point);
            current = point;
        }
    }

    ShoppingRoute {
        route,
        total_distance,
    }
}

fn by_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::INFINITY)
        .total_cmp(&b.unwrap_or(f64::INFINITY))
}
