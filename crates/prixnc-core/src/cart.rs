//! Session-scoped shopping cart.
//!
//! The cart is an insertion-ordered map keyed by product id. It is owned by a
//! single session and never persisted.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::products::Product;

/// Label shown for cart groups whose store has no name.
pub const UNSPECIFIED_STORE_LABEL: &str = "Magasin non spécifié";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: IndexMap<String, Product>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `product` unless a product with the same id is already present.
    ///
    /// Returns `true` when the product was inserted.
    pub fn add(&mut self, product: Product) -> bool {
        if self.items.contains_key(&product.id) {
            return false;
        }
        self.items.insert(product.id.clone(), product);
        true
    }

    /// Removes the product with `id`, keeping the order of the remaining items.
    pub fn remove(&mut self, id: &str) -> Option<Product> {
        self.items.shift_remove(id)
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn items(&self) -> impl Iterator<Item = &Product> {
        self.items.values()
    }

    /// Sum of all known prices; unpriced items count for nothing.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.items.values().filter_map(|p| p.price).sum()
    }

    /// Groups items by store name in first-seen order.
    #[must_use]
    pub fn by_store(&self) -> IndexMap<String, Vec<Product>> {
        let mut groups: IndexMap<String, Vec<Product>> = IndexMap::new();
        for product in self.items.values() {
            let name = if product.store.name.trim().is_empty() {
                UNSPECIFIED_STORE_LABEL.to_string()
            } else {
                product.store.name.clone()
            };
            groups.entry(name).or_default().push(product.clone());
        }
        groups
    }
}
