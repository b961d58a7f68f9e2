use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// A product as listed by the price catalog, normalized to one shape regardless
/// of which upstream endpoint produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Upstream product key, kept as a string to avoid precision loss.
    pub id: String,
    pub name: String,
    /// Best known price in XPF. `None` when the catalog has no price, which is
    /// distinct from a price of zero.
    pub price: Option<f64>,
    pub store: Store,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub availability: Option<bool>,
}

impl Product {
    /// Returns the cheapest priced product in `products`, ignoring entries
    /// without a price. Ties keep the earliest entry.
    #[must_use]
    pub fn cheapest(products: &[Product]) -> Option<&Product> {
        products
            .iter()
            .filter_map(|p| p.price.map(|price| (price, p)))
            .fold(None, |best: Option<(f64, &Product)>, (price, p)| match best {
                Some((best_price, _)) if best_price <= price => best,
                _ => Some((price, p)),
            })
            .map(|(_, p)| p)
    }

    /// Lowest price among `products`, ignoring unpriced entries.
    #[must_use]
    pub fn lowest_price(products: &[Product]) -> Option<f64> {
        Self::cheapest(products).and_then(|p| p.price)
    }
}

/// A physical point of sale or, for search results, the consumer sector the
/// catalog files the product under.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<StoreLocation>,
    /// Kilometers from the user, computed locally when a user position is known.
    #[serde(default)]
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreLocation {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl StoreLocation {
    /// Returns the coordinates when both latitude and longitude are known.
    #[must_use]
    pub fn coordinates(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        }
    }
}

/// One observed price for a product at one store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellingPoint {
    pub id: String,
    pub store_name: String,
    pub price: Option<f64>,
    #[serde(default)]
    pub price_per_unit: Option<f64>,
    /// Unit label for `price_per_unit`, e.g. `"kg"` or `"L"`.
    #[serde(default)]
    pub unit_type: Option<String>,
    /// Timestamp of the observation exactly as the catalog reports it.
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub location: Option<StoreLocation>,
    #[serde(default)]
    pub distance: Option<f64>,
}

/// A product together with every selling point the catalog knows for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductDetails {
    #[serde(flatten)]
    pub product: Product,
    pub selling_points: Vec<SellingPoint>,
}

impl ProductDetails {
    /// Builds details whose top-level price is the minimum selling-point price.
    #[must_use]
    pub fn new(mut product: Product, selling_points: Vec<SellingPoint>) -> Self {
        product.price = lowest_selling_price(&selling_points);
        Self {
            product,
            selling_points,
        }
    }
}

/// Minimum price among `points`, skipping points with no recorded price.
#[must_use]
pub fn lowest_selling_price(points: &[SellingPoint]) -> Option<f64> {
    points
        .iter()
        .filter_map(|p| p.price)
        .min_by(f64::total_cmp)
}

/// Zero-indexed pagination metadata for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub products: Vec<Product>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Price,
    Distance,
    Store,
}

impl std::fmt::Display for SortBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortBy::Price => write!(f, "price"),
            SortBy::Distance => write!(f, "distance"),
            SortBy::Store => write!(f, "store"),
        }
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "price" => Ok(SortBy::Price),
            "distance" => Ok(SortBy::Distance),
            "store" => Ok(SortBy::Store),
            other => Err(format!("unknown sort key \"{other}\"")),
        }
    }
}
