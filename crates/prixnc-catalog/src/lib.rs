//! Client for the prix.nc price-comparison catalog.
//!
//! [`PrixNcClient`] issues search, product, and selling-point requests and
//! normalizes the HAL responses into [`prixnc_core`] domain types. It also
//! exposes [`PrixNcClient::fetch_raw`] for callers that forward upstream
//! answers untouched.

pub mod client;
pub mod error;
pub mod normalize;
pub mod types;

pub use client::{
    PrixNcClient, RawResponse, RelayRequest, SearchParams, DEFAULT_SORT, PRODUCT_ENDPOINT,
    SEARCH_ENDPOINT,
};
pub use error::CatalogError;
pub use normalize::{
    apply_user_location, apply_user_location_to_points, normalize_product, normalize_selling_point,
};
pub use types::{HalCollection, ProduitPrix, ReleveePrix};
