//! Shared domain types and configuration for the Prix NC assistant.

mod app_config;
pub mod cart;
mod config;
pub mod geo;
pub mod products;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use cart::{Cart, UNSPECIFIED_STORE_LABEL};
pub use config::{build_app_config, load_app_config, load_app_config_from_env};
pub use geo::{haversine_km, GeoPoint, EARTH_RADIUS_KM};
pub use products::{
    lowest_selling_price, Pagination, Product, ProductDetails, SearchResult, SellingPoint,
    SortBy, Store, StoreLocation,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
