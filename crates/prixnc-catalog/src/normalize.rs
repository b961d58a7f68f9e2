//! Conversion from prix.nc wire rows to [`prixnc_core`] domain types.
//!
//! The product mapping is fixed:
//! - store id: `idCommerce`, else `idCommune`, else [`UNKNOWN_STORE_ID`]
//! - store name: `secteurConso`, else [`UNSPECIFIED_STORE_NAME`]
//! - category: `sousSecteurConso`, else [`UNCATEGORIZED`]
//! - store location: `adresse`/`latitude`/`longitude` when any is present
//! - availability: `!promotion`, with a missing flag read as `false`
//!
//! Empty strings count as missing everywhere.

use std::cmp::Ordering;

use prixnc_core::{GeoPoint, Product, SellingPoint, Store, StoreLocation};

use crate::types::{CatalogId, MagasinField, ProduitPrix, ReleveePrix};

pub const UNKNOWN_STORE_ID: &str = "unknown";
pub const UNSPECIFIED_STORE_NAME: &str = "unspecified";
pub const UNCATEGORIZED: &str = "uncategorized";

/// Normalizes one `produitsprix` row into a [`Product`].
#[must_use]
pub fn normalize_product(row: ProduitPrix) -> Product {
    let store_id = row
        .id_commerce
        .as_ref()
        .and_then(CatalogId::non_empty)
        .or_else(|| row.id_commune.as_ref().and_then(CatalogId::non_empty))
        .unwrap_or_else(|| UNKNOWN_STORE_ID.to_string());

    let store_name = non_blank(row.secteur_conso).unwrap_or_else(|| UNSPECIFIED_STORE_NAME.to_string());
    let category = non_blank(row.sous_secteur_conso).unwrap_or_else(|| UNCATEGORIZED.to_string());
    let location = store_location(non_blank(row.adresse), row.latitude, row.longitude);

    Product {
        id: row.id.to_string(),
        name: row.nom,
        price: row.meilleur_prix,
        store: Store {
            id: store_id,
            name: store_name,
            location,
            distance: row.distance,
        },
        image_url: non_blank(row.image_url),
        category: Some(category),
        // Promoted rows are reported as not confirmed available.
        availability: Some(!row.promotion.unwrap_or(false)),
    }
}

/// Normalizes one `relevesprix` row into a [`SellingPoint`].
#[must_use]
pub fn normalize_selling_point(row: ReleveePrix) -> SellingPoint {
    let (store_name, location) = match row.magasin {
        Some(MagasinField::Name(name)) => (non_blank(Some(name)), None),
        Some(MagasinField::Detail(magasin)) => (
            non_blank(magasin.nom),
            store_location(magasin.adresse, magasin.latitude, magasin.longitude),
        ),
        None => (None, None),
    };

    SellingPoint {
        id: row.id.to_string(),
        store_name: store_name.unwrap_or_else(|| UNSPECIFIED_STORE_NAME.to_string()),
        price: row.prix,
        price_per_unit: row.prix_par_unite,
        unit_type: non_blank(row.unite),
        last_update: non_blank(row.date_releve),
        location,
        distance: None,
    }
}

fn store_location(
    address: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Option<StoreLocation> {
    (address.is_some() || latitude.is_some() || longitude.is_some()).then(|| StoreLocation {
        address,
        latitude,
        longitude,
    })
}

/// Fills `store.distance` for every product whose store has coordinates.
///
/// Products without coordinates keep whatever distance the catalog sent.
pub fn apply_user_location(products: &mut [Product], user: GeoPoint) {
    for product in products {
        if let Some(point) = product
            .store
            .location
            .as_ref()
            .and_then(StoreLocation::coordinates)
        {
            product.store.distance = Some(user.distance_km(&point));
        }
    }
}

/// Fills `distance` for every selling point with coordinates.
pub fn apply_user_location_to_points(points: &mut [SellingPoint], user: GeoPoint) {
    for point in points {
        if let Some(coords) = point.location.as_ref().and_then(StoreLocation::coordinates) {
            point.distance = Some(user.distance_km(&coords));
        }
    }
}

/// Stable sort by store distance, unknown distances last.
pub fn sort_by_distance(products: &mut [Product]) {
    products.sort_by(|a, b| compare_distance(a.store.distance, b.store.distance));
}

fn compare_distance(a: Option<f64>, b: Option<f64>) -> Ordering {
    a.unwrap_or(f64::INFINITY)
        .total_cmp(&b.unwrap_or(f64::INFINITY))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
