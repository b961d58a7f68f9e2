use prixnc_core::{Product, Store, StoreLocation};

pub(crate) fn product(id: &str, name: &str, store: &str, price: Option<f64>) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price,
        store: Store {
            id: format!("store-{store}"),
            name: store.to_string(),
            location: None,
            distance: None,
        },
        image_url: None,
        category: None,
        availability: Some(true),
    }
}

pub(crate) fn located(mut product: Product, lat: f64, lon: f64, distance: Option<f64>) -> Product {
    product.store.location = Some(StoreLocation {
        address: None,
        latitude: Some(lat),
        longitude: Some(lon),
    });
    product.store.distance = distance;
    product
}
