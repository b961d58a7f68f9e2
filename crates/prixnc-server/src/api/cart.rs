use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use indexmap::IndexMap;
use prixnc_core::{Cart, Product};
use serde::Serialize;
use tokio::sync::Mutex;

use super::extract::ApiJson;
use super::{ApiError, ApiResponse, AppState};
use crate::middleware::{RequestId, SessionId};

/// In-memory carts keyed by session id. Lost on restart.
///
/// Only non-empty carts are stored: reads never insert, and a session whose
/// cart becomes empty is dropped.
#[derive(Clone, Default)]
pub struct CartStore {
    carts: Arc<Mutex<HashMap<String, Cart>>>,
}

impl CartStore {
    /// Snapshot of the session's cart. Unknown sessions read as empty.
    pub async fn view(&self, session: &SessionId) -> CartView {
        let carts = self.carts.lock().await;
        carts.get(&session.0).map(CartView::from).unwrap_or_default()
    }

    /// Runs `f` on the session's cart, creating it if needed.
    pub async fn update<R>(&self, session: &SessionId, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut carts = self.carts.lock().await;
        let cart = carts.entry(session.0.clone()).or_default();
        let out = f(cart);
        let emptied = cart.is_empty();
        if emptied {
            carts.remove(&session.0);
        }
        out
    }

    /// Adds every product not already in the cart and returns how many were
    /// inserted.
    pub async fn add_all(&self, session: &SessionId, products: Vec<Product>) -> (usize, CartView) {
        self.update(session, |cart| {
            let added = products
                .into_iter()
                .filter(|product| cart.add(product.clone()))
                .count();
            (added, CartView::from(&*cart))
        })
        .await
    }

    /// Removes one product. `None` when the session has no such item.
    pub async fn remove(&self, session: &SessionId, id: &str) -> Option<CartView> {
        let mut carts = self.carts.lock().await;
        let cart = carts.get_mut(&session.0)?;
        cart.remove(id)?;
        let view = CartView::from(&*cart);
        if view.count == 0 {
            carts.remove(&session.0);
        }
        Some(view)
    }

    pub async fn clear(&self, session: &SessionId) {
        self.carts.lock().await.remove(&session.0);
    }

    /// Number of sessions currently holding a cart.
    pub async fn session_count(&self) -> usize {
        self.carts.lock().await.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartView {
    pub items: Vec<Product>,
    pub by_store: IndexMap<String, Vec<Product>>,
    pub total: f64,
    pub count: usize,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().cloned().collect(),
            by_store: cart.by_store(),
            total: cart.total(),
            count: cart.len(),
        }
    }
}

#[derive(Debug, Serialize)]
pub(super) struct CartChange {
    pub added: bool,
    pub cart: CartView,
}

pub(super) async fn get_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionId>,
) -> Json<ApiResponse<CartView>> {
    ApiResponse::new(req_id.0, state.carts.view(&session).await)
}

pub(super) async fn add_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionId>,
    ApiJson(product): ApiJson<Product>,
) -> Result<Json<ApiResponse<CartChange>>, ApiError> {
    if product.id.trim().is_empty() {
        return Err(ApiError::validation(&req_id.0, "Le produit doit avoir un id"));
    }

    let change = state
        .carts
        .update(&session, |cart| {
            let added = cart.add(product);
            CartChange {
                added,
                cart: CartView::from(&*cart),
            }
        })
        .await;

    tracing::debug!(session = %session.0, added = change.added, "cart item added");
    Ok(ApiResponse::new(req_id.0, change))
}

pub(super) async fn remove_item(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionId>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CartView>>, ApiError> {
    match state.carts.remove(&session, &id).await {
        Some(view) => Ok(ApiResponse::new(req_id.0, view)),
        None => Err(ApiError::new(
            &req_id.0,
            "not_found",
            format!("Produit {id} absent du panier"),
        )),
    }
}

pub(super) async fn clear_cart(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(session): Extension<SessionId>,
) -> Json<ApiResponse<CartView>> {
    state.carts.clear(&session).await;
    ApiResponse::new(req_id.0, CartView::default())
}
