//! prix.nc API response types.
//!
//! ## Envelope
//! Collection endpoints answer in Spring Data REST (HAL) form: the rows live
//! under `_embedded.<collection>` and paging lives under `page`:
//!
//! ```text
//! { "_embedded": { "produitsprix": [ ... ] },
//!   "page": { "size": 15, "totalElements": 42, "totalPages": 3, "number": 0 } }
//! ```
//!
//! `_embedded` is omitted entirely when a search has no hits, so every
//! collection is modelled as optional and defaults to empty.
//!
//! ## Identifiers
//! Ids are numeric in most responses but some rows carry them as strings.
//! [`CatalogId`] accepts both and always exposes a `String`.
//!
//! ## Prices
//! `meilleurPrix` and `prix` are XPF amounts. They may be `null` when no
//! observation exists; that stays `None` and is never coerced to zero.

use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Collection key for `produitsprix/search`.
pub const PRODUITS_PRIX_KEY: &str = "produitsprix";
/// Collection key for the selling-points listing.
pub const RELEVES_PRIX_KEY: &str = "relevesprix";

/// An upstream id that may arrive as a JSON number or a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CatalogId {
    Number(i64),
    Text(String),
}

impl CatalogId {
    /// The id as a string, or `None` when it is an empty string.
    #[must_use]
    pub fn non_empty(&self) -> Option<String> {
        match self {
            CatalogId::Number(n) => Some(n.to_string()),
            CatalogId::Text(s) if s.trim().is_empty() => None,
            CatalogId::Text(s) => Some(s.clone()),
        }
    }
}

impl std::fmt::Display for CatalogId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogId::Number(n) => write!(f, "{n}"),
            CatalogId::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Paging block of a HAL collection response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub total_elements: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub number: Option<u32>,
}

/// A HAL collection response whose row type is decided by the caller.
#[derive(Debug, Default, Deserialize)]
pub struct HalCollection {
    #[serde(rename = "_embedded", default)]
    pub embedded: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    pub page: Option<PageInfo>,
}

impl HalCollection {
    /// Deserializes the rows stored under `_embedded.<key>`.
    ///
    /// A missing `_embedded` block or a missing key yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the rows exist but do not match `T`.
    pub fn items<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>, serde_json::Error> {
        match self.embedded.as_ref().and_then(|e| e.get(key)) {
            Some(value) => serde_json::from_value(value.clone()),
            None => Ok(Vec::new()),
        }
    }
}

/// A row of `produitsprix/search` or the body of `produits/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProduitPrix {
    pub id: CatalogId,

    /// Catalog product id used by the selling-points listing. Absent on some
    /// rows; the row `id` is used instead.
    #[serde(default)]
    pub id_produit: Option<CatalogId>,

    /// Display name, e.g. `"Lait UHT demi-écrémé 1L"`.
    #[serde(default)]
    pub nom: String,

    #[serde(default)]
    pub meilleur_prix: Option<f64>,

    #[serde(default)]
    pub id_commerce: Option<CatalogId>,

    #[serde(default)]
    pub id_commune: Option<CatalogId>,

    /// Consumer sector label, e.g. `"Alimentation"`.
    #[serde(default)]
    pub secteur_conso: Option<String>,

    /// Consumer sub-sector label, e.g. `"Produits laitiers"`.
    #[serde(default)]
    pub sous_secteur_conso: Option<String>,

    #[serde(default)]
    pub promotion: Option<bool>,

    #[serde(default)]
    pub distance: Option<f64>,

    /// Store address and coordinates, sent on some rows only.
    #[serde(default)]
    pub adresse: Option<String>,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub image_url: Option<String>,
}

impl ProduitPrix {
    /// The id to pass to the selling-points listing.
    #[must_use]
    pub fn catalog_id(&self) -> String {
        self.id_produit
            .as_ref()
            .and_then(CatalogId::non_empty)
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// A row of the selling-points listing (`relevesprix`).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleveePrix {
    pub id: CatalogId,

    #[serde(default)]
    pub prix: Option<f64>,

    #[serde(default)]
    pub prix_par_unite: Option<f64>,

    /// Unit label for `prixParUnite`, e.g. `"kg"`.
    #[serde(default)]
    pub unite: Option<String>,

    /// Observation date, passed through verbatim.
    #[serde(default)]
    pub date_releve: Option<String>,

    #[serde(default)]
    pub magasin: Option<MagasinField>,
}

/// The store of a selling point, either as a bare name or as an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MagasinField {
    Name(String),
    Detail(Magasin),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Magasin {
    #[serde(default)]
    pub id: Option<CatalogId>,
    #[serde(default)]
    pub nom: Option<String>,
    #[serde(default)]
    pub adresse: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}
