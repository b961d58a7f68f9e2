use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx answer. `body` is the upstream response text, possibly empty.
    #[error("catalog returned HTTP {status} for {url}")]
    Upstream { status: u16, url: String, body: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("not found: {what}")]
    NotFound { what: String },

    #[error("invalid catalog base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

impl CatalogError {
    /// `true` for failures that belong to the remote catalog rather than to
    /// the request itself (non-2xx, transport, or malformed JSON).
    #[must_use]
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CatalogError::Http(_) | CatalogError::Upstream { .. } | CatalogError::Deserialize { .. }
        )
    }
}
