use prixnc_catalog::CatalogError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssistantError {
    /// The recognition engine failed or produced something other than text.
    #[error("OCR engine error: {0}")]
    Ocr(String),

    /// Transport or protocol failure talking to the hosted chat model.
    #[error("chat model error: {0}")]
    Model(String),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
