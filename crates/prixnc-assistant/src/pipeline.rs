//! Shopping-list pipeline: OCR, item normalization, then catalog matching.

use std::sync::Arc;

use prixnc_catalog::PrixNcClient;
use prixnc_core::{GeoPoint, Product};
use serde::Serialize;

use crate::error::AssistantError;
use crate::llm::ChatModel;
use crate::matcher::match_all;
use crate::normalizer::{normalize, Extraction};
use crate::ocr::{extract, OcrEngine};
use crate::patterns::{analyze_shopping_patterns, PatternAnalysis, Purchase};

/// Everything one shopping-list run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListOutcome {
    pub raw_text: String,
    pub extraction: Extraction,
    /// One candidate list per extracted item, in item order.
    pub search_results: Vec<Vec<Product>>,
}

impl ShoppingListOutcome {
    #[must_use]
    pub fn items(&self) -> &[String] {
        self.extraction.items()
    }
}

/// Wires the OCR engine, the optional chat model and the catalog client.
#[derive(Clone)]
pub struct ShoppingAssistant {
    ocr: Arc<dyn OcrEngine>,
    model: Option<Arc<dyn ChatModel>>,
    catalog: PrixNcClient,
}

impl ShoppingAssistant {
    #[must_use]
    pub fn new(
        ocr: Arc<dyn OcrEngine>,
        model: Option<Arc<dyn ChatModel>>,
        catalog: PrixNcClient,
    ) -> Self {
        Self {
            ocr,
            model,
            catalog,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &PrixNcClient {
        &self.catalog
    }

    #[must_use]
    pub fn has_model(&self) -> bool {
        self.model.is_some()
    }

    /// Runs OCR on `image`, then [`Self::process_text`] on the result.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Ocr`] when recognition fails. Later stages
    /// absorb their own failures.
    pub async fn process_image(
        &self,
        image: &[u8],
        location: Option<GeoPoint>,
    ) -> Result<ShoppingListOutcome, AssistantError> {
        let ocr = extract(self.ocr.as_ref(), image).await?;
        Ok(self.process_text(ocr.raw_text, location).await)
    }

    /// Normalizes `raw_text` into items and matches each against the catalog.
    pub async fn process_text(
        &self,
        raw_text: String,
        location: Option<GeoPoint>,
    ) -> ShoppingListOutcome {
        let extraction = normalize(self.model.as_deref(), &raw_text).await;
        let search_results = match_all(&self.catalog, extraction.items(), location).await;

        tracing::info!(
            items = extraction.items().len(),
            fallback = extraction.is_fallback(),
            "shopping list processed"
        );

        ShoppingListOutcome {
            raw_text,
            extraction,
            search_results,
        }
    }

    /// Pattern analysis with the configured model.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Model`] when no model is configured and the
    /// history is not empty, or when the model call fails.
    pub async fn analyze_patterns(
        &self,
        history: &[Purchase],
    ) -> Result<PatternAnalysis, AssistantError> {
        match self.model.as_deref() {
            Some(model) => analyze_shopping_patterns(model, history).await,
            None if history.iter().all(|p| p.products.is_empty()) => {
                Ok(PatternAnalysis::default())
            }
            None => Err(AssistantError::Model(
                "no chat model configured (OPENAI_API_KEY is unset)".to_string(),
            )),
        }
    }
}
