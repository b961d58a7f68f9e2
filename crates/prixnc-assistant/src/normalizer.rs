//! Turns raw OCR text into product names.
//!
//! The model is asked for a bare JSON array of strings. Anything else it
//! says (prose around the array, a JSON object, non-string elements) is a
//! parse failure and the deterministic line filter from [`crate::ocr`] is used
//! on the same text instead. Both outcomes are tagged so callers and tests can
//! tell them apart.

use serde::Serialize;

use crate::llm::{ChatModel, EXTRACTION_TEMPERATURE};
use crate::ocr::filter_lines;

const EXTRACTION_PROMPT: &str = "\
You identify shopping list items in text read by OCR from a photo.
The text may be noisy and contain unrelated content.

Extract a clean list of product names, focusing on food, groceries and household products.
Ignore prices, quantities, dates and anything that is not a product.
Answer with a JSON array of strings only, one product name per string, and nothing else.

OCR text:
";

/// Items extracted from OCR text, tagged with how they were obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "items", rename_all = "snake_case")]
pub enum Extraction {
    /// The model answered with a JSON array of strings.
    Parsed(Vec<String>),
    /// Line-filter heuristic over the raw text.
    Fallback(Vec<String>),
}

impl Extraction {
    #[must_use]
    pub fn items(&self) -> &[String] {
        match self {
            Extraction::Parsed(items) | Extraction::Fallback(items) => items,
        }
    }

    #[must_use]
    pub fn into_items(self) -> Vec<String> {
        match self {
            Extraction::Parsed(items) | Extraction::Fallback(items) => items,
        }
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Extraction::Fallback(_))
    }
}

/// Normalizes `raw_text` with the model when one is available.
///
/// Never fails: a missing model, a transport error, or unparseable output
/// all produce [`Extraction::Fallback`].
pub async fn normalize(model: Option<&dyn ChatModel>, raw_text: &str) -> Extraction {
    let Some(model) = model else {
        return Extraction::Fallback(filter_lines(raw_text));
    };

    let prompt = format!("{EXTRACTION_PROMPT}{raw_text}\n\nJSON array:");
    let output = match model.complete(&prompt, EXTRACTION_TEMPERATURE).await {
        Ok(output) => output,
        Err(e) => {
            tracing::warn!(error = %e, "item extraction model call failed; using line filter");
            return Extraction::Fallback(filter_lines(raw_text));
        }
    };

    match parse_model_output(&output) {
        Some(items) => Extraction::Parsed(items),
        None => {
            tracing::warn!(
                output_chars = output.len(),
                "model output is not a JSON string array; using line filter"
            );
            Extraction::Fallback(filter_lines(raw_text))
        }
    }
}

/// Parses the whole (trimmed) output as a JSON array of strings.
///
/// Elements are trimmed and blank ones dropped.
#[must_use]
pub fn parse_model_output(output: &str) -> Option<Vec<String>> {
    let items: Vec<String> = serde_json::from_str(output.trim()).ok()?;
    Some(
        items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect(),
    )
}

#[cfg(test)]
#[path = "normalizer_test.rs"]
mod tests;
