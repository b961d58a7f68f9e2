//! Purchase-history analysis and model-written shopping advice.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use prixnc_core::Product;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::AssistantError;
use crate::llm::{ChatModel, RECOMMENDATION_TEMPERATURE};

/// Number of most frequent items sent to the model.
pub const FREQUENT_ITEMS_LIMIT: usize = 10;
/// Maximum number of recommendations returned.
pub const RECOMMENDATION_COUNT: usize = 5;

static LEADING_ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\.\s*").expect("valid regex"));

const RECOMMENDATION_PROMPT: &str = "\
You are a shopping assistant that helps users optimize their grocery shopping.
Based on the purchase history below, suggest 5 recommendations that help the user save money or shop better.

Frequently purchased items:
";

/// One past shopping trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    pub products: Vec<Product>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternAnalysis {
    /// Up to ten product names, most frequent first.
    pub frequent_items: Vec<String>,
    /// Observed prices per product name, in history order.
    pub price_trends: IndexMap<String, Vec<f64>>,
    pub recommendations: Vec<String>,
}

/// Counts product names across `history` and returns the `limit` most
/// frequent. Equal counts keep the order in which names were first seen.
#[must_use]
pub fn frequent_items(history: &[Purchase], limit: usize) -> Vec<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for product in history.iter().flat_map(|purchase| &purchase.products) {
        *counts.entry(product.name.as_str()).or_insert(0) += 1;
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
        .into_iter()
        .take(limit)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Prices seen for each product name. Unpriced entries are skipped.
#[must_use]
pub fn price_trends(history: &[Purchase]) -> IndexMap<String, Vec<f64>> {
    let mut trends: IndexMap<String, Vec<f64>> = IndexMap::new();
    for product in history.iter().flat_map(|purchase| &purchase.products) {
        let prices = trends.entry(product.name.clone()).or_default();
        if let Some(price) = product.price {
            prices.push(price);
        }
    }
    trends
}

/// Splits model text into at most [`RECOMMENDATION_COUNT`] lines, stripping
/// `1.`-style numbering and dropping blank lines.
#[must_use]
pub fn clean_recommendations(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| LEADING_ORDINAL_RE.replace(line.trim(), "").trim().to_string())
        .filter(|line| !line.is_empty())
        .take(RECOMMENDATION_COUNT)
        .collect()
}

/// Ranks the history and asks the model for five recommendations.
///
/// An empty history (or one without products) returns an empty analysis and
/// does not call the model.
///
/// # Errors
///
/// Returns [`AssistantError::Model`] when the model call fails.
pub async fn analyze_shopping_patterns(
    model: &dyn ChatModel,
    history: &[Purchase],
) -> Result<PatternAnalysis, AssistantError> {
    let frequent_items = frequent_items(history, FREQUENT_ITEMS_LIMIT);
    if frequent_items.is_empty() {
        return Ok(PatternAnalysis::default());
    }

    let prompt = format!(
        "{RECOMMENDATION_PROMPT}{}\n\nGive 5 specific, actionable recommendations:",
        frequent_items.join("\n")
    );
    let text = model.complete(&prompt, RECOMMENDATION_TEMPERATURE).await?;
    let recommendations = clean_recommendations(&text);

    tracing::debug!(
        purchases = history.len(),
        frequent = frequent_items.len(),
        recommendations = recommendations.len(),
        "shopping patterns analyzed"
    );

    Ok(PatternAnalysis {
        frequent_items,
        price_trends: price_trends(history),
        recommendations,
    })
}

#[cfg(test)]
#[path = "patterns_test.rs"]
mod tests;
