//! Shopping-list assistant for prix.nc.
//!
//! Turns a photo of a handwritten list into catalog matches:
//! OCR ([`ocr`]) → model-assisted item extraction ([`normalizer`]) →
//! concurrent per-item search ([`matcher`]). The matched lists feed the
//! best-price aggregation ([`aggregate`]), route ordering ([`route`]) and
//! purchase-history analysis ([`patterns`]).

pub mod aggregate;
pub mod error;
pub mod llm;
pub mod matcher;
pub mod normalizer;
pub mod ocr;
pub mod patterns;
pub mod pipeline;
pub mod route;

#[cfg(test)]
mod test_support;

pub use aggregate::{aggregate_best_prices, cheapest_picks, ShoppingRecommendation};
pub use error::AssistantError;
pub use llm::{ChatModel, OpenAiChatClient};
pub use matcher::match_all;
pub use normalizer::{normalize, Extraction};
pub use ocr::{extract, filter_lines, OcrEngine, OcrOutput, TesseractEngine};
pub use patterns::{analyze_shopping_patterns, PatternAnalysis, Purchase};
pub use pipeline::{ShoppingAssistant, ShoppingListOutcome};
pub use route::{optimize_shopping_route, RouteStop, ShoppingRoute};
