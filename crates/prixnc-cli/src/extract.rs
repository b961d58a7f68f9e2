use std::{path::Path, sync::Arc};

use anyhow::Context;
use prixnc_assistant::{
    aggregate_best_prices, ChatModel, OpenAiChatClient, ShoppingAssistant, TesseractEngine,
};
use prixnc_core::{AppConfig, GeoPoint};

use crate::catalog::{client, fmt_price, print_products};

/// Runs OCR, extraction and matching on `image` and prints the result.
///
/// # Errors
///
/// Returns an error if the image cannot be read or OCR fails.
pub(crate) async fn run_extract(
    config: &AppConfig,
    image: &Path,
    location: Option<GeoPoint>,
    json: bool,
) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("failed to read {}", image.display()))?;

    let model = OpenAiChatClient::from_config(config)?;
    if model.is_none() {
        tracing::warn!("OPENAI_API_KEY not set; using the line filter for item extraction");
    }

    let assistant = ShoppingAssistant::new(
        Arc::new(TesseractEngine::from_config(config)),
        model.map(|m| Arc::new(m) as Arc<dyn ChatModel>),
        client(config)?,
    );

    let outcome = assistant.process_image(&bytes, location).await?;
    let recommendation = aggregate_best_prices(&outcome.search_results);

    if json {
        let report = serde_json::json!({
            "outcome": outcome,
            "recommendation": recommendation,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let source = if outcome.extraction.is_fallback() {
        "line filter"
    } else {
        "model"
    };
    println!("{} item(s) via {source}", outcome.items().len());

    for (item, candidates) in outcome.items().iter().zip(&outcome.search_results) {
        println!("\n== {item}");
        if candidates.is_empty() {
            println!("no match");
        } else {
            print_products(candidates);
        }
    }

    println!("\nbest total: {}", fmt_price(Some(recommendation.best_total)));
    if let Some(store) = &recommendation.cheapest_store {
        let total = recommendation.store_totals.get(store).copied();
        println!("cheapest single store: {store} ({})", fmt_price(total));
    }
    Ok(())
}
