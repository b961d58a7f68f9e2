use std::sync::Mutex;

use async_trait::async_trait;
use chrono::TimeZone;

use super::*;
use crate::test_support::product;

struct Recorder {
    reply: &'static str,
    prompts: Mutex<Vec<(String, f32)>>,
}

impl Recorder {
    fn new(reply: &'static str) -> Self {
        Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatModel for Recorder {
    async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, AssistantError> {
        self.prompts
            .lock()
            .expect("lock")
            .push((prompt.to_string(), temperature));
        Ok(self.reply.to_string())
    }
}

fn purchase(day: u32, names: &[(&str, Option<f64>)]) -> Purchase {
    Purchase {
        products: names
            .iter()
            .enumerate()
            .map(|(i, (name, price))| product(&i.to_string(), name, "Casino", *price))
            .collect(),
        date: Utc
            .with_ymd_and_hms(2024, 3, day, 10, 0, 0)
            .single()
            .expect("valid date"),
    }
}

#[test]
fn frequency_ties_keep_first_seen_order() {
    let history = vec![
        purchase(1, &[("Pain", None), ("Lait", None), ("Riz", None)]),
        purchase(2, &[("Lait", None), ("Café", None), ("Riz", None)]),
    ];
    assert_eq!(
        frequent_items(&history, 10),
        vec!["Lait", "Riz", "Pain", "Café"]
    );
}

#[test]
fn frequency_is_capped() {
    let names: Vec<String> = (0..15).map(|i| format!("Produit {i}")).collect();
    let entries: Vec<(&str, Option<f64>)> = names.iter().map(|n| (n.as_str(), None)).collect();
    let history = vec![purchase(1, &entries)];
    let ranked = frequent_items(&history, FREQUENT_ITEMS_LIMIT);
    assert_eq!(ranked.len(), 10);
    assert_eq!(ranked[0], "Produit 0");
}

#[test]
fn price_trends_follow_history_order() {
    let history = vec![
        purchase(1, &[("Lait", Some(250.0)), ("Pain", None)]),
        purchase(8, &[("Lait", Some(240.0))]),
    ];
    let trends = price_trends(&history);
    assert_eq!(trends["Lait"], vec![250.0, 240.0]);
    assert!(trends["Pain"].is_empty());
}

#[test]
fn clean_strips_numbering_and_caps_at_five() {
    let text = "1. Achetez en gros\n\n2.Comparez les prix\n3.   Utilisez les promotions\n4. Planifiez\n5. Cuisinez maison\n6. En trop";
    assert_eq!(
        clean_recommendations(text),
        vec![
            "Achetez en gros",
            "Comparez les prix",
            "Utilisez les promotions",
            "Planifiez",
            "Cuisinez maison"
        ]
    );
}

#[test]
fn clean_accepts_fewer_than_five() {
    assert_eq!(
        clean_recommendations("1. Une seule idée\n\n"),
        vec!["Une seule idée"]
    );
}

#[tokio::test]
async fn analysis_sends_ranked_items_at_recommendation_temperature() {
    let model = Recorder::new("1. Achetez le lait en pack\n2. Comparez le riz");
    let history = vec![
        purchase(1, &[("Riz", Some(1890.0)), ("Lait", Some(245.0))]),
        purchase(2, &[("Lait", Some(239.0))]),
    ];

    let analysis = analyze_shopping_patterns(&model, &history)
        .await
        .expect("analysis");

    assert_eq!(analysis.frequent_items, vec!["Lait", "Riz"]);
    assert_eq!(
        analysis.recommendations,
        vec!["Achetez le lait en pack", "Comparez le riz"]
    );
    assert_eq!(analysis.price_trends["Lait"], vec![245.0, 239.0]);

    let prompts = model.prompts.lock().expect("lock");
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].0.contains("Lait\nRiz"));
    assert!((prompts[0].1 - 0.2).abs() < f32::EPSILON);
}

#[tokio::test]
async fn empty_history_skips_model() {
    let model = Recorder::new("should not be used");
    let analysis = analyze_shopping_patterns(&model, &[]).await.expect("analysis");
    assert_eq!(analysis, PatternAnalysis::default());
    assert!(model.prompts.lock().expect("lock").is_empty());
}
