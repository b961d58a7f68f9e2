use super::*;
use crate::test_support::product;

#[test]
fn savings_can_be_negative() {
    // Item minimums: 400 (Riz at A) + 600 (Huile at A) = 1000.
    // B only carries Huile, so its "everything here" total is 950.
    let results = vec![
        vec![product("1", "Riz", "A", Some(400.0))],
        vec![
            product("2", "Huile", "A", Some(600.0)),
            product("3", "Huile", "B", Some(950.0)),
        ],
    ];

    let rec = aggregate_best_prices(&results);

    assert_eq!(rec.item_lowest_prices, vec![Some(400.0), Some(600.0)]);
    assert!((rec.best_total - 1000.0).abs() < 1e-9);
    assert_eq!(rec.store_totals.get("A"), Some(&1000.0));
    assert_eq!(rec.store_totals.get("B"), Some(&950.0));
    assert_eq!(rec.cheapest_store.as_deref(), Some("B"));
    let savings = rec.savings.expect("savings");
    assert!((savings - -50.0).abs() < 1e-9, "savings = {savings}");
}

#[test]
fn store_keeps_cheapest_offer_per_product_name() {
    let results = vec![
        vec![
            product("1", "Lait", "Casino", Some(260.0)),
            product("2", "Lait", "Casino", Some(240.0)),
            product("3", "Lait", "Casino", Some(250.0)),
        ],
        vec![product("4", "Pain", "Casino", Some(180.0))],
    ];

    let rec = aggregate_best_prices(&results);
    let casino = &rec.best_price_stores["Casino"];
    let ids: Vec<&str> = casino.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["2", "4"]);
    assert_eq!(rec.store_totals["Casino"], 420.0);
    assert_eq!(rec.savings, Some(0.0));
}

#[test]
fn unpriced_products_are_ignored() {
    let results = vec![
        vec![
            product("1", "Sel", "Géant", None),
            product("2", "Sel", "Leader", Some(90.0)),
        ],
        vec![product("3", "Poivre", "Géant", None)],
    ];

    let rec = aggregate_best_prices(&results);
    assert_eq!(rec.item_lowest_prices, vec![Some(90.0), None]);
    assert!((rec.best_total - 90.0).abs() < 1e-9);
    assert!(!rec.best_price_stores.contains_key("Géant"));
    assert_eq!(rec.cheapest_store.as_deref(), Some("Leader"));
}

#[test]
fn empty_input_has_no_savings() {
    let rec = aggregate_best_prices(&[Vec::new(), Vec::new()]);
    assert_eq!(rec.item_lowest_prices, vec![None, None]);
    assert_eq!(rec.best_total, 0.0);
    assert!(rec.best_price_stores.is_empty());
    assert_eq!(rec.cheapest_store, None);
    assert_eq!(rec.savings, None);
}

#[test]
fn cheapest_picks_skips_empty_and_unpriced_lists() {
    let results = vec![
        vec![
            product("1", "Riz", "A", Some(500.0)),
            product("2", "Riz", "B", Some(450.0)),
        ],
        Vec::new(),
        vec![product("3", "Thé", "A", None)],
    ];

    let picks = cheapest_picks(&results);
    let ids: Vec<&str> = picks.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["2"]);
}
