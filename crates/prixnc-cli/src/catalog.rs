//! Catalog lookups printed as plain tables.

use prixnc_catalog::{PrixNcClient, SearchParams};
use prixnc_core::{AppConfig, Product, SortBy};

pub(crate) fn client(config: &AppConfig) -> anyhow::Result<PrixNcClient> {
    Ok(PrixNcClient::new(
        &config.catalog_base_url,
        config.catalog_timeout_secs,
        &config.user_agent,
        config.default_page_size,
    )?)
}

pub(crate) fn fmt_price(price: Option<f64>) -> String {
    price.map_or_else(|| "-".to_string(), |p| format!("{p:.0} XPF"))
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

pub(crate) fn print_products(products: &[Product]) {
    println!("{:<10}{:<42}{:<14}STORE", "ID", "NAME", "PRICE");
    for product in products {
        println!(
            "{:<10}{:<42}{:<14}{}",
            product.id,
            truncate(&product.name, 38),
            fmt_price(product.price),
            product.store.name
        );
    }
}

/// Prints one page of search results.
///
/// # Errors
///
/// Returns an error if the catalog request fails.
pub(crate) async fn run_search(
    config: &AppConfig,
    query: &str,
    page: u32,
    size: Option<u32>,
    sort: Option<SortBy>,
) -> anyhow::Result<()> {
    let client = client(config)?;
    let params = SearchParams::new(query)
        .with_page(page)
        .with_page_size(size.unwrap_or(client.default_page_size()))
        .with_sort(sort);

    let result = client.search(&params).await?;
    if result.products.is_empty() {
        println!("no products found for \"{query}\"");
        return Ok(());
    }

    print_products(&result.products);
    println!(
        "\npage {}/{} ({} results)",
        result.pagination.current_page + 1,
        result.pagination.total_pages.max(1),
        result.pagination.total_items
    );
    Ok(())
}

/// Prints a product's selling points, cheapest first as the catalog orders
/// them.
///
/// # Errors
///
/// Returns an error if the product cannot be resolved or has no selling
/// points.
pub(crate) async fn run_details(config: &AppConfig, id: &str, name: &str) -> anyhow::Result<()> {
    let details = client(config)?.get_details(id, name).await?;

    println!(
        "{} ({}): best price {}",
        details.product.name,
        details.product.id,
        fmt_price(details.product.price)
    );
    println!("{:<30}{:<14}{:<16}UPDATED", "STORE", "PRICE", "PER UNIT");
    for point in &details.selling_points {
        let per_unit = match (point.price_per_unit, point.unit_type.as_deref()) {
            (Some(p), Some(unit)) => format!("{p:.0}/{unit}"),
            (Some(p), None) => format!("{p:.0}"),
            _ => "-".to_string(),
        };
        println!(
            "{:<30}{:<14}{:<16}{}",
            truncate(&point.store_name, 28),
            fmt_price(point.price),
            per_unit,
            point.last_update.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}
