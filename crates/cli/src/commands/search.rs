use pricedrop_core::catalog::{self, MarketplaceFilter, SearchFilters, SortKey};

use crate::commands::CommandResult;

pub fn run(query: &str, marketplace: Option<&str>, sort: Option<&str>) -> CommandResult {
    let filters = SearchFilters {
        marketplace: MarketplaceFilter::parse(marketplace.unwrap_or("all")),
        sort: SortKey::parse(sort.unwrap_or("relevance")),
        ..SearchFilters::default()
    };

    let page = catalog::search(query, &filters, 0, 0);
    let rows: Vec<serde_json::Value> = page
        .items
        .iter()
        .map(|product| {
            serde_json::json!({
                "id": product.id.0,
                "name": product.name,
                "marketplace": product.marketplace.as_str(),
                "price": product.price.to_string(),
                "discount_pct": product.discount_pct,
                "rating": product.rating,
            })
        })
        .collect();

    let payload = serde_json::json!({ "query": query, "total": page.total, "results": rows });
    match serde_json::to_string_pretty(&payload) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(error) => CommandResult::failure("search", "serialization", error.to_string(), 1),
    }
}

#[cfg(test)]
mod tests {
    use super::run;

    #[test]
    fn search_emits_matching_rows() {
        let result = run("headphones", None, Some("price_low"));
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("Sony"));
    }

    #[test]
    fn unmatched_query_reports_zero_total() {
        let result = run("no-such-product-anywhere", None, None);
        assert_eq!(result.exit_code, 0);
        assert!(result.output.contains("\"total\": 0"));
    }
}
