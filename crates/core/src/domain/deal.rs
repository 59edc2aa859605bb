use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::product::Marketplace;

/// A community-submitted deal from the seed feed. The feed supplies a base
/// upvote count; locally recorded upvotes are layered on top at render time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Deal {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub marketplace: Marketplace,
    pub price: Decimal,
    pub original_price: Decimal,
    pub discount_pct: i32,
    pub upvotes: i64,
    pub posted_by: String,
    pub url: String,
}

impl Deal {
    /// Parse the seed feed. The feed ships with the binary, so a parse
    /// failure is a packaging defect rather than a runtime condition.
    pub fn load_feed(raw: &str) -> Result<Vec<Deal>, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// A deal decorated with locally recorded upvotes, ready for display.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedDeal {
    #[serde(flatten)]
    pub deal: Deal,
    pub total_upvotes: i64,
    pub user_upvoted: bool,
}

/// Merge local upvote counts into the feed and sort by total upvotes,
/// highest first. Deals absent from `local_counts` keep their base count.
pub fn rank_deals(deals: &[Deal], local_counts: &HashMap<i64, i64>) -> Vec<RankedDeal> {
    let mut ranked: Vec<RankedDeal> = deals
        .iter()
        .map(|deal| {
            let local = local_counts.get(&deal.id).copied().unwrap_or(0);
            RankedDeal {
                deal: deal.clone(),
                total_upvotes: deal.upvotes + local,
                user_upvoted: local > 0,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.total_upvotes.cmp(&a.total_upvotes));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(id: i64, upvotes: i64) -> Deal {
        Deal {
            id,
            title: format!("Deal {id}"),
            description: String::new(),
            marketplace: Marketplace::Amazon,
            price: Decimal::new(999, 2),
            original_price: Decimal::new(1999, 2),
            discount_pct: 50,
            upvotes,
            posted_by: "tester".to_string(),
            url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn ranking_merges_local_counts_and_sorts_descending() {
        let deals = vec![deal(1, 5), deal(2, 3)];
        let mut local = HashMap::new();
        local.insert(2, 4);

        let ranked = rank_deals(&deals, &local);

        assert_eq!(ranked[0].deal.id, 2);
        assert_eq!(ranked[0].total_upvotes, 7);
        assert!(ranked[0].user_upvoted);
        assert_eq!(ranked[1].total_upvotes, 5);
        assert!(!ranked[1].user_upvoted);
    }

    #[test]
    fn feed_parses_from_json() {
        let raw = r#"[{
            "id": 1,
            "title": "Mechanical keyboard",
            "description": "Hot-swappable switches",
            "marketplace": "AliExpress",
            "price": "59.99",
            "original_price": "129.99",
            "discount_pct": 54,
            "upvotes": 120,
            "posted_by": "dealfinder",
            "url": "https://example.com/kb"
        }]"#;

        let deals = Deal::load_feed(raw).expect("feed should parse");
        assert_eq!(deals.len(), 1);
        assert_eq!(deals[0].marketplace, Marketplace::AliExpress);
    }
}
