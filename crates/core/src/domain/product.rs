use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub String);

impl std::fmt::Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Marketplaces the catalog simulates. Serialized with their storefront
/// spelling so templates and the JSON API can round-trip them verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Marketplace {
    #[serde(rename = "Amazon")]
    Amazon,
    #[serde(rename = "eBay")]
    Ebay,
    #[serde(rename = "AliExpress")]
    AliExpress,
    #[serde(rename = "Temu")]
    Temu,
    #[serde(rename = "Jumia")]
    Jumia,
}

impl Marketplace {
    pub const ALL: [Marketplace; 5] = [
        Marketplace::Amazon,
        Marketplace::Ebay,
        Marketplace::AliExpress,
        Marketplace::Temu,
        Marketplace::Jumia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Amazon => "Amazon",
            Self::Ebay => "eBay",
            Self::AliExpress => "AliExpress",
            Self::Temu => "Temu",
            Self::Jumia => "Jumia",
        }
    }
}

impl std::fmt::Display for Marketplace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Marketplace {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "amazon" => Ok(Self::Amazon),
            "ebay" => Ok(Self::Ebay),
            "aliexpress" => Ok(Self::AliExpress),
            "temu" => Ok(Self::Temu),
            "jumia" => Ok(Self::Jumia),
            other => Err(DomainError::UnknownMarketplace(other.to_string())),
        }
    }
}

/// A catalog listing. Catalog entries are immutable reference data; prices
/// change only through the watchlist's `current_price` snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub marketplace: Marketplace,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub discount_pct: i32,
    pub rating: f64,
    pub review_count: u32,
    pub delivery_days: u32,
    pub free_shipping: bool,
    pub description: String,
    pub image_url: String,
    pub product_url: String,
}

#[cfg(test)]
mod tests {
    use super::Marketplace;

    #[test]
    fn marketplace_parses_case_insensitively() {
        assert_eq!("AMAZON".parse::<Marketplace>().expect("parse"), Marketplace::Amazon);
        assert_eq!(" eBay ".parse::<Marketplace>().expect("parse"), Marketplace::Ebay);
        assert!("walmart".parse::<Marketplace>().is_err());
    }

    #[test]
    fn marketplace_display_matches_storefront_spelling() {
        assert_eq!(Marketplace::Ebay.to_string(), "eBay");
        assert_eq!(Marketplace::AliExpress.to_string(), "AliExpress");
    }
}
