//! The fixed product catalog.
//!
//! Catalog entries are immutable reference data loaded once per process.
//! Search is a case-insensitive substring match over name and description,
//! with marketplace/shipping/discount filters and a handful of sort keys.

use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{Marketplace, Product, ProductId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MarketplaceFilter {
    #[default]
    All,
    Only(Marketplace),
}

impl MarketplaceFilter {
    /// Lenient query-param parse: blank, `all`, or an unknown name select
    /// every marketplace rather than failing the request.
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<Marketplace>() {
            Ok(marketplace) => Self::Only(marketplace),
            Err(_) => Self::All,
        }
    }

    fn matches(&self, marketplace: Marketplace) -> bool {
        match self {
            Self::All => true,
            Self::Only(only) => *only == marketplace,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevance,
    PriceLow,
    PriceHigh,
    Discount,
    Delivery,
}

impl SortKey {
    /// Lenient query-param parse; unknown keys fall back to relevance.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "price_low" => Self::PriceLow,
            "price_high" => Self::PriceHigh,
            "discount" => Self::Discount,
            "delivery" => Self::Delivery,
            _ => Self::Relevance,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::PriceLow => "price_low",
            Self::PriceHigh => "price_high",
            Self::Discount => "discount",
            Self::Delivery => "delivery",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub marketplace: MarketplaceFilter,
    pub free_shipping_only: bool,
    pub discount_only: bool,
    pub sort: SortKey,
}

/// One page of search results plus the total match count.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SearchPage {
    pub items: Vec<Product>,
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

pub fn all() -> &'static [Product] {
    static CATALOG: OnceLock<Vec<Product>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

pub fn get(id: &ProductId) -> Option<&'static Product> {
    all().iter().find(|product| &product.id == id)
}

/// Substring search over name and description, filtered and sorted, with
/// offset/limit pagination. Relevance keeps catalog order.
pub fn search(query: &str, filters: &SearchFilters, offset: usize, limit: usize) -> SearchPage {
    let needle = query.trim().to_lowercase();

    let mut matches: Vec<Product> = all()
        .iter()
        .filter(|product| {
            product.name.to_lowercase().contains(&needle)
                || product.description.to_lowercase().contains(&needle)
        })
        .filter(|product| filters.marketplace.matches(product.marketplace))
        .filter(|product| !filters.free_shipping_only || product.free_shipping)
        .filter(|product| !filters.discount_only || product.discount_pct > 0)
        .cloned()
        .collect();

    match filters.sort {
        SortKey::Relevance => {}
        SortKey::PriceLow => matches.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceHigh => matches.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::Discount => matches.sort_by(|a, b| b.discount_pct.cmp(&a.discount_pct)),
        SortKey::Delivery => matches.sort_by(|a, b| a.delivery_days.cmp(&b.delivery_days)),
    }

    let total = matches.len();
    let limit = if limit == 0 { total } else { limit };
    let items: Vec<Product> = matches.into_iter().skip(offset).take(limit).collect();

    SearchPage { items, total, offset, limit }
}

#[allow(clippy::too_many_arguments)]
fn listing(
    id: &str,
    name: &str,
    marketplace: Marketplace,
    price_cents: i64,
    original_cents: i64,
    discount_pct: i32,
    rating: f64,
    review_count: u32,
    delivery_days: u32,
    free_shipping: bool,
    description: &str,
    image_url: &str,
    product_url: &str,
) -> Product {
    Product {
        id: ProductId(id.to_string()),
        name: name.to_string(),
        marketplace,
        price: Decimal::new(price_cents, 2),
        original_price: (original_cents > 0).then(|| Decimal::new(original_cents, 2)),
        discount_pct,
        rating,
        review_count,
        delivery_days,
        free_shipping,
        description: description.to_string(),
        image_url: image_url.to_string(),
        product_url: product_url.to_string(),
    }
}

fn build_catalog() -> Vec<Product> {
    vec![
        listing(
            "amz_001",
            "Sony WH-1000XM5 Wireless Noise Cancelling Headphones",
            Marketplace::Amazon,
            34800,
            39999,
            13,
            4.7,
            12_453,
            2,
            true,
            "Industry-leading noise cancellation with premium sound quality and 30-hour battery life.",
            "https://m.media-amazon.com/images/I/61vFO3CCBCL._AC_SL1500_.jpg",
            "https://www.amazon.com/Sony-WH-1000XM5-Canceling-Headphones-Hands-Free/dp/B09XS7JWHH",
        ),
        listing(
            "amz_ps5",
            "PlayStation 5 Console (PS5) - Digital Edition",
            Marketplace::Amazon,
            44999,
            49999,
            10,
            4.8,
            28_432,
            2,
            true,
            "Experience lightning-fast loading with ultra-high speed SSD, stunning graphics with 4K gaming, and immersive haptic feedback.",
            "https://m.media-amazon.com/images/I/51JqjP3KzWL._SL1024_.jpg",
            "https://www.amazon.com/PlayStation-5-Console/dp/B0BCNKKZ91",
        ),
        listing(
            "ebay_ps5",
            "Sony PlayStation 5 PS5 Disc Version Gaming Console",
            Marketplace::Ebay,
            47999,
            54999,
            13,
            4.7,
            5_421,
            4,
            false,
            "PS5 with disc drive - play both physical and digital games. Includes DualSense wireless controller.",
            "https://m.media-amazon.com/images/I/51JqjP3KzWL._SL1024_.jpg",
            "https://www.ebay.com/sch/i.html?_nkw=playstation+5+console",
        ),
        listing(
            "amz_desktop",
            "HP Desktop Computer, Intel Core i7, 16GB RAM, 512GB SSD",
            Marketplace::Amazon,
            64999,
            89999,
            28,
            4.5,
            3_245,
            3,
            true,
            "Powerful desktop computer with Intel Core i7 processor, 16GB RAM, 512GB SSD storage. Perfect for work and entertainment.",
            "https://m.media-amazon.com/images/I/71h-vHSRmJL._AC_SL1500_.jpg",
            "https://www.amazon.com/HP-Desktop-Computer-i7-Windows/dp/B0C1JK7PQP",
        ),
        listing(
            "ali_computer",
            "Gaming Desktop PC Computer Intel i5, 32GB RAM, RTX 3060",
            Marketplace::AliExpress,
            79999,
            129_999,
            38,
            4.6,
            1_876,
            15,
            true,
            "High-performance gaming computer with RGB lighting, Intel i5 processor, 32GB RAM, and NVIDIA RTX 3060 graphics card.",
            "https://m.media-amazon.com/images/I/71R7qZ3EJPL._AC_SL1500_.jpg",
            "https://www.aliexpress.com/w/wholesale-gaming-desktop-computer.html",
        ),
        listing(
            "ali_001",
            "Sony WH-1000XM4 Wireless Headphones (Similar)",
            Marketplace::AliExpress,
            28999,
            34999,
            17,
            4.5,
            3_421,
            15,
            true,
            "Premium wireless headphones with active noise cancellation. Great battery life and comfort for extended listening sessions.",
            "https://m.media-amazon.com/images/I/71o8Q5XJS5L._AC_SL1500_.jpg",
            "https://www.aliexpress.com/w/wholesale-sony-wireless-headphones.html",
        ),
        listing(
            "ebay_001",
            "Sony WH-1000XM5 Headphones - Certified Refurbished",
            Marketplace::Ebay,
            29999,
            39999,
            25,
            4.6,
            892,
            5,
            false,
            "Certified refurbished Sony headphones with 90-day warranty. Tested and verified to work like new.",
            "https://m.media-amazon.com/images/I/61vFO3XUFtL._AC_SL1500_.jpg",
            "https://www.ebay.com/sch/i.html?_nkw=Sony+WH-1000XM5+refurbished",
        ),
        listing(
            "amz_002",
            "Apple iPhone 15 Pro Max 256GB",
            Marketplace::Amazon,
            109_999,
            119_999,
            8,
            4.9,
            8_765,
            1,
            true,
            "Latest iPhone with A17 Pro chip, titanium design, and advanced camera system. 256GB storage.",
            "https://m.media-amazon.com/images/I/81SigpJN1KL._AC_SL1500_.jpg",
            "https://www.amazon.com/s?k=Apple+iPhone+15+Pro+Max+256GB",
        ),
        listing(
            "temu_001",
            "iPhone 15 Pro Max Case with Screen Protector",
            Marketplace::Temu,
            899,
            2999,
            70,
            4.2,
            5_432,
            10,
            true,
            "Protective case for iPhone 15 Pro Max with tempered glass screen protector included.",
            "https://m.media-amazon.com/images/I/71yzONA87BL._AC_SL1500_.jpg",
            "https://www.temu.com/search_result.html?search_key=iphone+15+pro+max+case",
        ),
        listing(
            "jumia_001",
            "Samsung Galaxy S24 Ultra 512GB",
            Marketplace::Jumia,
            104_999,
            129_999,
            19,
            4.7,
            2_341,
            3,
            true,
            "Premium Samsung flagship with S Pen, 200MP camera, and AI-powered features. 512GB storage.",
            "https://m.media-amazon.com/images/I/71lD7eGdW-L._AC_SL1500_.jpg",
            "https://www.jumia.com.ng/catalog/?q=Samsung+Galaxy+S24+Ultra",
        ),
        listing(
            "amz_003",
            "MacBook Air M3 15-inch 16GB 512GB",
            Marketplace::Amazon,
            144_999,
            159_999,
            9,
            4.9,
            4_521,
            2,
            true,
            "Latest MacBook Air with M3 chip. Perfect for professionals and students. All-day battery life.",
            "https://m.media-amazon.com/images/I/71f5Eu5lJNL._AC_SL1500_.jpg",
            "https://www.amazon.com/s?k=MacBook+Air+M3+15+inch",
        ),
        listing(
            "ali_002",
            "Mechanical Gaming Keyboard RGB Hot-Swappable",
            Marketplace::AliExpress,
            5999,
            12999,
            54,
            4.6,
            9_876,
            12,
            true,
            "Customizable mechanical keyboard with hot-swappable switches and RGB backlighting.",
            "https://m.media-amazon.com/images/I/61rthTT3+NL._AC_SL1500_.jpg",
            "https://www.aliexpress.com/w/wholesale-mechanical-gaming-keyboard-rgb.html",
        ),
        listing(
            "temu_002",
            "Wireless Gaming Mouse 16000 DPI RGB",
            Marketplace::Temu,
            1999,
            5999,
            67,
            4.3,
            6_754,
            8,
            true,
            "High-precision wireless gaming mouse with customizable DPI settings and RGB lighting.",
            "https://m.media-amazon.com/images/I/61MPEgAHshL._AC_SL1500_.jpg",
            "https://www.temu.com/search_result.html?search_key=wireless+gaming+mouse+rgb",
        ),
        listing(
            "ebay_002",
            "Dell UltraSharp 27\" 4K Monitor",
            Marketplace::Ebay,
            44999,
            69999,
            36,
            4.7,
            1_234,
            4,
            false,
            "Professional 4K monitor with excellent color accuracy. Perfect for creative work.",
            "https://m.media-amazon.com/images/I/81Y98yS+MYL._AC_SL1500_.jpg",
            "https://www.ebay.com/sch/i.html?_nkw=Dell+UltraSharp+27+4K+Monitor",
        ),
        listing(
            "amz_004",
            "Logitech MX Master 3S Wireless Mouse",
            Marketplace::Amazon,
            8999,
            9999,
            10,
            4.8,
            7_654,
            1,
            true,
            "Premium wireless mouse designed for productivity. Ergonomic design with customizable buttons.",
            "https://m.media-amazon.com/images/I/61ni3t1ryQL._AC_SL1500_.jpg",
            "https://www.amazon.com/s?k=Logitech+MX+Master+3S",
        ),
        listing(
            "jumia_002",
            "HP Pavilion Gaming Laptop RTX 4060 16GB",
            Marketplace::Jumia,
            89999,
            119_999,
            25,
            4.5,
            876,
            3,
            true,
            "Powerful gaming laptop with RTX 4060 graphics card. 16GB RAM and 512GB SSD.",
            "https://m.media-amazon.com/images/I/81bc8mA3nKL._AC_SL1500_.jpg",
            "https://www.jumia.com.ng/catalog/?q=HP+Pavilion+Gaming+Laptop",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_id_finds_catalog_entries() {
        let id = ProductId("amz_001".to_string());
        let product = get(&id).expect("catalog entry");
        assert_eq!(product.marketplace, Marketplace::Amazon);
        assert_eq!(product.price, Decimal::new(34800, 2));

        assert!(get(&ProductId("missing".to_string())).is_none());
    }

    #[test]
    fn search_matches_name_and_description_case_insensitively() {
        let page = search("HEADPHONES", &SearchFilters::default(), 0, 0);
        assert!(page.total >= 3);
        assert!(page.items.iter().all(|p| {
            p.name.to_lowercase().contains("headphones")
                || p.description.to_lowercase().contains("headphones")
        }));
    }

    #[test]
    fn empty_query_returns_whole_catalog() {
        let page = search("", &SearchFilters::default(), 0, 0);
        assert_eq!(page.total, all().len());
    }

    #[test]
    fn marketplace_and_shipping_filters_compose() {
        let filters = SearchFilters {
            marketplace: MarketplaceFilter::Only(Marketplace::Ebay),
            free_shipping_only: true,
            ..SearchFilters::default()
        };
        let page = search("", &filters, 0, 0);
        // Every eBay listing in the catalog charges for shipping.
        assert_eq!(page.total, 0);
    }

    #[test]
    fn sort_keys_order_results() {
        let low = search(
            "",
            &SearchFilters { sort: SortKey::PriceLow, ..SearchFilters::default() },
            0,
            0,
        );
        assert!(low.items.windows(2).all(|pair| pair[0].price <= pair[1].price));

        let discount = search(
            "",
            &SearchFilters { sort: SortKey::Discount, ..SearchFilters::default() },
            0,
            0,
        );
        assert!(discount
            .items
            .windows(2)
            .all(|pair| pair[0].discount_pct >= pair[1].discount_pct));

        let delivery = search(
            "",
            &SearchFilters { sort: SortKey::Delivery, ..SearchFilters::default() },
            0,
            0,
        );
        assert!(delivery
            .items
            .windows(2)
            .all(|pair| pair[0].delivery_days <= pair[1].delivery_days));
    }

    #[test]
    fn pagination_slices_without_losing_the_total() {
        let page = search("", &SearchFilters::default(), 2, 5);
        assert_eq!(page.total, all().len());
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.items[0].id, all()[2].id);
    }

    #[test]
    fn filter_parsers_are_lenient() {
        assert_eq!(MarketplaceFilter::parse("all"), MarketplaceFilter::All);
        assert_eq!(MarketplaceFilter::parse(""), MarketplaceFilter::All);
        assert_eq!(
            MarketplaceFilter::parse("temu"),
            MarketplaceFilter::Only(Marketplace::Temu)
        );
        assert_eq!(SortKey::parse("price_high"), SortKey::PriceHigh);
        assert_eq!(SortKey::parse("bogus"), SortKey::Relevance);
    }
}
