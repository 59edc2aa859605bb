pub mod advice;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod errors;
pub mod pricing;

pub use advice::{advise, assess, AdviceResult, BuySignal, TrustAssessment};
pub use catalog::{MarketplaceFilter, SearchFilters, SearchPage, SortKey};
pub use domain::deal::{rank_deals, Deal, RankedDeal};
pub use domain::product::{Marketplace, Product, ProductId};
pub use domain::watchlist::{NewWatchlistEntry, PricePoint, WatchlistEntry};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use pricing::HistoryPoint;
