//! Synthetic price-history generation.
//!
//! Products outside the watchlist have no recorded observations, so the
//! product page fabricates a plausible series: a baseline 10% above the
//! current price, daily noise, occasional flash-sale markdowns, and a
//! linear pull toward the price the listing shows today.

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::Serialize;

/// Fraction above the current price where the series starts.
const BASELINE_MARKUP: f64 = 0.10;
/// Half-width of the per-day uniform noise band.
const DAILY_NOISE: f64 = 0.05;
/// Chance that a given day carries an extra flash-sale markdown.
const FLASH_SALE_PROBABILITY: f64 = 0.15;
/// Flash-sale multiplier range: a 5% to 15% cut.
const FLASH_SALE_RANGE: std::ops::Range<f64> = 0.85..0.95;
/// Total linear decay applied across the series toward the current price.
const DECAY_TOWARD_CURRENT: f64 = 0.10;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Generate `days` daily points ending today, using a thread-local rng.
pub fn generate(current_price: Decimal, days: u32) -> Vec<HistoryPoint> {
    generate_with(current_price, days, &mut rand::thread_rng())
}

/// Generate with a caller-supplied rng so tests can seed the series.
///
/// The final point always equals `current_price` exactly, keeping the
/// series consistent with the price the listing displays. `days == 0`
/// yields an empty series; a non-positive price yields a flat series.
pub fn generate_with<R: Rng + ?Sized>(
    current_price: Decimal,
    days: u32,
    rng: &mut R,
) -> Vec<HistoryPoint> {
    let today = Utc::now().date_naive();
    let current = current_price.to_f64().unwrap_or(0.0);

    if current <= 0.0 {
        return (0..days)
            .map(|i| HistoryPoint { date: day_for(today, days, i), price: current_price })
            .collect();
    }

    let baseline = current * (1.0 + BASELINE_MARKUP);
    let mut series: Vec<HistoryPoint> = (0..days)
        .map(|i| {
            let mut price = baseline * (1.0 + rng.gen_range(-DAILY_NOISE..=DAILY_NOISE));
            if rng.gen_bool(FLASH_SALE_PROBABILITY) {
                price *= rng.gen_range(FLASH_SALE_RANGE);
            }
            price *= 1.0 - (f64::from(i) / f64::from(days)) * DECAY_TOWARD_CURRENT;
            HistoryPoint { date: day_for(today, days, i), price: round_price(price) }
        })
        .collect();

    if let Some(last) = series.last_mut() {
        last.price = current_price;
    }

    series
}

fn day_for(today: NaiveDate, days: u32, index: u32) -> NaiveDate {
    today - Duration::days(i64::from(days - 1 - index))
}

fn round_price(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default().round_dp(2)
}
