//! Local purchase-advice heuristics.
//!
//! Two engines live here. Buy advice walks a strict first-match ladder over
//! the price history (or falls back to discount buckets when history is too
//! thin). Review trust accumulates deltas from every rule that fires and
//! clamps the result. The two deliberately use different evaluation
//! policies; see DESIGN.md.

use rust_decimal::Decimal;
use serde::Serialize;

/// Window of most recent points used for the rolling average.
const RECENT_WINDOW: usize = 7;

pub const ADVICE_UNAVAILABLE: &str =
    "Unable to generate advice right now. Check back once pricing data refreshes.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuySignal {
    BestPriceEver,
    GreatDeal,
    GoodPrice,
    Wait,
    SlightlyHigh,
    FairPrice,
    AmazingDiscount,
    BigDiscount,
    GoodDiscount,
    ModestDiscount,
    CheckCompetitors,
}

impl BuySignal {
    pub fn message(&self) -> &'static str {
        match self {
            Self::BestPriceEver => {
                "Best price ever seen for this product. Strong buy signal."
            }
            Self::GreatDeal => "Great deal: more than 10% below the recent average.",
            Self::GoodPrice => "Good price, slightly below the recent average. Buy if you need it.",
            Self::Wait => "Price is well above the recent average. Waiting is likely to pay off.",
            Self::SlightlyHigh => {
                "Slightly above the recent average. A better price may come along."
            }
            Self::FairPrice => {
                "Fair price, right around the recent average. Buy if you need it now."
            }
            Self::AmazingDiscount => "Amazing discount: over 60% off the list price.",
            Self::BigDiscount => "Excellent discount: over 40% off the list price.",
            Self::GoodDiscount => "Good discount. This is a decent saving over the list price.",
            Self::ModestDiscount => "Modest discount. Worth it if you were buying anyway.",
            Self::CheckCompetitors => {
                "No meaningful discount. Check competing marketplaces before buying."
            }
        }
    }
}

/// Tagged advice outcome. The fallback is an explicit variant so callers
/// (and tests) can observe it instead of a silently swallowed failure.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AdviceResult {
    Advice { signal: BuySignal, message: String },
    Unavailable { message: String },
}

impl AdviceResult {
    fn from_signal(signal: BuySignal) -> Self {
        Self::Advice { signal, message: signal.message().to_string() }
    }

    fn unavailable() -> Self {
        Self::Unavailable { message: ADVICE_UNAVAILABLE.to_string() }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Advice { .. })
    }
}

/// Derive a buy recommendation from the price history, or from the listed
/// discount when fewer than two observations exist. Total over its input
/// domain: malformed prices produce `Unavailable`, never an error.
pub fn advise(current_price: Decimal, history: &[Decimal], discount_pct: i32) -> AdviceResult {
    if current_price <= Decimal::ZERO || history.iter().any(|price| *price <= Decimal::ZERO) {
        return AdviceResult::unavailable();
    }

    if history.len() < 2 {
        return AdviceResult::from_signal(discount_signal(discount_pct));
    }

    let recent = &history[history.len().saturating_sub(RECENT_WINDOW)..];
    let avg = recent.iter().copied().sum::<Decimal>() / Decimal::from(recent.len());
    let min = match history.iter().copied().min() {
        Some(min) => min,
        None => return AdviceResult::unavailable(),
    };

    // First match wins, strongest signal first.
    let signal = if current_price <= min {
        BuySignal::BestPriceEver
    } else if current_price < avg * Decimal::new(90, 2) {
        BuySignal::GreatDeal
    } else if current_price < avg {
        BuySignal::GoodPrice
    } else if current_price > avg * Decimal::new(115, 2) {
        BuySignal::Wait
    } else if current_price > avg * Decimal::new(105, 2) {
        BuySignal::SlightlyHigh
    } else {
        BuySignal::FairPrice
    };

    AdviceResult::from_signal(signal)
}

fn discount_signal(discount_pct: i32) -> BuySignal {
    if discount_pct > 60 {
        BuySignal::AmazingDiscount
    } else if discount_pct > 40 {
        BuySignal::BigDiscount
    } else if discount_pct > 20 {
        BuySignal::GoodDiscount
    } else if discount_pct > 0 {
        BuySignal::ModestDiscount
    } else {
        BuySignal::CheckCompetitors
    }
}

/// Heuristic confidence in a listing's reviews.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TrustAssessment {
    pub score: u8,
    pub flags: Vec<&'static str>,
    pub recommendation: &'static str,
}

const FLAG_FAKE_PATTERN: &str =
    "Unusually high rating across a large review volume, a common fake-review pattern";
const FLAG_FEW_REVIEWS: &str = "Very few reviews, not enough signal yet";
const FLAG_ESTABLISHED: &str = "Well-established listing with a deep review base";
const FLAG_REALISTIC_BAND: &str = "Rating sits in the realistic band for a popular product";
const FLAG_LOW_RATING: &str = "Low average rating";
const FLAG_MIDDLING_RATING: &str = "Middling average rating";
const FLAG_AUTHENTIC: &str =
    "Reviews appear authentic. Rating and review count are in the normal range.";
const FLAG_UNAVAILABLE: &str = "Review analysis unavailable for this listing";

const REC_TRUSTWORTHY: &str =
    "Reviews look trustworthy. Safe to factor them into the decision.";
const REC_MOSTLY_CREDIBLE: &str =
    "Mostly credible. Cross-check a few detailed reviews before relying on the average.";
const REC_CAUTION: &str = "Treat the reviews with caution and verify independently before buying.";

/// Score a listing's reviews on a 0-100 scale.
///
/// Rules are evaluated independently and their deltas accumulate; this is
/// not a first-match ladder. A non-finite rating yields a default-safe
/// neutral result rather than an error.
pub fn assess(rating: f64, review_count: u32) -> TrustAssessment {
    if !rating.is_finite() {
        return TrustAssessment {
            score: 50,
            flags: vec![FLAG_UNAVAILABLE],
            recommendation: REC_MOSTLY_CREDIBLE,
        };
    }
    let rating = rating.clamp(0.0, 5.0);

    let mut score: i32 = 100;
    let mut flags: Vec<&'static str> = Vec::new();

    if rating >= 4.8 && review_count > 1_000 {
        score -= 20;
        flags.push(FLAG_FAKE_PATTERN);
    }
    if review_count < 10 {
        score -= 15;
        flags.push(FLAG_FEW_REVIEWS);
    }
    if review_count > 5_000 {
        score += 10;
        flags.push(FLAG_ESTABLISHED);
    }
    if (4.2..=4.7).contains(&rating) && review_count >= 100 {
        score += 5;
        flags.push(FLAG_REALISTIC_BAND);
    }
    if rating < 3.5 {
        score -= 30;
        flags.push(FLAG_LOW_RATING);
    }
    if (3.5..4.0).contains(&rating) {
        score -= 10;
        flags.push(FLAG_MIDDLING_RATING);
    }

    if flags.is_empty() {
        flags.push(FLAG_AUTHENTIC);
    }

    let score = score.clamp(0, 100) as u8;
    let recommendation = if score >= 80 {
        REC_TRUSTWORTHY
    } else if score >= 60 {
        REC_MOSTLY_CREDIBLE
    } else {
        REC_CAUTION
    };

    TrustAssessment { score, flags, recommendation }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_history(price: i64, len: usize) -> Vec<Decimal> {
        vec![Decimal::new(price, 0); len]
    }

    #[test]
    fn price_at_or_below_all_time_minimum_is_best_price_ever() {
        let history = flat_history(100, 7);
        let result = advise(Decimal::new(85, 0), &history, 0);
        assert_eq!(
            result,
            AdviceResult::Advice {
                signal: BuySignal::BestPriceEver,
                message: BuySignal::BestPriceEver.message().to_string(),
            }
        );
    }

    #[test]
    fn ladder_is_first_match_over_the_recent_average() {
        // Average over the last 7 points is 100; the older cheap point only
        // affects the all-time minimum.
        let mut history = vec![Decimal::new(80, 0)];
        history.extend(flat_history(100, 7));

        let cases = [
            (85, BuySignal::GreatDeal),     // above min 80, below 90
            (95, BuySignal::GoodPrice),     // below avg
            (120, BuySignal::Wait),         // above 115
            (110, BuySignal::SlightlyHigh), // above 105
            (100, BuySignal::FairPrice),
        ];
        for (price, expected) in cases {
            match advise(Decimal::new(price, 0), &history, 0) {
                AdviceResult::Advice { signal, .. } => assert_eq!(signal, expected),
                AdviceResult::Unavailable { .. } => panic!("advice should be available"),
            }
        }
    }

    #[test]
    fn average_uses_at_most_the_last_seven_points() {
        // Two very low old points would drag a whole-history average down;
        // the window keeps the recent average at 100.
        let mut history = vec![Decimal::new(10, 0), Decimal::new(10, 0)];
        history.extend(flat_history(100, 7));

        match advise(Decimal::new(95, 0), &history, 0) {
            AdviceResult::Advice { signal, .. } => assert_eq!(signal, BuySignal::GoodPrice),
            AdviceResult::Unavailable { .. } => panic!("advice should be available"),
        }
    }

    #[test]
    fn thin_history_buckets_on_discount() {
        let cases = [
            (65, BuySignal::AmazingDiscount),
            (45, BuySignal::BigDiscount),
            (25, BuySignal::GoodDiscount),
            (10, BuySignal::ModestDiscount),
            (0, BuySignal::CheckCompetitors),
            (-5, BuySignal::CheckCompetitors),
        ];
        for (discount, expected) in cases {
            match advise(Decimal::new(50, 0), &[], discount) {
                AdviceResult::Advice { signal, .. } => assert_eq!(signal, expected),
                AdviceResult::Unavailable { .. } => panic!("advice should be available"),
            }
        }
    }

    #[test]
    fn malformed_prices_yield_the_tagged_fallback() {
        let fallback = advise(Decimal::ZERO, &[], 50);
        assert!(!fallback.is_available());

        let poisoned = advise(Decimal::new(100, 0), &[Decimal::new(-1, 0), Decimal::ONE], 0);
        assert_eq!(poisoned, AdviceResult::unavailable());
    }

    #[test]
    fn perfect_rating_with_huge_volume_nets_ninety() {
        let assessment = assess(5.0, 10_000);
        // Fake-pattern penalty (-20) and established bonus (+10) both fire.
        assert_eq!(assessment.score, 90);
        assert!(assessment.flags.contains(&FLAG_FAKE_PATTERN));
        assert!(assessment.flags.contains(&FLAG_ESTABLISHED));
        assert_eq!(assessment.recommendation, REC_TRUSTWORTHY);
    }

    #[test]
    fn unremarkable_listing_gets_the_neutral_flag() {
        let assessment = assess(4.1, 500);
        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.flags, vec![FLAG_AUTHENTIC]);
    }

    #[test]
    fn realistic_band_with_volume_earns_the_bonus() {
        let assessment = assess(4.5, 3_000);
        assert_eq!(assessment.score, 100); // 100 + 5, clamped
        assert!(assessment.flags.contains(&FLAG_REALISTIC_BAND));
    }

    #[test]
    fn low_rating_and_thin_reviews_accumulate_penalties() {
        let assessment = assess(3.0, 5);
        // -15 (few reviews) and -30 (low rating).
        assert_eq!(assessment.score, 55);
        assert_eq!(assessment.recommendation, REC_CAUTION);
    }

    #[test]
    fn middling_rating_takes_the_moderate_penalty() {
        let assessment = assess(3.7, 200);
        assert_eq!(assessment.score, 90);
        assert!(assessment.flags.contains(&FLAG_MIDDLING_RATING));
    }

    #[test]
    fn score_clamps_to_the_valid_range() {
        // Established bonus and realistic band together would reach 115.
        let capped = assess(4.5, 10_000);
        assert_eq!(capped.score, 100);
    }

    #[test]
    fn non_finite_rating_degrades_to_the_neutral_fallback() {
        let assessment = assess(f64::NAN, 100);
        assert_eq!(assessment.score, 50);
        assert_eq!(assessment.flags, vec![FLAG_UNAVAILABLE]);
    }
}
