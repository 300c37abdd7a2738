//! Tiered rate calculations over a single metric

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::money::lenient;

use crate::rates::{apply_rate, RateType};

/// How tiers are applied to a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TierMode {
    /// The matching tier's rate applies to the whole metric
    Cliff,
    /// Each tier's rate applies only to the slice of the metric inside it
    Progressive,
}

/// One band of a tier table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tier {
    /// Inclusive upper bound; `None` is unbounded
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    pub up_to: Option<Decimal>,
    #[serde(default)]
    pub rate: RateType,
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub value: Decimal,
}

impl Tier {
    pub fn new(up_to: Option<Decimal>, value: Decimal) -> Self {
        Self { up_to, rate: RateType::Percent, value }
    }
}

/// Computes the tiered amount for a metric value
pub fn tiered_amount(metric_value: Decimal, tiers: &[Tier], mode: TierMode) -> Decimal {
    match mode {
        TierMode::Cliff => cliff_amount(metric_value, tiers),
        TierMode::Progressive => progressive_amount(metric_value, tiers),
    }
}

fn cliff_amount(metric_value: Decimal, tiers: &[Tier]) -> Decimal {
    let tier = tiers
        .iter()
        .find(|t| t.up_to.map_or(true, |cap| cap >= metric_value))
        .or_else(|| tiers.last());
    tier.map_or(Decimal::ZERO, |t| apply_rate(t.rate, metric_value, t.value))
}

fn progressive_amount(metric_value: Decimal, tiers: &[Tier]) -> Decimal {
    let mut total = Decimal::ZERO;
    let mut prev_cap = Decimal::ZERO;
    let mut remaining = metric_value;

    for tier in tiers {
        let room = match tier.up_to {
            Some(cap) => remaining.min(cap.saturating_sub(prev_cap)),
            None => remaining,
        };
        let slice = room.max(Decimal::ZERO);
        if slice <= Decimal::ZERO {
            break;
        }

        total = total.saturating_add(apply_rate(tier.rate, slice, tier.value));
        remaining -= slice;

        match tier.up_to {
            Some(cap) => prev_cap = cap,
            None => break,
        }
        if remaining <= Decimal::ZERO {
            break;
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ladder() -> Vec<Tier> {
        vec![
            Tier::new(Some(dec!(10000)), dec!(0.00)),
            Tier::new(Some(dec!(25000)), dec!(0.01)),
            Tier::new(None, dec!(0.02)),
        ]
    }

    #[test]
    fn test_progressive_slices() {
        assert_eq!(tiered_amount(dec!(30000), &ladder(), TierMode::Progressive), dec!(250));
    }

    #[test]
    fn test_cliff_applies_to_whole_value() {
        assert_eq!(tiered_amount(dec!(30000), &ladder(), TierMode::Cliff), dec!(600));
        assert_eq!(tiered_amount(dec!(25000), &ladder(), TierMode::Cliff), dec!(250));
    }

    #[test]
    fn test_cliff_falls_back_to_last_tier() {
        let bounded = vec![Tier::new(Some(dec!(100)), dec!(0.01)), Tier::new(Some(dec!(200)), dec!(0.02))];
        assert_eq!(tiered_amount(dec!(500), &bounded, TierMode::Cliff), dec!(10));
    }

    #[test]
    fn test_progressive_stops_when_tiers_exhausted() {
        let bounded = vec![Tier::new(Some(dec!(100)), dec!(0.10))];
        assert_eq!(tiered_amount(dec!(500), &bounded, TierMode::Progressive), dec!(10));
    }

    #[test]
    fn test_progressive_with_extreme_bounds() {
        let huge = Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0);
        let tiers = vec![Tier::new(Some(huge), dec!(0.01)), Tier::new(Some(-huge), dec!(0.02))];
        let metric = Decimal::from_i128_with_scale(60_000_000_000_000_000_000_000_000_000, 0);
        assert_eq!(tiered_amount(metric, &tiers, TierMode::Progressive), huge * dec!(0.01));
    }

    #[test]
    fn test_empty_tiers_yield_zero() {
        assert_eq!(tiered_amount(dec!(500), &[], TierMode::Cliff), dec!(0));
        assert_eq!(tiered_amount(dec!(500), &[], TierMode::Progressive), dec!(0));
    }
}
