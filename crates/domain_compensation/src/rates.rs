//! Base quantities and rate application
//!
//! A rate rule names the quantity it pays on (premium, commissionable
//! premium, or policy count; either the transaction total or the
//! participant's credited share) and a rate value to multiply it by.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::transaction::{Participant, Transaction};

/// The quantity a rate is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BaseQuantity {
    PremiumTotal,
    PremiumCredit,
    CommissionablePremiumTotal,
    CommissionablePremiumCredit,
    PolicyCountTotal,
    PolicyCountCredit,
}

impl BaseQuantity {
    pub fn as_str(&self) -> &'static str {
        match self {
            BaseQuantity::PremiumTotal => "premiumTotal",
            BaseQuantity::PremiumCredit => "premiumCredit",
            BaseQuantity::CommissionablePremiumTotal => "commissionablePremiumTotal",
            BaseQuantity::CommissionablePremiumCredit => "commissionablePremiumCredit",
            BaseQuantity::PolicyCountTotal => "policyCountTotal",
            BaseQuantity::PolicyCountCredit => "policyCountCredit",
        }
    }
}

/// How the author expressed a rate value
///
/// `Percent` values are fractions (0.10 for 10%) and `Fixed` values are
/// dollars per unit of base. Both multiply the base by the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RateType {
    #[default]
    Percent,
    Fixed,
}

/// Resolves a base quantity for a transaction
///
/// Credit quantities scale by the participant's credit share and are zero
/// when no participant is in scope.
pub fn resolve_base(base: BaseQuantity, transaction: &Transaction, participant: Option<&Participant>) -> Decimal {
    let credit_share = participant.map_or(Decimal::ZERO, Participant::credit_share);
    match base {
        BaseQuantity::PremiumTotal => transaction.premium_delta,
        BaseQuantity::PremiumCredit => transaction.premium_delta.saturating_mul(credit_share),
        BaseQuantity::CommissionablePremiumTotal => transaction.commissionable_premium_delta,
        BaseQuantity::CommissionablePremiumCredit => {
            transaction.commissionable_premium_delta.saturating_mul(credit_share)
        }
        BaseQuantity::PolicyCountTotal => Decimal::ONE,
        BaseQuantity::PolicyCountCredit => {
            if participant.is_some_and(Participant::has_credit) {
                Decimal::ONE
            } else {
                Decimal::ZERO
            }
        }
    }
}

/// Applies a rate to a base amount
pub fn apply_rate(rate: RateType, base: Decimal, value: Decimal) -> Decimal {
    match rate {
        RateType::Percent | RateType::Fixed => base.saturating_mul(value),
    }
}
