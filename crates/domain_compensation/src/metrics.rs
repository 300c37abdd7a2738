//! Per-person production metrics
//!
//! Metrics accumulate each participant's credited commissionable premium and
//! policy counts over the in-period transactions, split into new business
//! (NB) and renewal (RN) buckets. Period rules pay on these metrics.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{add_cents, round_cents, RepId};

use crate::transaction::{Transaction, TransactionType};
use crate::value::FieldValue;

/// Metrics a period rule can measure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricName {
    NbPremium,
    RnPremium,
    TotalPremium,
    NbPolicyCount,
    RnPolicyCount,
    TotalPolicyCount,
}

impl MetricName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricName::NbPremium => "nbPremium",
            MetricName::RnPremium => "rnPremium",
            MetricName::TotalPremium => "totalPremium",
            MetricName::NbPolicyCount => "nbPolicyCount",
            MetricName::RnPolicyCount => "rnPolicyCount",
            MetricName::TotalPolicyCount => "totalPolicyCount",
        }
    }

    fn parse(name: &str) -> Option<Self> {
        match name {
            "nbPremium" => Some(MetricName::NbPremium),
            "rnPremium" => Some(MetricName::RnPremium),
            "totalPremium" => Some(MetricName::TotalPremium),
            "nbPolicyCount" => Some(MetricName::NbPolicyCount),
            "rnPolicyCount" => Some(MetricName::RnPolicyCount),
            "totalPolicyCount" => Some(MetricName::TotalPolicyCount),
            _ => None,
        }
    }
}

/// Accumulated production for one person
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonMetrics {
    pub nb_premium: Decimal,
    pub rn_premium: Decimal,
    pub total_premium: Decimal,
    pub nb_policy_count: u32,
    pub rn_policy_count: u32,
    pub total_policy_count: u32,
}

impl PersonMetrics {
    /// Returns a metric as a number
    pub fn value(&self, metric: MetricName) -> Decimal {
        match metric {
            MetricName::NbPremium => self.nb_premium,
            MetricName::RnPremium => self.rn_premium,
            MetricName::TotalPremium => self.total_premium,
            MetricName::NbPolicyCount => Decimal::from(self.nb_policy_count),
            MetricName::RnPolicyCount => Decimal::from(self.rn_policy_count),
            MetricName::TotalPolicyCount => Decimal::from(self.total_policy_count),
        }
    }

    /// Resolves a `metrics.*` path
    pub fn field(&self, segments: &[String]) -> FieldValue {
        match segments {
            [name] => MetricName::parse(name).map_or(FieldValue::Absent, |m| FieldValue::Number(self.value(m))),
            _ => FieldValue::Absent,
        }
    }

    /// Records one participant's credit on a transaction
    ///
    /// Counts only move when the participant has a positive credit share.
    pub fn record(&mut self, transaction_type: TransactionType, credited_premium: Decimal, has_credit: bool) {
        let count = u32::from(has_credit);
        match transaction_type {
            TransactionType::New => {
                self.nb_premium = add_cents(self.nb_premium, credited_premium);
                self.nb_policy_count = self.nb_policy_count.saturating_add(count);
            }
            TransactionType::Renewal => {
                self.rn_premium = add_cents(self.rn_premium, credited_premium);
                self.rn_policy_count = self.rn_policy_count.saturating_add(count);
            }
            TransactionType::Endorsement | TransactionType::Cancel | TransactionType::Reinstate => {}
        }
        self.total_premium = add_cents(self.total_premium, credited_premium);
        self.total_policy_count = self.total_policy_count.saturating_add(count);
    }

    /// Returns a copy with every premium rounded to cents
    pub fn rounded(&self) -> Self {
        Self {
            nb_premium: round_cents(self.nb_premium),
            rn_premium: round_cents(self.rn_premium),
            total_premium: round_cents(self.total_premium),
            ..self.clone()
        }
    }
}

/// Aggregates metrics for every participant on the given transactions
pub fn aggregate_metrics<'a, I>(transactions: I) -> BTreeMap<RepId, PersonMetrics>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut metrics: BTreeMap<RepId, PersonMetrics> = BTreeMap::new();
    for transaction in transactions {
        for participant in &transaction.participants {
            let credited = transaction
                .commissionable_premium_delta
                .saturating_mul(participant.credit_share());
            metrics
                .entry(participant.rep_id.clone())
                .or_default()
                .record(transaction.transaction_type, credited, participant.has_credit());
        }
    }
    metrics
}
