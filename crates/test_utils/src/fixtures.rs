//! Pre-built Test Fixtures
//!
//! Provides ready-to-use rules, transactions and plan documents for the
//! compensation engine. These fixtures are consistent and predictable so
//! expected payouts can be worked out by hand.

use domain_compensation::{
    Allocation, BaseQuantity, Condition, MetricName, OverridePayee, PeriodPayee, RateType, Rule, RuleKind,
    Tier, TierMode,
};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

/// Fixture for identifiers and other string data
pub struct StringFixtures;

impl StringFixtures {
    pub const PRODUCER: &'static str = "Producer";
    pub const MANAGER: &'static str = "Manager";

    pub fn plan_id() -> &'static str {
        "PLAN-2024"
    }

    pub fn policy_id() -> &'static str {
        "POL-001"
    }

    /// Standard written date (March 2024)
    pub fn written_date() -> &'static str {
        "2024-03-15"
    }

    /// Period key matching `written_date`
    pub fn period_key() -> &'static str {
        "2024-03"
    }
}

/// Fixture for rules
pub struct RuleFixtures;

impl RuleFixtures {
    /// Percent of each participant's credited commissionable premium
    pub fn participant_rate(id: &str, value: Decimal) -> Rule {
        Rule::new(
            id,
            "Base Commission",
            RuleKind::ParticipantRate {
                base: BaseQuantity::CommissionablePremiumCredit,
                rate: RateType::Percent,
                value,
            },
        )
    }

    /// 10% to Producers on credited commissionable premium
    pub fn producer_commission() -> Rule {
        Self::participant_rate("producer-commission", dec!(0.10))
            .with_condition(Condition::eq("participant.role", StringFixtures::PRODUCER))
    }

    /// Override on Producer-credited premium paid to a role
    pub fn role_override(id: &str, role: &str, value: Decimal, allocation: Allocation) -> Rule {
        Rule::new(
            id,
            "Manager Override",
            RuleKind::OverrideRate {
                base: BaseQuantity::CommissionablePremiumCredit,
                rate: RateType::Percent,
                value,
                source_condition: Some(Condition::eq("participant.role", StringFixtures::PRODUCER)),
                payee: OverridePayee::Role { role: role.to_string() },
                allocation,
                payee_condition: None,
            },
        )
    }

    /// Override paid to a single named person
    pub fn person_override(id: &str, rep_id: &str, value: Decimal) -> Rule {
        Rule::new(
            id,
            "Person Override",
            RuleKind::OverrideRate {
                base: BaseQuantity::CommissionablePremiumCredit,
                rate: RateType::Percent,
                value,
                source_condition: None,
                payee: OverridePayee::Person { rep_id: rep_id.into() },
                allocation: Allocation::Equal,
                payee_condition: None,
            },
        )
    }

    /// 0% to 10k, 1% to 25k, 2% above
    pub fn standard_tiers() -> Vec<Tier> {
        vec![
            Tier::new(Some(dec!(10000)), dec!(0.00)),
            Tier::new(Some(dec!(25000)), dec!(0.01)),
            Tier::new(None, dec!(0.02)),
        ]
    }

    /// Tiered rule over total premium for everyone
    pub fn tiered(id: &str, mode: TierMode) -> Rule {
        Rule::new(
            id,
            "Production Tiers",
            RuleKind::TieredRatePeriod {
                metric: MetricName::TotalPremium,
                mode,
                tiers: Self::standard_tiers(),
                payee: PeriodPayee::All,
            },
        )
    }

    /// Flat bonus once a metric reaches a threshold
    pub fn bonus(id: &str, metric: MetricName, threshold: Decimal, bonus: Decimal, payee: PeriodPayee) -> Rule {
        Rule::new(
            id,
            "Production Bonus",
            RuleKind::BonusThresholdPeriod { metric, threshold, bonus, payee },
        )
    }

    /// Cap for everyone
    pub fn cap_all(id: &str, cap_amount: Decimal) -> Rule {
        Rule::new(
            id,
            "Payout Cap",
            RuleKind::CapPeriod { cap_amount, applies_to: PeriodPayee::All },
        )
    }
}

static SAMPLE_PLAN: Lazy<Value> = Lazy::new(|| {
    json!({
        "id": "PLAN-2024",
        "name": "Agency Compensation 2024",
        "currency": "USD",
        "period": { "dateField": "writtenDate", "granularity": "month" },
        "rules": [
            {
                "id": "nb-commission",
                "name": "New Business Commission",
                "type": "participantRate",
                "priority": 1,
                "condition": { "op": "and", "conditions": [
                    { "op": "eq", "field": "participant.role", "value": "Producer" },
                    { "op": "eq", "field": "transaction.type", "value": "NEW" }
                ]},
                "base": "commissionablePremiumCredit",
                "rate": "percent",
                "value": 0.10
            },
            {
                "id": "rn-commission",
                "name": "Renewal Commission",
                "type": "participantRate",
                "priority": 2,
                "condition": { "op": "eq", "field": "transaction.type", "value": "RENEWAL" },
                "base": "commissionablePremiumCredit",
                "rate": "percent",
                "value": 0.05
            },
            {
                "id": "manager-override",
                "name": "Manager Override",
                "type": "overrideRate",
                "priority": 3,
                "base": "commissionablePremiumCredit",
                "value": 0.02,
                "sourceCondition": { "op": "eq", "field": "participant.role", "value": "Producer" },
                "payee": { "kind": "role", "role": "Manager" },
                "allocation": "equal"
            },
            {
                "id": "nb-tiers",
                "name": "NB Production Tiers",
                "type": "tieredRatePeriod",
                "metric": "nbPremium",
                "mode": "progressive",
                "tiers": [
                    { "upTo": 10000, "value": 0.00 },
                    { "upTo": 25000, "value": 0.01 },
                    { "upTo": null, "value": 0.02 }
                ],
                "payee": { "kind": "role", "role": "Producer" }
            },
            {
                "id": "policy-bonus",
                "name": "Five Policy Bonus",
                "type": "bonusThresholdPeriod",
                "metric": "nbPolicyCount",
                "threshold": 5,
                "bonus": 250,
                "payee": { "kind": "all" }
            },
            {
                "id": "monthly-cap",
                "name": "Monthly Cap",
                "type": "capPeriod",
                "capAmount": 5000,
                "appliesTo": { "kind": "all" }
            }
        ]
    })
});

static SAMPLE_TRANSACTIONS: Lazy<Value> = Lazy::new(|| {
    json!([
        {
            "id": "TX-1", "policyId": "POL-001", "type": "NEW",
            "lineOfBusiness": "AUTO", "state": "TX",
            "writtenDate": "2024-03-04",
            "premiumDelta": 12000,
            "participants": [
                { "repId": "rep-1", "name": "Avery", "role": "Producer", "creditPercent": 100 },
                { "repId": "mgr-1", "name": "Jordan", "role": "Manager", "creditPercent": 0 }
            ]
        },
        {
            "id": "TX-2", "policyId": "POL-002", "type": "RENEWAL",
            "writtenDate": "2024-03-18",
            "premiumDelta": "4000", "commissionablePremiumDelta": 3000,
            "participants": [
                { "repId": "rep-1", "role": "Producer", "creditPercent": 50 },
                { "repId": "rep-2", "name": "Casey", "role": "Producer", "creditPercent": 50 }
            ]
        },
        {
            "id": "TX-3", "policyId": "POL-003", "type": "NEW",
            "writtenDate": "2024-04-02",
            "premiumDelta": 9000,
            "participants": [
                { "repId": "rep-2", "role": "Producer", "creditPercent": 100 }
            ]
        }
    ])
});

/// Fixture for JSON documents
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// A plan using every rule type
    pub fn sample_plan() -> Value {
        SAMPLE_PLAN.clone()
    }

    /// Three transactions: two in March 2024, one in April
    pub fn sample_transactions() -> Value {
        SAMPLE_TRANSACTIONS.clone()
    }
}
