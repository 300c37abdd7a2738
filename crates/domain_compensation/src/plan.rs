//! Compensation plans and rules
//!
//! A plan is a declarative, versioned rule set. Rules are a closed set of
//! variants grouped into three execution stages:
//!
//! ```text
//! transaction stage:  participantRate, overrideRate   (per transaction)
//! period stage:       tieredRatePeriod, bonusThresholdPeriod  (per person)
//! cap stage:          capPeriod   (after everything else)
//! ```
//!
//! Within a stage, rules run in ascending `priority`; ties keep plan order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use core_kernel::money::lenient;
use core_kernel::{CurrencyCode, PlanId, RepId, RuleId};

use crate::condition::{Condition, EvalContext};
use crate::error::CompensationError;
use crate::metrics::MetricName;
use crate::rates::{BaseQuantity, RateType};
use crate::tiers::{Tier, TierMode};

/// Which transaction date places a transaction in a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateField {
    #[default]
    WrittenDate,
    EffectiveDate,
    PaidDate,
}

/// Period granularity; statements are monthly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Granularity {
    #[default]
    Month,
}

/// How a plan assigns transactions to periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSettings {
    #[serde(default)]
    pub date_field: DateField,
    #[serde(default)]
    pub granularity: Granularity,
}

/// A compensation plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub currency: CurrencyCode,
    #[serde(default, alias = "periodSettings")]
    pub period: PeriodSettings,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Plan {
    pub fn new(id: impl Into<PlanId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            currency: CurrencyCode::default(),
            period: PeriodSettings::default(),
            rules: Vec::new(),
        }
    }

    /// Adds a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Lists structural problems that make the plan unusable
    ///
    /// The engine itself tolerates all of these; this is for authoring tools
    /// and loaders that want to reject a plan before running it.
    pub fn validation_issues(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        if self.id.is_blank() {
            issues.push("plan id is blank".to_string());
        }

        for rule in &self.rules {
            if rule.id.is_blank() {
                issues.push(format!("rule '{}' has a blank id", rule.name));
            } else if !seen.insert(rule.id.as_str()) {
                issues.push(format!("duplicate rule id '{}'", rule.id));
            }

            match &rule.kind {
                RuleKind::TieredRatePeriod { tiers, .. } => {
                    if tiers.is_empty() {
                        issues.push(format!("rule '{}' has no tiers", rule.id));
                    }
                    if let Some(pos) = tiers.iter().position(|t| t.up_to.is_none()) {
                        if pos + 1 < tiers.len() {
                            issues.push(format!("rule '{}' has tiers after an unbounded tier", rule.id));
                        }
                    }
                    let bounds: Vec<Decimal> = tiers.iter().filter_map(|t| t.up_to).collect();
                    if bounds.windows(2).any(|w| w[0] >= w[1]) {
                        issues.push(format!("rule '{}' tier bounds are not ascending", rule.id));
                    }
                }
                RuleKind::CapPeriod { cap_amount, .. } if cap_amount.is_sign_negative() => {
                    issues.push(format!("rule '{}' has a negative cap amount", rule.id));
                }
                RuleKind::OverrideRate { payee: OverridePayee::Role { role }, .. } if role.trim().is_empty() => {
                    issues.push(format!("rule '{}' pays a blank role", rule.id));
                }
                _ => {}
            }
        }

        issues
    }

    /// Fails if the plan has any validation issues
    pub fn validate(&self) -> Result<(), CompensationError> {
        let issues = self.validation_issues();
        if issues.is_empty() {
            Ok(())
        } else {
            Err(CompensationError::InvalidPlan { issues })
        }
    }
}

/// A rule with its shared header fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: RuleId,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub priority: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    #[serde(flatten)]
    pub kind: RuleKind,
}

fn default_enabled() -> bool {
    true
}

impl Rule {
    /// Creates an enabled rule with priority 0 and no condition
    pub fn new(id: impl Into<RuleId>, name: impl Into<String>, kind: RuleKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            priority: 0,
            condition: None,
            kind,
        }
    }

    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Evaluates the rule's gate; rules without a condition always pass
    pub fn passes(&self, ctx: &EvalContext<'_>) -> bool {
        self.condition.as_ref().map_or(true, |c| c.evaluate(ctx))
    }
}

/// The rule variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RuleKind {
    /// Pays each qualifying participant a rate on their own base
    #[serde(rename_all = "camelCase")]
    ParticipantRate {
        base: BaseQuantity,
        #[serde(default)]
        rate: RateType,
        #[serde(default, deserialize_with = "lenient::decimal")]
        value: Decimal,
    },
    /// Pools a rate on source participants' base and pays it to payees
    #[serde(rename_all = "camelCase")]
    OverrideRate {
        base: BaseQuantity,
        #[serde(default)]
        rate: RateType,
        #[serde(default, deserialize_with = "lenient::decimal")]
        value: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_condition: Option<Condition>,
        payee: OverridePayee,
        #[serde(default)]
        allocation: Allocation,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        payee_condition: Option<Condition>,
    },
    /// Pays a tier table over a period metric
    #[serde(rename_all = "camelCase")]
    TieredRatePeriod {
        metric: MetricName,
        mode: TierMode,
        #[serde(default)]
        tiers: Vec<Tier>,
        payee: PeriodPayee,
    },
    /// Pays a flat bonus once a period metric reaches a threshold
    #[serde(rename_all = "camelCase")]
    BonusThresholdPeriod {
        metric: MetricName,
        #[serde(default, deserialize_with = "lenient::decimal")]
        threshold: Decimal,
        #[serde(default, deserialize_with = "lenient::decimal")]
        bonus: Decimal,
        payee: PeriodPayee,
    },
    /// Clamps total payout to a maximum
    #[serde(rename_all = "camelCase")]
    CapPeriod {
        #[serde(default, deserialize_with = "lenient::decimal")]
        cap_amount: Decimal,
        applies_to: PeriodPayee,
    },
}

/// Execution stage of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleStage {
    Transaction,
    Period,
    Cap,
}

/// Discriminant of a rule variant, as recorded on traces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleType {
    ParticipantRate,
    OverrideRate,
    TieredRatePeriod,
    BonusThresholdPeriod,
    CapPeriod,
}

impl RuleKind {
    pub fn rule_type(&self) -> RuleType {
        match self {
            RuleKind::ParticipantRate { .. } => RuleType::ParticipantRate,
            RuleKind::OverrideRate { .. } => RuleType::OverrideRate,
            RuleKind::TieredRatePeriod { .. } => RuleType::TieredRatePeriod,
            RuleKind::BonusThresholdPeriod { .. } => RuleType::BonusThresholdPeriod,
            RuleKind::CapPeriod { .. } => RuleType::CapPeriod,
        }
    }

    pub fn stage(&self) -> RuleStage {
        match self {
            RuleKind::ParticipantRate { .. } | RuleKind::OverrideRate { .. } => RuleStage::Transaction,
            RuleKind::TieredRatePeriod { .. } | RuleKind::BonusThresholdPeriod { .. } => RuleStage::Period,
            RuleKind::CapPeriod { .. } => RuleStage::Cap,
        }
    }
}

/// Who receives an override pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OverridePayee {
    #[serde(rename_all = "camelCase")]
    Person { rep_id: RepId },
    #[serde(rename_all = "camelCase")]
    Agency { agency_id: RepId },
    Role { role: String },
}

/// How an override pool is split across payees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Allocation {
    #[default]
    Equal,
    #[serde(alias = "byCreditPercent")]
    CreditWeighted,
}

/// Who a period or cap rule applies to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PeriodPayee {
    #[serde(rename_all = "camelCase")]
    Person { rep_id: RepId },
    Role { role: String },
    All,
}
