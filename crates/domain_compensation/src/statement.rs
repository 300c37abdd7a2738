//! Statement results and audit traces

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use core_kernel::{add_cents, round_cents, CurrencyCode, PeriodKey, PolicyId, RepId, RuleId, TransactionId};

use crate::metrics::PersonMetrics;
use crate::plan::RuleType;
use crate::transaction::TransactionType;

/// Stage at which a rule was applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraceStage {
    Transaction,
    Period,
}

/// One rule application to one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub stage: TraceStage,
    pub rule_id: RuleId,
    pub rule_name: String,
    pub rule_type: RuleType,
    pub rep_id: RepId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<PolicyId>,
    /// Quantity the rule measured (base, metric value, or pre-cap payout)
    pub base: Decimal,
    pub delta: Decimal,
    #[serde(default)]
    pub details: BTreeMap<String, Value>,
}

/// Running result for one person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonResult {
    pub rep_id: RepId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Roles the person held on in-period transactions, first seen first
    #[serde(default)]
    pub roles: Vec<String>,
    pub payout: Decimal,
    #[serde(default)]
    pub rule_totals: BTreeMap<RuleId, Decimal>,
    #[serde(default)]
    pub traces: Vec<Trace>,
    #[serde(default)]
    pub metrics: PersonMetrics,
}

impl PersonResult {
    pub fn new(rep_id: RepId) -> Self {
        Self {
            rep_id,
            name: None,
            roles: Vec::new(),
            payout: round_cents(Decimal::ZERO),
            rule_totals: BTreeMap::new(),
            traces: Vec::new(),
            metrics: PersonMetrics::default(),
        }
    }

    /// Returns true if the person held the role on any in-period transaction
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    /// Applies a traced delta to the running totals
    pub(crate) fn apply(&mut self, trace: Trace) {
        self.payout = add_cents(self.payout, trace.delta);
        let total = self.rule_totals.entry(trace.rule_id.clone()).or_insert(Decimal::ZERO);
        *total = add_cents(*total, trace.delta);
        self.traces.push(trace);
    }

    /// Returns the traces a single rule produced for this person
    pub fn traces_for_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a Trace> + 'a {
        self.traces.iter().filter(move |t| t.rule_id.as_str() == rule_id)
    }
}

/// Per-transaction roll-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSummary {
    pub transaction_id: TransactionId,
    pub policy_id: PolicyId,
    pub transaction_type: TransactionType,
    pub premium_delta: Decimal,
    pub commissionable_premium_delta: Decimal,
    /// Money each person earned from this transaction alone
    #[serde(default)]
    pub deltas_by_person: BTreeMap<RepId, Decimal>,
}

impl TransactionSummary {
    pub(crate) fn record(&mut self, rep_id: &RepId, delta: Decimal) {
        let total = self.deltas_by_person.entry(rep_id.clone()).or_insert(Decimal::ZERO);
        *total = add_cents(*total, delta);
    }
}

/// A rolled-up commission statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statement {
    pub period_key: PeriodKey,
    pub currency: CurrencyCode,
    /// People sorted by payout, highest first
    pub people: Vec<PersonResult>,
    pub transactions: Vec<TransactionSummary>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Statement {
    /// Finds a person's result
    pub fn person(&self, rep_id: &str) -> Option<&PersonResult> {
        self.people.iter().find(|p| p.rep_id.as_str() == rep_id)
    }

    /// Returns a person's payout, or zero if they are not on the statement
    pub fn payout(&self, rep_id: &str) -> Decimal {
        self.person(rep_id).map_or(Decimal::ZERO, |p| p.payout)
    }

    /// Sum of every person's payout
    pub fn total_payout(&self) -> Decimal {
        self.people.iter().fold(Decimal::ZERO, |acc, p| add_cents(acc, p.payout))
    }

    /// Cross-person totals per rule
    pub fn rule_totals(&self) -> BTreeMap<RuleId, Decimal> {
        let mut totals: BTreeMap<RuleId, Decimal> = BTreeMap::new();
        for person in &self.people {
            for (rule_id, amount) in &person.rule_totals {
                let total = totals.entry(rule_id.clone()).or_insert(Decimal::ZERO);
                *total = add_cents(*total, *amount);
            }
        }
        totals
    }

    /// Finds a transaction summary
    pub fn transaction(&self, transaction_id: &str) -> Option<&TransactionSummary> {
        self.transactions.iter().find(|t| t.transaction_id.as_str() == transaction_id)
    }
}
