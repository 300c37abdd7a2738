//! Statement calculation
//!
//! Runs a plan over a batch of transactions as a fixed linear pipeline:
//!
//! ```text
//! partition rules -> select period -> register people
//!   -> transaction rules -> aggregate metrics -> period rules -> caps
//!   -> finalize
//! ```
//!
//! Each stage completes before the next begins. The calculation is pure:
//! the same plan, transactions and options always produce an identical
//! statement, including trace order. Missing commissionable premium has
//! already been defaulted when the transactions were ingested.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, instrument, warn};

use core_kernel::{round_cents, CurrencyCode, PeriodKey, RepId, CENT_PLACES};

use crate::condition::{Condition, EvalContext};
use crate::metrics::{aggregate_metrics, MetricName};
use crate::plan::{Allocation, OverridePayee, PeriodPayee, Plan, Rule, RuleKind, RuleStage};
use crate::rates::{apply_rate, resolve_base};
use crate::statement::{PersonResult, Statement, Trace, TraceStage, TransactionSummary};
use crate::tiers::tiered_amount;
use crate::transaction::{Participant, Transaction};

/// Caller-supplied calculation options
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationOptions {
    /// Explicit period; inferred from the first transaction when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period_key: Option<PeriodKey>,
}

impl CalculationOptions {
    pub fn for_period(period_key: PeriodKey) -> Self {
        Self { period_key: Some(period_key) }
    }
}

/// Calculates a statement for a plan and a batch of transactions
///
/// Never fails: malformed per-record data contributes nothing, and override
/// rules that cannot find payees are reported in `Statement::warnings`.
#[instrument(skip_all, fields(plan_id = %plan.id, transactions = transactions.len()))]
pub fn calculate(plan: &Plan, transactions: &[Transaction], options: &CalculationOptions) -> Statement {
    let rules = RuleBuckets::partition(&plan.rules);
    debug!(
        transaction_rules = rules.transaction.len(),
        period_rules = rules.period.len(),
        cap_rules = rules.cap.len(),
        "Partitioned enabled rules"
    );

    let period_key = resolve_period_key(plan, transactions, options);
    let in_period: Vec<&Transaction> = transactions
        .iter()
        .filter(|t| period_key.contains(t.period_date(plan.period.date_field)))
        .collect();
    debug!(period_key = %period_key, in_period = in_period.len(), "Selected calculation period");

    let mut ledger = Ledger::default();
    for participant in in_period.iter().flat_map(|t| &t.participants) {
        ledger.register_participant(participant);
    }

    let mut summaries = Vec::with_capacity(in_period.len());
    for transaction in &in_period {
        let mut summary = TransactionSummary {
            transaction_id: transaction.id.clone(),
            policy_id: transaction.policy_id.clone(),
            transaction_type: transaction.transaction_type,
            premium_delta: transaction.premium_delta,
            commissionable_premium_delta: transaction.commissionable_premium_delta,
            deltas_by_person: BTreeMap::new(),
        };
        for rule in &rules.transaction {
            ledger.apply_transaction_rule(rule, transaction, &mut summary);
        }
        summaries.push(summary);
    }

    for (rep_id, metrics) in aggregate_metrics(in_period.iter().copied()) {
        let idx = ledger.register(&rep_id);
        ledger.people[idx].metrics = metrics;
    }

    for rule in &rules.period {
        ledger.apply_period_rule(rule);
    }
    for rule in &rules.cap {
        ledger.apply_cap_rule(rule);
    }

    let statement = ledger.finalize(period_key, plan.currency.clone(), summaries);
    debug!(
        people = statement.people.len(),
        warnings = statement.warnings.len(),
        "Statement calculated"
    );
    statement
}

/// Resolves the period a calculation covers
///
/// An explicit option wins; otherwise the month of the first transaction's
/// period date is used, falling back to `ALL`.
pub fn resolve_period_key(plan: &Plan, transactions: &[Transaction], options: &CalculationOptions) -> PeriodKey {
    options
        .period_key
        .or_else(|| {
            transactions
                .first()
                .and_then(|t| t.period_date(plan.period.date_field))
                .and_then(PeriodKey::from_date_str)
        })
        .unwrap_or(PeriodKey::All)
}

/// Enabled rules split by stage, each sorted by priority
struct RuleBuckets<'a> {
    transaction: Vec<&'a Rule>,
    period: Vec<&'a Rule>,
    cap: Vec<&'a Rule>,
}

impl<'a> RuleBuckets<'a> {
    fn partition(rules: &'a [Rule]) -> Self {
        let mut buckets = Self {
            transaction: Vec::new(),
            period: Vec::new(),
            cap: Vec::new(),
        };
        for rule in rules.iter().filter(|r| r.enabled) {
            match rule.kind.stage() {
                RuleStage::Transaction => buckets.transaction.push(rule),
                RuleStage::Period => buckets.period.push(rule),
                RuleStage::Cap => buckets.cap.push(rule),
            }
        }
        // sort_by_key is stable: equal priorities keep plan order
        for bucket in [&mut buckets.transaction, &mut buckets.period, &mut buckets.cap] {
            bucket.sort_by_key(|r| r.priority);
        }
        buckets
    }
}

/// A resolved override payee
struct Payee<'a> {
    rep_id: RepId,
    participant: Option<&'a Participant>,
}

/// Mutable accumulator for one calculation
///
/// People are kept in first-seen order with an id index, so every pass over
/// "all people" is deterministic.
#[derive(Default)]
struct Ledger {
    people: Vec<PersonResult>,
    index: HashMap<RepId, usize>,
    warnings: Vec<String>,
}

impl Ledger {
    fn register(&mut self, rep_id: &RepId) -> usize {
        if let Some(&idx) = self.index.get(rep_id) {
            return idx;
        }
        let idx = self.people.len();
        self.people.push(PersonResult::new(rep_id.clone()));
        self.index.insert(rep_id.clone(), idx);
        idx
    }

    fn register_participant(&mut self, participant: &Participant) {
        let idx = self.register(&participant.rep_id);
        let person = &mut self.people[idx];
        if person.name.is_none() {
            person.name = participant.name.clone();
        }
        if !participant.role.is_empty() && !person.has_role(&participant.role) {
            person.roles.push(participant.role.clone());
        }
    }

    fn credit(&mut self, trace: Trace) {
        let idx = self.register(&trace.rep_id);
        self.people[idx].apply(trace);
    }

    fn credit_transaction(&mut self, summary: &mut TransactionSummary, trace: Trace) {
        summary.record(&trace.rep_id, trace.delta);
        self.credit(trace);
    }

    fn apply_transaction_rule(&mut self, rule: &Rule, transaction: &Transaction, summary: &mut TransactionSummary) {
        match &rule.kind {
            RuleKind::ParticipantRate { base, rate, value } => {
                for participant in &transaction.participants {
                    if !rule.passes(&EvalContext::for_participant(transaction, participant)) {
                        continue;
                    }
                    let amount = resolve_base(*base, transaction, Some(participant));
                    let delta = apply_rate(*rate, amount, *value);
                    let details = BTreeMap::from([
                        ("baseQuantity".to_string(), json!(base.as_str())),
                        ("rateValue".to_string(), json!(value)),
                        ("creditPercent".to_string(), json!(participant.credit_percent)),
                    ]);
                    let trace = trace(rule, TraceStage::Transaction, participant.rep_id.clone(), Some(transaction), amount, delta, details);
                    self.credit_transaction(summary, trace);
                }
            }
            RuleKind::OverrideRate { .. } => self.apply_override(rule, transaction, summary),
            RuleKind::TieredRatePeriod { .. } | RuleKind::BonusThresholdPeriod { .. } | RuleKind::CapPeriod { .. } => {}
        }
    }

    fn apply_override(&mut self, rule: &Rule, transaction: &Transaction, summary: &mut TransactionSummary) {
        let RuleKind::OverrideRate { base, rate, value, source_condition, payee, allocation, payee_condition } = &rule.kind else {
            return;
        };
        if !rule.passes(&EvalContext::for_transaction(transaction)) {
            return;
        }

        let mut source_total = Decimal::ZERO;
        let mut sources = Vec::new();
        for participant in &transaction.participants {
            let ctx = EvalContext::for_participant(transaction, participant);
            if source_condition.as_ref().map_or(true, |c| c.evaluate(&ctx)) {
                source_total = source_total.saturating_add(resolve_base(*base, transaction, Some(participant)));
                sources.push(participant.rep_id.to_string());
            }
        }
        if source_total.is_zero() {
            return;
        }
        let pool = apply_rate(*rate, source_total, *value);

        let payees = resolve_override_payees(payee, payee_condition.as_ref(), transaction);
        if payees.is_empty() {
            warn!(rule_id = %rule.id, transaction_id = %transaction.id, "Override rule resolved no payees");
            self.warnings.push(format!(
                "Override rule '{}' ({}) found no payees on transaction {}",
                rule.name, rule.id, transaction.id
            ));
            return;
        }

        let shares = allocate(pool, &payees, *allocation);
        let payee_count = payees.len();
        for (payee, share) in payees.into_iter().zip(shares) {
            let details = BTreeMap::from([
                ("baseQuantity".to_string(), json!(base.as_str())),
                ("rateValue".to_string(), json!(value)),
                ("pool".to_string(), json!(pool)),
                ("sourceRepIds".to_string(), json!(sources)),
                ("allocation".to_string(), json!(allocation)),
                ("payeeCount".to_string(), json!(payee_count)),
            ]);
            let trace = trace(rule, TraceStage::Transaction, payee.rep_id, Some(transaction), source_total, share, details);
            self.credit_transaction(summary, trace);
        }
    }

    fn period_payees(&mut self, payee: &PeriodPayee) -> Vec<usize> {
        match payee {
            PeriodPayee::Person { rep_id } if rep_id.is_blank() => Vec::new(),
            PeriodPayee::Person { rep_id } => vec![self.register(rep_id)],
            PeriodPayee::Role { role } => (0..self.people.len())
                .filter(|&idx| self.people[idx].has_role(role))
                .collect(),
            PeriodPayee::All => (0..self.people.len()).collect(),
        }
    }

    /// Returns the person's metric if the rule's condition passes on their metrics
    fn gated_metric(&self, idx: usize, rule: &Rule, metric: MetricName) -> Option<Decimal> {
        let metrics = &self.people[idx].metrics;
        rule.passes(&EvalContext::for_metrics(metrics)).then(|| metrics.value(metric))
    }

    fn apply_period_rule(&mut self, rule: &Rule) {
        match &rule.kind {
            RuleKind::TieredRatePeriod { metric, mode, tiers, payee } => {
                for idx in self.period_payees(payee) {
                    let Some(metric_value) = self.gated_metric(idx, rule, *metric) else {
                        continue;
                    };
                    if metric_value <= Decimal::ZERO {
                        continue;
                    }
                    let amount = tiered_amount(metric_value, tiers, *mode);
                    let details = BTreeMap::from([
                        ("metric".to_string(), json!(metric.as_str())),
                        ("mode".to_string(), json!(mode)),
                        ("tierCount".to_string(), json!(tiers.len())),
                    ]);
                    let rep_id = self.people[idx].rep_id.clone();
                    self.people[idx].apply(trace(rule, TraceStage::Period, rep_id, None, metric_value, amount, details));
                }
            }
            RuleKind::BonusThresholdPeriod { metric, threshold, bonus, payee } => {
                for idx in self.period_payees(payee) {
                    let Some(metric_value) = self.gated_metric(idx, rule, *metric) else {
                        continue;
                    };
                    if metric_value < *threshold {
                        continue;
                    }
                    let details = BTreeMap::from([
                        ("metric".to_string(), json!(metric.as_str())),
                        ("threshold".to_string(), json!(threshold)),
                    ]);
                    let rep_id = self.people[idx].rep_id.clone();
                    self.people[idx].apply(trace(rule, TraceStage::Period, rep_id, None, metric_value, *bonus, details));
                }
            }
            RuleKind::ParticipantRate { .. } | RuleKind::OverrideRate { .. } | RuleKind::CapPeriod { .. } => {}
        }
    }

    fn apply_cap_rule(&mut self, rule: &Rule) {
        match &rule.kind {
            RuleKind::CapPeriod { cap_amount, applies_to } => {
                for idx in self.period_payees(applies_to) {
                    let person = &self.people[idx];
                    if !rule.passes(&EvalContext::for_metrics(&person.metrics)) || person.payout <= *cap_amount {
                        continue;
                    }
                    let pre_cap = person.payout;
                    let details = BTreeMap::from([
                        ("capAmount".to_string(), json!(cap_amount)),
                        ("preCapPayout".to_string(), json!(pre_cap)),
                    ]);
                    let rep_id = person.rep_id.clone();
                    // floor to cents so rounding the payout cannot land above the cap
                    let target = cap_amount.round_dp_with_strategy(CENT_PLACES, RoundingStrategy::ToNegativeInfinity);
                    let delta = target.saturating_sub(pre_cap);
                    self.people[idx].apply(trace(rule, TraceStage::Period, rep_id, None, pre_cap, delta, details));
                }
            }
            RuleKind::ParticipantRate { .. }
            | RuleKind::OverrideRate { .. }
            | RuleKind::TieredRatePeriod { .. }
            | RuleKind::BonusThresholdPeriod { .. } => {}
        }
    }

    fn finalize(mut self, period_key: PeriodKey, currency: CurrencyCode, transactions: Vec<TransactionSummary>) -> Statement {
        for person in &mut self.people {
            person.payout = round_cents(person.payout);
            person.metrics = person.metrics.rounded();
        }
        // Stable: equal payouts keep first-seen order
        self.people.sort_by(|a, b| b.payout.cmp(&a.payout));

        Statement {
            period_key,
            currency,
            people: self.people,
            transactions,
            warnings: self.warnings,
        }
    }
}

fn resolve_override_payees<'a>(
    payee: &OverridePayee,
    payee_condition: Option<&Condition>,
    transaction: &'a Transaction,
) -> Vec<Payee<'a>> {
    match payee {
        OverridePayee::Person { rep_id } | OverridePayee::Agency { agency_id: rep_id } => {
            if rep_id.is_blank() {
                return Vec::new();
            }
            vec![Payee {
                rep_id: rep_id.clone(),
                participant: transaction.participant(rep_id),
            }]
        }
        OverridePayee::Role { role } => transaction
            .participants
            .iter()
            .filter(|p| &p.role == role)
            .filter(|p| payee_condition.map_or(true, |c| c.evaluate(&EvalContext::for_participant(transaction, p))))
            .map(|p| Payee {
                rep_id: p.rep_id.clone(),
                participant: Some(p),
            })
            .collect(),
    }
}

/// Splits a pool across payees; weighted splits fall back to equal shares
/// when the weights sum to zero
fn allocate(pool: Decimal, payees: &[Payee<'_>], allocation: Allocation) -> Vec<Decimal> {
    let equal = || {
        let share = pool / Decimal::from(payees.len());
        vec![share; payees.len()]
    };
    match allocation {
        Allocation::Equal => equal(),
        Allocation::CreditWeighted => {
            let weights: Vec<Decimal> = payees
                .iter()
                .map(|p| p.participant.map_or(Decimal::ZERO, |p| p.credit_percent))
                .collect();
            let total = weights.iter().fold(Decimal::ZERO, |acc, w| acc.saturating_add(*w));
            if total.is_zero() {
                return equal();
            }
            weights
                .into_iter()
                .map(|w| pool.saturating_mul(w).checked_div(total).unwrap_or(Decimal::ZERO))
                .collect()
        }
    }
}

fn trace(
    rule: &Rule,
    stage: TraceStage,
    rep_id: RepId,
    transaction: Option<&Transaction>,
    base: Decimal,
    delta: Decimal,
    details: BTreeMap<String, Value>,
) -> Trace {
    Trace {
        stage,
        rule_id: rule.id.clone(),
        rule_name: rule.name.clone(),
        rule_type: rule.kind.rule_type(),
        rep_id,
        transaction_id: transaction.map(|t| t.id.clone()),
        policy_id: transaction.map(|t| t.policy_id.clone()),
        base,
        delta,
        details,
    }
}
