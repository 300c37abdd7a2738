//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for statements that give more
//! meaningful error messages than standard assertions.

use domain_compensation::{PersonResult, Statement, Trace};
use rust_decimal::Decimal;

/// Returns a person's result or panics listing who is on the statement
pub fn person<'a>(statement: &'a Statement, rep_id: &str) -> &'a PersonResult {
    statement.person(rep_id).unwrap_or_else(|| {
        let people: Vec<&str> = statement.people.iter().map(|p| p.rep_id.as_str()).collect();
        panic!("Expected {} on statement, found {:?}", rep_id, people)
    })
}

/// Asserts a person's final payout
pub fn assert_payout(statement: &Statement, rep_id: &str, expected: Decimal) {
    let actual = person(statement, rep_id).payout;
    assert_eq!(actual, expected, "Payout mismatch for {}: actual={}, expected={}", rep_id, actual, expected);
}

/// Asserts a person's total from a single rule
pub fn assert_rule_total(statement: &Statement, rep_id: &str, rule_id: &str, expected: Decimal) {
    let actual = person(statement, rep_id)
        .rule_totals
        .get(rule_id)
        .copied()
        .unwrap_or(Decimal::ZERO);
    assert_eq!(
        actual, expected,
        "Rule total mismatch for {} on {}: actual={}, expected={}",
        rep_id, rule_id, actual, expected
    );
}

/// Asserts a rule left no trace for anyone
pub fn assert_no_traces_for_rule(statement: &Statement, rule_id: &str) {
    let offenders: Vec<&str> = statement
        .people
        .iter()
        .filter(|p| p.traces_for_rule(rule_id).next().is_some())
        .map(|p| p.rep_id.as_str())
        .collect();
    assert!(offenders.is_empty(), "Expected no traces for {}, found on {:?}", rule_id, offenders);
}

/// Returns the single trace a rule produced for a person
pub fn single_trace<'a>(statement: &'a Statement, rep_id: &str, rule_id: &'a str) -> &'a Trace {
    let traces: Vec<&Trace> = person(statement, rep_id).traces_for_rule(rule_id).collect();
    assert_eq!(traces.len(), 1, "Expected one {} trace for {}, found {}", rule_id, rep_id, traces.len());
    traces[0]
}

/// Asserts every person's payout equals the sum of their traces, to the cent
pub fn assert_traces_reconcile(statement: &Statement) {
    for p in &statement.people {
        let traced = p
            .traces
            .iter()
            .fold(Decimal::ZERO, |acc, t| core_kernel::add_cents(acc, t.delta));
        let diff = (traced - p.payout).abs();
        // per-trace rounding can drift by a cent per trace
        let tolerance = Decimal::new(p.traces.len() as i64, 2);
        assert!(
            diff <= tolerance,
            "Traces for {} sum to {} but payout is {}",
            p.rep_id,
            traced,
            p.payout
        );
    }
}

/// Asserts people are ordered by payout, highest first
pub fn assert_sorted_by_payout(statement: &Statement) {
    let payouts: Vec<Decimal> = statement.people.iter().map(|p| p.payout).collect();
    assert!(
        payouts.windows(2).all(|w| w[0] >= w[1]),
        "People not sorted by payout: {:?}",
        payouts
    );
}
