//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random calculation inputs
//! that keep amounts in realistic ranges.

use domain_compensation::{Participant, Tier, Transaction, TransactionType};
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Strategy for generating cent amounts, possibly negative
pub fn cents_strategy() -> impl Strategy<Value = Decimal> {
    (-10_000_000i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating positive premium amounts
pub fn premium_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating arbitrary-precision amounts
pub fn raw_amount_strategy() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000i64..1_000_000_000i64, 0u32..8u32).prop_map(|(m, s)| Decimal::new(m, s))
}

/// Strategy for generating rates (0.0000 to 0.2500)
pub fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0u32..2500u32).prop_map(|n| Decimal::new(n as i64, 4))
}

/// Strategy for generating credit percentages (0 to 100)
pub fn credit_percent_strategy() -> impl Strategy<Value = Decimal> {
    prop_oneof![
        Just(Decimal::ZERO),
        Just(Decimal::ONE_HUNDRED),
        (0u32..=100u32).prop_map(Decimal::from),
    ]
}

/// Strategy for generating transaction types
pub fn transaction_type_strategy() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::New),
        Just(TransactionType::Renewal),
        Just(TransactionType::Endorsement),
        Just(TransactionType::Cancel),
        Just(TransactionType::Reinstate),
    ]
}

/// Strategy for generating roles
pub fn role_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Producer".to_string()),
        Just("Manager".to_string()),
        Just("CSR".to_string()),
    ]
}

/// Strategy for generating a participant from a small pool of reps
pub fn participant_strategy() -> impl Strategy<Value = Participant> {
    (0u32..5u32, role_strategy(), credit_percent_strategy())
        .prop_map(|(rep, role, credit)| Participant::new(format!("rep-{}", rep), role, credit))
}

/// Strategy for generating a transaction dated in March 2024
pub fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    (
        0u32..1000u32,
        transaction_type_strategy(),
        premium_strategy(),
        1u32..29u32,
        proptest::collection::vec(participant_strategy(), 0..4),
    )
        .prop_map(|(n, kind, premium, day, participants)| {
            let premium = if kind == TransactionType::Cancel { -premium } else { premium };
            let mut tx = Transaction::new(format!("TX-{}", n), format!("POL-{}", n), kind, premium);
            tx.written_date = Some(format!("2024-03-{:02}", day));
            tx.participants = participants;
            tx
        })
}

/// Strategy for generating a batch of transactions
pub fn transactions_strategy() -> impl Strategy<Value = Vec<Transaction>> {
    proptest::collection::vec(transaction_strategy(), 0..12)
}

/// Strategy for generating ascending tiers ending in an unbounded tier
pub fn tiers_strategy() -> impl Strategy<Value = Vec<Tier>> {
    proptest::collection::vec((1i64..50_000i64, rate_strategy()), 0..4).prop_flat_map(|steps| {
        rate_strategy().prop_map(move |top_rate| {
            let mut bound = Decimal::ZERO;
            let mut tiers: Vec<Tier> = steps
                .iter()
                .map(|(width, rate)| {
                    bound += Decimal::from(*width);
                    Tier::new(Some(bound), *rate)
                })
                .collect();
            tiers.push(Tier::new(None, top_rate));
            tiers
        })
    })
}
