//! Statement calculation tests
//!
//! Tests cover every rule type, period selection, rounding, ordering, and
//! the non-fatal diagnostics the calculator reports.

use core_kernel::{round_cents, PeriodKey};
use domain_compensation::{
    calculate, Allocation, BaseQuantity, CalculationOptions, Condition, MetricName, OverridePayee, PeriodPayee, Plan,
    RateType, Rule, RuleKind, RuleType, Statement, TierMode, tiered_amount, Transaction, TraceStage, TransactionType,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use test_utils::*;

fn run(plan: &Plan, transactions: &[Transaction]) -> Statement {
    calculate(plan, transactions, &CalculationOptions::default())
}

fn single_producer(premium: Decimal) -> Vec<Transaction> {
    vec![TestTransactionBuilder::new("TX-1").with_premium(premium).producer("rep-1").build()]
}

mod participant_rate {
    use super::*;

    #[test]
    fn test_producer_commission_on_credited_premium() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::producer_commission()).build();
        let txns = single_producer(dec!(1200));

        let statement = run(&plan, &txns);

        assert_payout(&statement, "rep-1", dec!(120.00));
        let trace = single_trace(&statement, "rep-1", "producer-commission");
        assert_eq!(trace.stage, TraceStage::Transaction);
        assert_eq!(trace.rule_type, RuleType::ParticipantRate);
        assert_eq!(trace.base, dec!(1200));
        assert_eq!(trace.delta, dec!(120));
        assert_eq!(trace.transaction_id.as_ref().map(|t| t.as_str()), Some("TX-1"));
        assert_eq!(trace.policy_id.as_ref().map(|p| p.as_str()), Some("POL-001"));
    }

    #[test]
    fn test_condition_excludes_other_roles() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::producer_commission()).build();
        let txns = vec![TestTransactionBuilder::new("TX-1")
            .producer("rep-1")
            .credit("csr-1", "CSR", dec!(100))
            .build()];

        let statement = run(&plan, &txns);

        assert_payout(&statement, "rep-1", dec!(100.00));
        assert_payout(&statement, "csr-1", dec!(0));
        assert!(person(&statement, "csr-1").traces.is_empty());
    }

    #[test]
    fn test_zero_credit_participant() {
        let total = Rule::new(
            "total",
            "Total",
            RuleKind::ParticipantRate {
                base: BaseQuantity::CommissionablePremiumTotal,
                rate: RateType::Percent,
                value: dec!(0.01),
            },
        );
        let count = Rule::new(
            "count",
            "Per Policy",
            RuleKind::ParticipantRate {
                base: BaseQuantity::PolicyCountCredit,
                rate: RateType::Fixed,
                value: dec!(25),
            },
        );
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::participant_rate("credit", dec!(0.10)))
            .with_rule(total)
            .with_rule(count)
            .build();
        let txns = vec![TestTransactionBuilder::new("TX-1").credit("rep-0", "Producer", dec!(0)).build()];

        let statement = run(&plan, &txns);

        assert_rule_total(&statement, "rep-0", "credit", dec!(0));
        assert_rule_total(&statement, "rep-0", "count", dec!(0));
        assert_rule_total(&statement, "rep-0", "total", dec!(10.00));
        let metrics = &person(&statement, "rep-0").metrics;
        assert_eq!(metrics.nb_premium, dec!(0));
        assert_eq!(metrics.nb_policy_count, 0);
    }

    #[test]
    fn test_split_credit() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::producer_commission()).build();
        let txns = vec![TestTransactionBuilder::new("TX-1")
            .with_premium(dec!(999.99))
            .credit("rep-1", "Producer", dec!(50))
            .credit("rep-2", "Producer", dec!(50))
            .build()];

        let statement = run(&plan, &txns);

        // 49.9995 each
        assert_payout(&statement, "rep-1", dec!(50.00));
        assert_payout(&statement, "rep-2", dec!(50.00));
        let summary = statement.transaction("TX-1").unwrap();
        assert_eq!(summary.deltas_by_person["rep-1"], dec!(50.00));
    }

    #[test]
    fn test_cancellation_claws_back() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::producer_commission()).build();
        let txns = vec![
            TestTransactionBuilder::new("TX-1").with_premium(dec!(1000)).producer("rep-1").build(),
            TestTransactionBuilder::new("TX-2")
                .with_type(TransactionType::Cancel)
                .with_premium(dec!(-400))
                .producer("rep-1")
                .build(),
        ];

        let statement = run(&plan, &txns);

        assert_payout(&statement, "rep-1", dec!(60.00));
        assert_eq!(person(&statement, "rep-1").traces.len(), 2);
    }
}

mod override_rate {
    use super::*;

    fn producer_and_managers(managers: &[(&str, Decimal)]) -> Vec<Transaction> {
        let mut builder = TestTransactionBuilder::new("TX-1").with_premium(dec!(1000)).producer("rep-1");
        for (rep, credit) in managers {
            builder = builder.credit(rep, "Manager", *credit);
        }
        vec![builder.build()]
    }

    #[test]
    fn test_equal_split_across_role() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::role_override("ovr", "Manager", dec!(0.02), Allocation::Equal))
            .build();
        let txns = producer_and_managers(&[("mgr-1", dec!(0)), ("mgr-2", dec!(0))]);

        let statement = run(&plan, &txns);

        assert_payout(&statement, "mgr-1", dec!(10.00));
        assert_payout(&statement, "mgr-2", dec!(10.00));
        assert_payout(&statement, "rep-1", dec!(0));
        let trace = single_trace(&statement, "mgr-1", "ovr");
        assert_eq!(trace.base, dec!(1000));
        let pool: Option<Decimal> = trace.details["pool"].as_str().and_then(|s| s.parse().ok());
        assert_eq!(pool, Some(dec!(20)));
        assert!(statement.warnings.is_empty());
    }

    #[test]
    fn test_credit_weighted_split() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::role_override("ovr", "Manager", dec!(0.02), Allocation::CreditWeighted))
            .build();
        let txns = producer_and_managers(&[("mgr-1", dec!(30)), ("mgr-2", dec!(10))]);

        let statement = run(&plan, &txns);

        assert_payout(&statement, "mgr-1", dec!(15.00));
        assert_payout(&statement, "mgr-2", dec!(5.00));
    }

    #[test]
    fn test_weighted_split_with_zero_weights_is_equal() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::role_override("ovr", "Manager", dec!(0.02), Allocation::CreditWeighted))
            .build();
        let txns = producer_and_managers(&[("mgr-1", dec!(0)), ("mgr-2", dec!(0))]);

        let statement = run(&plan, &txns);

        assert_payout(&statement, "mgr-1", dec!(10.00));
        assert_payout(&statement, "mgr-2", dec!(10.00));
    }

    #[test]
    fn test_no_matching_payees_warns_once() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::role_override("ovr", "Regional VP", dec!(0.02), Allocation::Equal))
            .build();
        let txns = producer_and_managers(&[("mgr-1", dec!(0))]);

        let statement = run(&plan, &txns);

        assert_eq!(statement.warnings.len(), 1);
        assert!(statement.warnings[0].contains("ovr"));
        assert!(statement.warnings[0].contains("TX-1"));
        assert_no_traces_for_rule(&statement, "ovr");
        assert_eq!(statement.total_payout(), dec!(0));
    }

    #[test]
    fn test_zero_sum_source_is_silent() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::role_override("ovr", "Regional VP", dec!(0.02), Allocation::Equal))
            .build();
        // Only a manager, so the Producer source condition matches nobody
        let txns = vec![TestTransactionBuilder::new("TX-1").credit("mgr-1", "Manager", dec!(100)).build()];

        let statement = run(&plan, &txns);

        assert!(statement.warnings.is_empty());
        assert_no_traces_for_rule(&statement, "ovr");
    }

    #[test]
    fn test_person_payee_need_not_be_a_participant() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::person_override("ovr", "house", dec!(0.01)))
            .build();
        let txns = single_producer(dec!(5000));

        let statement = run(&plan, &txns);

        assert_payout(&statement, "house", dec!(50.00));
        assert_eq!(statement.transaction("TX-1").unwrap().deltas_by_person["house"], dec!(50.00));
    }

    #[test]
    fn test_agency_payee() {
        let rule = Rule::new(
            "agency",
            "Agency Override",
            RuleKind::OverrideRate {
                base: BaseQuantity::PremiumTotal,
                rate: RateType::Percent,
                value: dec!(0.05),
                source_condition: None,
                payee: OverridePayee::Agency { agency_id: "AG-7".into() },
                allocation: Allocation::Equal,
                payee_condition: None,
            },
        );
        let plan = TestPlanBuilder::new().with_rule(rule).build();
        let txns = vec![TestTransactionBuilder::new("TX-1")
            .with_premium(dec!(100))
            .producer("rep-1")
            .producer("rep-2")
            .build()];

        let statement = run(&plan, &txns);

        // premiumTotal counts once per source participant
        assert_payout(&statement, "AG-7", dec!(10.00));
    }

    #[test]
    fn test_payee_condition_filters_role_payees() {
        let mut rule = RuleFixtures::role_override("ovr", "Manager", dec!(0.02), Allocation::Equal);
        if let RuleKind::OverrideRate { payee_condition, .. } = &mut rule.kind {
            *payee_condition = Some(Condition::gte("participant.creditPercent", 10));
        }
        let plan = TestPlanBuilder::new().with_rule(rule).build();
        let txns = producer_and_managers(&[("mgr-1", dec!(0)), ("mgr-2", dec!(20))]);

        let statement = run(&plan, &txns);

        assert_payout(&statement, "mgr-2", dec!(20.00));
        assert_payout(&statement, "mgr-1", dec!(0));
    }

    #[test]
    fn test_top_level_condition_sees_transaction_only() {
        let rule = RuleFixtures::role_override("ovr", "Manager", dec!(0.02), Allocation::Equal)
            .with_condition(Condition::eq("participant.role", "Producer"));
        let plan = TestPlanBuilder::new().with_rule(rule).build();
        let txns = producer_and_managers(&[("mgr-1", dec!(0))]);

        let statement = run(&plan, &txns);

        assert_no_traces_for_rule(&statement, "ovr");
        assert!(statement.warnings.is_empty());
    }
}

mod period_rules {
    use super::*;

    #[test]
    fn test_progressive_tiers() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::tiered("tiers", TierMode::Progressive)).build();
        let statement = run(&plan, &single_producer(dec!(30000)));

        assert_payout(&statement, "rep-1", dec!(250.00));
        let trace = single_trace(&statement, "rep-1", "tiers");
        assert_eq!(trace.stage, TraceStage::Period);
        assert_eq!(trace.base, dec!(30000));
        assert!(trace.transaction_id.is_none());
    }

    #[test]
    fn test_cliff_tiers() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::tiered("tiers", TierMode::Cliff)).build();
        let statement = run(&plan, &single_producer(dec!(30000)));

        assert_payout(&statement, "rep-1", dec!(600.00));
    }

    #[test]
    fn test_tiers_skip_non_positive_metric() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::tiered("tiers", TierMode::Cliff)).build();
        let txns = vec![TestTransactionBuilder::new("TX-1")
            .with_type(TransactionType::Cancel)
            .with_premium(dec!(-500))
            .producer("rep-1")
            .build()];

        let statement = run(&plan, &txns);

        assert_no_traces_for_rule(&statement, "tiers");
    }

    #[test]
    fn test_bonus_threshold_is_inclusive() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::bonus("bonus", MetricName::NbPolicyCount, dec!(2), dec!(500), PeriodPayee::All))
            .build();
        let txns = vec![
            TestTransactionBuilder::new("TX-1").producer("rep-1").producer("rep-2").build(),
            TestTransactionBuilder::new("TX-2").with_policy_id("POL-002").producer("rep-1").build(),
        ];

        let statement = run(&plan, &txns);

        assert_payout(&statement, "rep-1", dec!(500.00));
        assert_payout(&statement, "rep-2", dec!(0));
        assert_eq!(single_trace(&statement, "rep-1", "bonus").base, dec!(2));
    }

    #[test]
    fn test_period_person_payee_is_created() {
        let payee = PeriodPayee::Person { rep_id: "ghost".into() };
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::bonus("bonus", MetricName::TotalPremium, dec!(0), dec!(100), payee))
            .build();

        let statement = run(&plan, &single_producer(dec!(1000)));

        // a person with no production still meets a zero threshold
        assert_payout(&statement, "ghost", dec!(100.00));
    }

    #[test]
    fn test_role_payee_uses_roles_seen_in_period() {
        let payee = PeriodPayee::Role { role: "Manager".to_string() };
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::bonus("bonus", MetricName::TotalPolicyCount, dec!(0), dec!(75), payee))
            .build();
        let txns = vec![TestTransactionBuilder::new("TX-1")
            .producer("rep-1")
            .credit("mgr-1", "Manager", dec!(0))
            .build()];

        let statement = run(&plan, &txns);

        assert_payout(&statement, "mgr-1", dec!(75.00));
        assert_payout(&statement, "rep-1", dec!(0));
    }

    #[test]
    fn test_condition_gates_on_metrics() {
        let rule = RuleFixtures::bonus("bonus", MetricName::TotalPremium, dec!(0), dec!(100), PeriodPayee::All)
            .with_condition(Condition::gte("metrics.rnPremium", 1));
        let plan = TestPlanBuilder::new().with_rule(rule).build();
        let txns = vec![
            TestTransactionBuilder::new("TX-1").producer("rep-1").build(),
            TestTransactionBuilder::new("TX-2")
                .with_type(TransactionType::Renewal)
                .producer("rep-2")
                .build(),
        ];

        let statement = run(&plan, &txns);

        assert_payout(&statement, "rep-1", dec!(0));
        assert_payout(&statement, "rep-2", dec!(100.00));
    }
}

mod caps {
    use super::*;

    #[test]
    fn test_cap_clamps_payout() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::producer_commission())
            .with_rule(RuleFixtures::cap_all("cap", dec!(5000)))
            .build();

        let statement = run(&plan, &single_producer(dec!(52000)));

        assert_payout(&statement, "rep-1", dec!(5000.00));
        let trace = single_trace(&statement, "rep-1", "cap");
        assert_eq!(trace.delta, dec!(-200));
        assert_eq!(trace.base, dec!(5200));
        assert_eq!(trace.rule_type, RuleType::CapPeriod);
        assert_traces_reconcile(&statement);
    }

    #[test]
    fn test_cap_never_raises() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::producer_commission())
            .with_rule(RuleFixtures::cap_all("cap", dec!(5000)))
            .build();

        let statement = run(&plan, &single_producer(dec!(1000)));

        assert_payout(&statement, "rep-1", dec!(100.00));
        assert_no_traces_for_rule(&statement, "cap");
    }

    #[test]
    fn test_cap_runs_after_period_rules_regardless_of_priority() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::cap_all("cap", dec!(100)).with_priority(-10))
            .with_rule(RuleFixtures::tiered("tiers", TierMode::Cliff).with_priority(10))
            .build();

        let statement = run(&plan, &single_producer(dec!(30000)));

        assert_payout(&statement, "rep-1", dec!(100.00));
        let traces = &person(&statement, "rep-1").traces;
        assert_eq!(traces.last().unwrap().rule_id.as_str(), "cap");
    }

    #[test]
    fn test_fractional_cent_cap_is_not_exceeded() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::producer_commission())
            .with_rule(RuleFixtures::cap_all("cap", dec!(99.995)))
            .build();

        let statement = run(&plan, &single_producer(dec!(2000)));

        assert_payout(&statement, "rep-1", dec!(99.99));
        assert_eq!(single_trace(&statement, "rep-1", "cap").delta, dec!(-100.01));
        assert_traces_reconcile(&statement);
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn test_period_inferred_from_first_transaction() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::producer_commission()).build();
        let txns = vec![
            TestTransactionBuilder::new("TX-1").with_written_date("2024-03-01").producer("rep-1").build(),
            TestTransactionBuilder::new("TX-2").with_written_date("2024-04-01").producer("rep-1").build(),
            TestTransactionBuilder::new("TX-3").undated().producer("rep-1").build(),
        ];

        let statement = run(&plan, &txns);

        assert_eq!(statement.period_key, PeriodKey::Month { year: 2024, month: 3 });
        assert_eq!(statement.transactions.len(), 1);
        assert_payout(&statement, "rep-1", dec!(100.00));
    }

    #[test]
    fn test_all_period_includes_everything() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::producer_commission()).build();
        let txns = vec![
            TestTransactionBuilder::new("TX-1").with_written_date("2024-03-01").producer("rep-1").build(),
            TestTransactionBuilder::new("TX-2").undated().producer("rep-1").build(),
        ];

        let statement = calculate(&plan, &txns, &CalculationOptions::for_period(PeriodKey::All));

        assert_eq!(statement.transactions.len(), 2);
        assert_payout(&statement, "rep-1", dec!(200.00));
    }

    #[test]
    fn test_configured_date_field() {
        let plan = TestPlanBuilder::new()
            .with_date_field(domain_compensation::DateField::PaidDate)
            .with_rule(RuleFixtures::producer_commission())
            .build();
        let txns = vec![
            TestTransactionBuilder::new("TX-1").with_paid_date("2024-05-02").producer("rep-1").build(),
            TestTransactionBuilder::new("TX-2").with_paid_date("2024-06-02").producer("rep-1").build(),
        ];

        let statement = calculate(&plan, &txns, &CalculationOptions::for_period(PeriodKey::month(2024, 6).unwrap()));

        assert_eq!(statement.transactions.len(), 1);
        assert_eq!(statement.transactions[0].transaction_id.as_str(), "TX-2");
    }

    #[test]
    fn test_disabled_rules_and_priority_order() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::participant_rate("late", dec!(0.01)).with_priority(5))
            .with_rule(RuleFixtures::participant_rate("early", dec!(0.02)).with_priority(1))
            .with_rule(RuleFixtures::participant_rate("off", dec!(0.50)).disabled())
            .build();

        let statement = run(&plan, &single_producer(dec!(1000)));

        let order: Vec<&str> = person(&statement, "rep-1").traces.iter().map(|t| t.rule_id.as_str()).collect();
        assert_eq!(order, vec!["early", "late"]);
        assert_payout(&statement, "rep-1", dec!(30.00));
    }

    #[test]
    fn test_empty_plan_pays_nobody() {
        let plan = TestPlanBuilder::new().build();
        let statement = run(&plan, &single_producer(dec!(1000)));

        assert_eq!(statement.people.len(), 1);
        assert_payout(&statement, "rep-1", dec!(0));
        assert_eq!(statement.total_payout(), dec!(0));
    }

    #[test]
    fn test_no_transactions() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::producer_commission()).build();
        let statement = run(&plan, &[]);

        assert_eq!(statement.period_key, PeriodKey::All);
        assert!(statement.people.is_empty());
        assert_eq!(statement.currency.as_str(), "USD");
    }

    #[test]
    fn test_sample_documents_end_to_end() {
        let plan: Plan = serde_json::from_value(DocumentFixtures::sample_plan()).unwrap();
        let txns: Vec<Transaction> = serde_json::from_value(DocumentFixtures::sample_transactions()).unwrap();

        let statement = run(&plan, &txns);

        assert_eq!(statement.period_key.to_string(), "2024-03");
        assert_eq!(statement.transactions.len(), 2);
        assert_payout(&statement, "rep-1", dec!(1295.00));
        assert_payout(&statement, "mgr-1", dec!(240.00));
        assert_payout(&statement, "rep-2", dec!(75.00));
        assert_rule_total(&statement, "rep-1", "nb-tiers", dec!(20.00));
        assert_eq!(person(&statement, "rep-1").name.as_deref(), Some("Avery"));
        assert_eq!(statement.warnings.len(), 1);
        assert!(statement.warnings[0].contains("TX-2"));

        let order: Vec<&str> = statement.people.iter().map(|p| p.rep_id.as_str()).collect();
        assert_eq!(order, vec!["rep-1", "mgr-1", "rep-2"]);
        assert_eq!(statement.rule_totals()["manager-override"], dec!(240.00));
        assert_eq!(statement.total_payout(), dec!(1610.00));
        assert_traces_reconcile(&statement);
    }

    #[test]
    fn test_statement_serializes_camel_case() {
        let plan = TestPlanBuilder::new().with_rule(RuleFixtures::producer_commission()).build();
        let statement = run(&plan, &single_producer(dec!(1200)));

        let json = serde_json::to_value(&statement).unwrap();
        assert_eq!(json["periodKey"], "2024-03");
        assert_eq!(json["people"][0]["repId"], "rep-1");
        assert_eq!(json["people"][0]["payout"], "120.00");
        assert_eq!(json["people"][0]["traces"][0]["ruleType"], "participantRate");
        assert!(json["transactions"][0]["deltasByPerson"]["rep-1"].is_string());
    }
}

mod extreme_amounts {
    use super::*;

    fn huge_premium() -> Decimal {
        "70000000000000000000000000000".parse().unwrap()
    }

    #[test]
    fn test_overflowing_totals_saturate() {
        let plan = TestPlanBuilder::new()
            .with_rule(RuleFixtures::participant_rate("whole", dec!(1)))
            .build();
        let txns = vec![
            TestTransactionBuilder::new("TX-1").with_premium(huge_premium()).producer("rep-1").build(),
            TestTransactionBuilder::new("TX-2").with_premium(huge_premium()).producer("rep-1").build(),
        ];

        let statement = run(&plan, &txns);

        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(person(&statement, "rep-1").traces.len(), 2);
        assert!(statement.payout("rep-1") > huge_premium());
        assert!(person(&statement, "rep-1").metrics.nb_premium > huge_premium());
    }
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    fn full_plan(cap: Decimal) -> Plan {
        TestPlanBuilder::new()
            .with_rule(RuleFixtures::producer_commission())
            .with_rule(RuleFixtures::role_override("ovr", "Manager", dec!(0.02), Allocation::CreditWeighted))
            .with_rule(RuleFixtures::tiered("tiers", TierMode::Progressive))
            .with_rule(RuleFixtures::bonus("bonus", MetricName::NbPolicyCount, dec!(3), dec!(250), PeriodPayee::All))
            .with_rule(RuleFixtures::cap_all("cap", cap))
            .build()
    }

    fn uncapped_plan() -> Plan {
        let mut plan = full_plan(Decimal::ZERO);
        plan.rules.retain(|r| r.kind.rule_type() != RuleType::CapPeriod);
        plan
    }

    proptest! {
        #[test]
        fn calculation_is_idempotent(txns in transactions_strategy()) {
            let plan = full_plan(dec!(2000));
            let first = run(&plan, &txns);
            let second = run(&plan, &txns);
            prop_assert_eq!(first, second);
        }

        #[test]
        fn payouts_are_whole_cents_and_sorted(txns in transactions_strategy()) {
            let statement = run(&full_plan(dec!(2000)), &txns);
            for p in &statement.people {
                prop_assert_eq!(p.payout, round_cents(p.payout));
                prop_assert_eq!(p.payout.scale(), 2);
            }
            assert_sorted_by_payout(&statement);
        }

        #[test]
        fn caps_never_increase_payout(txns in transactions_strategy(), cap in premium_strategy()) {
            let capped = run(&full_plan(cap), &txns);
            let uncapped = run(&uncapped_plan(), &txns);
            for p in &capped.people {
                let before = uncapped.payout(p.rep_id.as_str());
                prop_assert!(p.payout <= before);
                prop_assert!(p.payout <= cap || p.payout == before);
            }
        }

        #[test]
        fn progressive_never_exceeds_cliff_for_rising_rates(
            mut tiers in tiers_strategy(),
            metric in premium_strategy(),
        ) {
            let mut rates: Vec<Decimal> = tiers.iter().map(|t| t.value).collect();
            rates.sort();
            for (tier, rate) in tiers.iter_mut().zip(rates) {
                tier.value = rate;
            }
            let progressive = tiered_amount(metric, &tiers, TierMode::Progressive);
            let cliff = tiered_amount(metric, &tiers, TierMode::Cliff);
            prop_assert!(progressive <= cliff, "progressive {} > cliff {}", progressive, cliff);
        }

        #[test]
        fn summaries_cover_only_in_period_transactions(txns in transactions_strategy()) {
            let statement = run(&full_plan(dec!(2000)), &txns);
            prop_assert_eq!(statement.transactions.len(), txns.len());
        }
    }

    #[test]
    fn test_uncapped_plan_has_no_cap() {
        assert!(uncapped_plan().rules.iter().all(|r| r.kind.rule_type() != RuleType::CapPeriod));
    }
}
