//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible defaults.
//! These builders allow tests to specify only the relevant fields while using
//! defaults for everything else.

use core_kernel::CurrencyCode;
use domain_compensation::{
    Condition, DateField, FieldValue, Participant, Plan, Rule, Transaction, TransactionType,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::StringFixtures;

/// Builder for constructing test transactions
pub struct TestTransactionBuilder {
    transaction: Transaction,
}

impl TestTransactionBuilder {
    /// Creates a NEW transaction for $1,000 written in March 2024
    pub fn new(id: &str) -> Self {
        let mut transaction = Transaction::new(id, StringFixtures::policy_id(), TransactionType::New, dec!(1000));
        transaction.written_date = Some(StringFixtures::written_date().to_string());
        Self { transaction }
    }

    /// Sets the policy id
    pub fn with_policy_id(mut self, policy_id: &str) -> Self {
        self.transaction.policy_id = policy_id.into();
        self
    }

    /// Sets the transaction type
    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction.transaction_type = transaction_type;
        self
    }

    /// Sets both premium and commissionable premium
    pub fn with_premium(mut self, premium: Decimal) -> Self {
        self.transaction.premium_delta = premium;
        self.transaction.commissionable_premium_delta = premium;
        self
    }

    /// Overrides the commissionable premium only
    pub fn with_commissionable_premium(mut self, premium: Decimal) -> Self {
        self.transaction.commissionable_premium_delta = premium;
        self
    }

    pub fn with_written_date(mut self, date: &str) -> Self {
        self.transaction.written_date = Some(date.to_string());
        self
    }

    pub fn with_effective_date(mut self, date: &str) -> Self {
        self.transaction.effective_date = Some(date.to_string());
        self
    }

    pub fn with_paid_date(mut self, date: &str) -> Self {
        self.transaction.paid_date = Some(date.to_string());
        self
    }

    /// Removes every date
    pub fn undated(mut self) -> Self {
        self.transaction.written_date = None;
        self.transaction.effective_date = None;
        self.transaction.paid_date = None;
        self
    }

    pub fn with_line_of_business(mut self, line: &str) -> Self {
        self.transaction.line_of_business = Some(line.to_string());
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.transaction.state = Some(state.to_string());
        self
    }

    /// Sets a custom field
    pub fn with_field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.transaction.fields.insert(key.to_string(), value.into());
        self
    }

    /// Adds a participant
    pub fn with_participant(mut self, participant: Participant) -> Self {
        self.transaction.participants.push(participant);
        self
    }

    /// Adds a participant with the given role and credit
    pub fn credit(self, rep_id: &str, role: &str, credit_percent: Decimal) -> Self {
        self.with_participant(Participant::new(rep_id, role, credit_percent))
    }

    /// Adds a Producer with full credit
    pub fn producer(self, rep_id: &str) -> Self {
        self.credit(rep_id, StringFixtures::PRODUCER, dec!(100))
    }

    /// Builds the transaction
    pub fn build(self) -> Transaction {
        self.transaction
    }
}

/// Builder for constructing test participants
pub struct TestParticipantBuilder {
    participant: Participant,
}

impl TestParticipantBuilder {
    /// Creates a full-credit Producer
    pub fn new(rep_id: &str) -> Self {
        Self {
            participant: Participant::new(rep_id, StringFixtures::PRODUCER, dec!(100)),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.participant.name = Some(name.to_string());
        self
    }

    pub fn with_role(mut self, role: &str) -> Self {
        self.participant.role = role.to_string();
        self
    }

    pub fn with_credit(mut self, credit_percent: Decimal) -> Self {
        self.participant.credit_percent = credit_percent;
        self
    }

    /// Sets a custom field
    pub fn with_field(mut self, key: &str, value: impl Into<FieldValue>) -> Self {
        self.participant.fields.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> Participant {
        self.participant
    }
}

/// Builder for constructing test plans
pub struct TestPlanBuilder {
    plan: Plan,
}

impl Default for TestPlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestPlanBuilder {
    /// Creates an empty USD plan keyed on written date
    pub fn new() -> Self {
        Self {
            plan: Plan::new(StringFixtures::plan_id(), "Test Plan"),
        }
    }

    pub fn with_currency(mut self, currency: &str) -> Self {
        self.plan.currency = CurrencyCode::new(currency);
        self
    }

    pub fn with_date_field(mut self, date_field: DateField) -> Self {
        self.plan.period.date_field = date_field;
        self
    }

    /// Adds a rule
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.plan.rules.push(rule);
        self
    }

    /// Adds a rule gated by a condition
    pub fn with_conditional_rule(self, rule: Rule, condition: Condition) -> Self {
        self.with_rule(rule.with_condition(condition))
    }

    pub fn build(self) -> Plan {
        self.plan
    }
}
