//! Compensation Domain
//!
//! Computes commission statements from a declarative plan and a batch of
//! policy transactions. The engine is a pure, synchronous function: it does
//! no I/O and the same inputs always produce the same statement.
//!
//! # Pipeline
//!
//! ```text
//! Plan + Transactions
//!   -> transaction rules (participantRate, overrideRate)
//!   -> period metrics
//!   -> period rules (tieredRatePeriod, bonusThresholdPeriod)
//!   -> caps (capPeriod)
//!   -> Statement (payouts, traces, warnings)
//! ```
//!
//! Every money movement is recorded as a [`Trace`] so a statement can answer
//! "why was I paid this".
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_compensation::{calculate, load_plan_from_file, load_transactions_from_file, CalculationOptions};
//!
//! let plan = load_plan_from_file("plan.json")?;
//! let transactions = load_transactions_from_file("transactions.json")?;
//! let statement = calculate(&plan, &transactions, &CalculationOptions::default());
//!
//! for person in &statement.people {
//!     println!("{}: {}", person.rep_id, person.payout);
//! }
//! ```

pub mod calculator;
pub mod condition;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod plan;
pub mod rates;
pub mod statement;
pub mod tiers;
pub mod transaction;
pub mod value;

pub use calculator::{calculate, resolve_period_key, CalculationOptions};
pub use condition::{Condition, EvalContext, FieldPath, Namespace};
pub use error::CompensationError;
pub use loader::{load_plan_from_file, load_plan_from_str, load_transactions_from_file, load_transactions_from_str};
pub use metrics::{aggregate_metrics, MetricName, PersonMetrics};
pub use plan::{
    Allocation, DateField, Granularity, OverridePayee, PeriodPayee, PeriodSettings, Plan, Rule, RuleKind, RuleStage,
    RuleType,
};
pub use rates::{apply_rate, resolve_base, BaseQuantity, RateType};
pub use statement::{PersonResult, Statement, Trace, TraceStage, TransactionSummary};
pub use tiers::{tiered_amount, Tier, TierMode};
pub use transaction::{Participant, Transaction, TransactionType};
pub use value::FieldValue;
