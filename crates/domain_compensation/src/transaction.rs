//! Policy transactions and their participants
//!
//! Transactions are the per-policy money movements a statement is computed
//! from. Each carries the participants credited on it and a free-form map of
//! custom fields that conditions may reference.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::money::lenient;
use core_kernel::{PolicyId, RepId, TransactionId};

use crate::plan::DateField;
use crate::value::{lookup_custom, FieldValue};

/// Kind of policy transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// New business
    New,
    /// Renewal of an existing policy
    Renewal,
    /// Mid-term change
    Endorsement,
    /// Cancellation (premium deltas are usually negative)
    Cancel,
    /// Reinstatement of a cancelled policy
    Reinstate,
}

impl TransactionType {
    /// Returns the wire name of the type
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::New => "NEW",
            TransactionType::Renewal => "RENEWAL",
            TransactionType::Endorsement => "ENDORSEMENT",
            TransactionType::Cancel => "CANCEL",
            TransactionType::Reinstate => "REINSTATE",
        }
    }
}

/// A person credited on a transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub rep_id: RepId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub role: String,
    /// Share of the transaction credited to this person, nominally 0-100
    #[serde(default, deserialize_with = "lenient::decimal")]
    pub credit_percent: Decimal,
    #[serde(default, alias = "customFields")]
    pub fields: BTreeMap<String, FieldValue>,
}

impl Participant {
    /// Creates a participant with a role and credit percentage
    pub fn new(rep_id: impl Into<RepId>, role: impl Into<String>, credit_percent: Decimal) -> Self {
        Self {
            rep_id: rep_id.into(),
            name: None,
            role: role.into(),
            credit_percent,
            fields: BTreeMap::new(),
        }
    }

    /// Returns the credit percentage as a fraction
    pub fn credit_share(&self) -> Decimal {
        self.credit_percent / dec!(100)
    }

    /// Returns true if this participant receives any credit
    pub fn has_credit(&self) -> bool {
        self.credit_percent > Decimal::ZERO
    }

    /// Resolves a `participant.*` path
    pub fn field(&self, segments: &[String]) -> FieldValue {
        let Some((head, rest)) = segments.split_first() else {
            return FieldValue::Absent;
        };
        let scalar = match head.as_str() {
            "repId" => FieldValue::Text(self.rep_id.to_string()),
            "name" => FieldValue::optional_text(self.name.as_deref()),
            "role" => FieldValue::Text(self.role.clone()),
            "creditPercent" => FieldValue::Number(self.credit_percent),
            "fields" | "customFields" => return lookup_custom(&self.fields, rest),
            _ => return lookup_custom(&self.fields, segments),
        };
        if rest.is_empty() { scalar } else { FieldValue::Absent }
    }
}

/// A policy transaction
///
/// `commissionable_premium_delta` is always populated: when the source
/// document omits it, it takes the value of `premium_delta` at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "TransactionDocument")]
pub struct Transaction {
    pub id: TransactionId,
    pub policy_id: PolicyId,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_of_business: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub written_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_date: Option<String>,
    pub premium_delta: Decimal,
    pub commissionable_premium_delta: Decimal,
    pub participants: Vec<Participant>,
    pub fields: BTreeMap<String, FieldValue>,
}

/// Wire shape of a transaction before defaults are applied
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionDocument {
    id: TransactionId,
    #[serde(default)]
    policy_id: PolicyId,
    #[serde(rename = "type", alias = "transactionType")]
    transaction_type: TransactionType,
    #[serde(default, alias = "line")]
    line_of_business: Option<String>,
    #[serde(default)]
    carrier: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    written_date: Option<String>,
    #[serde(default)]
    effective_date: Option<String>,
    #[serde(default)]
    paid_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::decimal")]
    premium_delta: Decimal,
    #[serde(default, deserialize_with = "lenient::optional_decimal")]
    commissionable_premium_delta: Option<Decimal>,
    #[serde(default)]
    participants: Vec<Participant>,
    #[serde(default, alias = "customFields")]
    fields: BTreeMap<String, FieldValue>,
}

impl From<TransactionDocument> for Transaction {
    fn from(doc: TransactionDocument) -> Self {
        Self {
            id: doc.id,
            policy_id: doc.policy_id,
            transaction_type: doc.transaction_type,
            line_of_business: doc.line_of_business,
            carrier: doc.carrier,
            state: doc.state,
            written_date: doc.written_date,
            effective_date: doc.effective_date,
            paid_date: doc.paid_date,
            premium_delta: doc.premium_delta,
            commissionable_premium_delta: doc.commissionable_premium_delta.unwrap_or(doc.premium_delta),
            participants: doc.participants,
            fields: doc.fields,
        }
    }
}

impl Transaction {
    /// Creates a transaction whose commissionable premium equals its premium
    pub fn new(
        id: impl Into<TransactionId>,
        policy_id: impl Into<PolicyId>,
        transaction_type: TransactionType,
        premium_delta: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            policy_id: policy_id.into(),
            transaction_type,
            line_of_business: None,
            carrier: None,
            state: None,
            written_date: None,
            effective_date: None,
            paid_date: None,
            premium_delta,
            commissionable_premium_delta: premium_delta,
            participants: Vec::new(),
            fields: BTreeMap::new(),
        }
    }

    /// Returns the date used to place this transaction in a period
    ///
    /// Falls back through written, effective, then paid date when the
    /// configured field is missing.
    pub fn period_date(&self, field: DateField) -> Option<&str> {
        let configured = match field {
            DateField::WrittenDate => self.written_date.as_deref(),
            DateField::EffectiveDate => self.effective_date.as_deref(),
            DateField::PaidDate => self.paid_date.as_deref(),
        };
        configured
            .or(self.written_date.as_deref())
            .or(self.effective_date.as_deref())
            .or(self.paid_date.as_deref())
    }

    /// Finds a participant by rep id
    pub fn participant(&self, rep_id: &RepId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.rep_id == rep_id)
    }

    /// Resolves a `transaction.*` path
    pub fn field(&self, segments: &[String]) -> FieldValue {
        let Some((head, rest)) = segments.split_first() else {
            return FieldValue::Absent;
        };
        let scalar = match head.as_str() {
            "id" => FieldValue::Text(self.id.to_string()),
            "policyId" => FieldValue::Text(self.policy_id.to_string()),
            "type" | "transactionType" => FieldValue::Text(self.transaction_type.as_str().to_string()),
            "lineOfBusiness" | "line" => FieldValue::optional_text(self.line_of_business.as_deref()),
            "carrier" => FieldValue::optional_text(self.carrier.as_deref()),
            "state" => FieldValue::optional_text(self.state.as_deref()),
            "writtenDate" => FieldValue::optional_text(self.written_date.as_deref()),
            "effectiveDate" => FieldValue::optional_text(self.effective_date.as_deref()),
            "paidDate" => FieldValue::optional_text(self.paid_date.as_deref()),
            "premiumDelta" => FieldValue::Number(self.premium_delta),
            "commissionablePremiumDelta" => FieldValue::Number(self.commissionable_premium_delta),
            "fields" | "customFields" => return lookup_custom(&self.fields, rest),
            _ => return lookup_custom(&self.fields, segments),
        };
        if rest.is_empty() { scalar } else { FieldValue::Absent }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(p: &str) -> Vec<String> {
        p.split('.').map(str::to_string).collect()
    }

    #[test]
    fn test_commissionable_defaults_to_premium_at_ingestion() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": "t1", "policyId": "p1", "type": "NEW", "premiumDelta": 1000
        }))
        .unwrap();
        assert_eq!(tx.commissionable_premium_delta, dec!(1000));
    }

    #[test]
    fn test_explicit_commissionable_is_kept() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": "t1", "policyId": "p1", "type": "RENEWAL",
            "premiumDelta": "1000", "commissionablePremiumDelta": 800
        }))
        .unwrap();
        assert_eq!(tx.commissionable_premium_delta, dec!(800));
    }

    #[test]
    fn test_malformed_premium_coerces_to_zero() {
        let tx: Transaction = serde_json::from_value(json!({
            "id": "t1", "type": "CANCEL", "premiumDelta": "twelve"
        }))
        .unwrap();
        assert_eq!(tx.premium_delta, Decimal::ZERO);
        assert_eq!(tx.commissionable_premium_delta, Decimal::ZERO);
    }

    #[test]
    fn test_period_date_fallback() {
        let mut tx = Transaction::new("t1", "p1", TransactionType::New, dec!(1));
        tx.effective_date = Some("2024-02-01".to_string());
        tx.paid_date = Some("2024-03-05".to_string());
        assert_eq!(tx.period_date(DateField::PaidDate), Some("2024-03-05"));
        assert_eq!(tx.period_date(DateField::WrittenDate), Some("2024-02-01"));
    }

    #[test]
    fn test_field_resolution() {
        let mut tx = Transaction::new("t1", "p1", TransactionType::New, dec!(500));
        tx.fields.insert("program".to_string(), FieldValue::from(json!({ "code": "X1" })));
        assert_eq!(tx.field(&path("type")), FieldValue::from("NEW"));
        assert_eq!(tx.field(&path("premiumDelta")), FieldValue::Number(dec!(500)));
        assert_eq!(tx.field(&path("fields.program.code")), FieldValue::from("X1"));
        assert_eq!(tx.field(&path("program.code")), FieldValue::from("X1"));
        assert_eq!(tx.field(&path("carrier")), FieldValue::Absent);
        assert_eq!(tx.field(&path("id.length")), FieldValue::Absent);
    }

    #[test]
    fn test_participant_fields() {
        let mut p = Participant::new("r1", "Producer", dec!(50));
        p.fields.insert("region".to_string(), FieldValue::from("West"));
        assert_eq!(p.field(&path("creditPercent")), FieldValue::Number(dec!(50)));
        assert_eq!(p.field(&path("fields.region")), FieldValue::from("West"));
        assert_eq!(p.field(&path("name")), FieldValue::Absent);
        assert_eq!(p.credit_share(), dec!(0.5));
    }
}
