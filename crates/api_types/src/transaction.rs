use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{FieldErrors, field_error, money::Money};

fn default_true() -> bool {
    true
}

/// A single transaction. Funded by exactly one of `account_id` /
/// `credit_card_id`; the upstream API never sets both.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub description: String,
    pub date: NaiveDate,
    /// Signed: negative = expense, positive = income.
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub credit_card_id: Option<i64>,
    pub notes: Option<String>,
    #[serde(default)]
    pub attachments_count: u32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default = "default_true")]
    pub paid: bool,
    pub recurrence_id: Option<i64>,
    // "oposite" is the upstream spelling.
    #[serde(rename = "oposite_transaction_id")]
    pub opposite_transaction_id: Option<i64>,
    #[serde(rename = "oposite_account_id")]
    pub opposite_account_id: Option<i64>,
}

impl Transaction {
    #[must_use]
    pub fn is_income(&self) -> bool {
        self.amount.is_positive()
    }

    #[must_use]
    pub fn is_expense(&self) -> bool {
        self.amount.is_negative()
    }

    #[must_use]
    pub fn absolute_amount(&self) -> Money {
        self.amount.abs()
    }
}

/// Filters for the transaction listing endpoint. Filtering happens
/// server-side; this type only shapes the query string.
#[derive(Clone, Debug, Default)]
pub struct TransactionQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub account_id: Option<i64>,
}

impl TransactionQuery {
    /// The default reporting range: first day of `today`'s month through
    /// `today`, inclusive.
    #[must_use]
    pub fn month_to_date(today: NaiveDate) -> Self {
        let first = today.with_day(1).unwrap_or(today);
        Self {
            start_date: Some(first),
            end_date: Some(today),
            account_id: None,
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(start) = self.start_date {
            params.push(("start_date", start.to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date", end.to_string()));
        }
        if let Some(account_id) = self.account_id {
            params.push(("account_id", account_id.to_string()));
        }
        params
    }
}

/// Payload for creating a single transaction.
#[derive(Clone, Debug, Serialize)]
pub struct TransactionNew {
    pub description: String,
    pub date: NaiveDate,
    /// Signed: negative = expense, positive = income.
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    pub category_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
}

impl TransactionNew {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.description.trim().is_empty() {
            errors.insert("description".to_string(), vec!["can't be blank".to_string()]);
        }
        if let Err(funding) = validate_funding(self.account_id, self.credit_card_id) {
            errors.extend(funding);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// A transaction must reference exactly one funding source.
fn validate_funding(account_id: Option<i64>, credit_card_id: Option<i64>) -> Result<(), FieldErrors> {
    match (account_id, credit_card_id) {
        (Some(_), Some(_)) => Err(field_error(
            "account_id",
            "can't be combined with credit_card_id",
        )),
        (None, None) => Err(field_error(
            "account_id",
            "either account_id or credit_card_id is required",
        )),
        _ => Ok(()),
    }
}

/// How often a recurring transaction repeats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Periodicity {
    Monthly,
    Yearly,
    Weekly,
    Biweekly,
    Bimonthly,
    Trimonthly,
}

/// Payload for creating a recurring transaction. Posted to the same
/// `/transactions` endpoint with the recurrence fields set.
#[derive(Clone, Debug, Serialize)]
pub struct RecurringTransactionNew {
    pub description: String,
    /// First occurrence.
    pub date: NaiveDate,
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    pub category_id: i64,
    pub periodicity: Periodicity,
    /// Number of occurrences; indefinite when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurrences: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_card_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RecurringTransactionNew {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.description.trim().is_empty() {
            errors.insert("description".to_string(), vec!["can't be blank".to_string()]);
        }
        if self.occurrences == Some(0) {
            errors.insert(
                "occurrences".to_string(),
                vec!["must be greater than zero".to_string()],
            );
        }
        if let Err(funding) = validate_funding(self.account_id, self.credit_card_id) {
            errors.extend(funding);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Partial update; only the set fields are sent.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "amount_cents", skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Which occurrences a mutation of a recurring transaction touches.
///
/// Pure pass-through: the client maps the variant to the upstream
/// `update_future`/`update_all` (or `delete_future`/`delete_all`) parameter
/// and never interprets recurrence itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RecurrenceScope {
    /// Only this occurrence.
    #[default]
    This,
    /// This and all future occurrences.
    Future,
    /// Every occurrence.
    All,
}
