use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{FieldErrors, FundingSource, money::Money};

/// A transfer between two bank accounts. Upstream materializes it as a pair
/// of linked transactions.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Transfer {
    pub id: i64,
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub from_account_id: i64,
    pub to_account_id: i64,
    pub from_transaction_id: i64,
    pub to_transaction_id: i64,
}

/// Optional inclusive date range for list endpoints.
#[derive(Clone, Debug, Default)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(start) = self.start_date {
            params.push(("start_date", start.to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date", end.to_string()));
        }
        params
    }
}

/// Payload for creating a transfer.
///
/// Endpoints are typed as [`FundingSource`] so the bank-accounts-only rule is
/// enforced here, before any HTTP request is built.
#[derive(Clone, Debug)]
pub struct TransferNew {
    /// Must be positive.
    pub amount: Money,
    pub date: NaiveDate,
    pub from: FundingSource,
    pub to: FundingSource,
    pub description: Option<String>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
}

impl TransferNew {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if !self.amount.is_positive() {
            errors.insert(
                "amount_cents".to_string(),
                vec!["must be greater than zero".to_string()],
            );
        }
        if matches!(self.from, FundingSource::CreditCard(_)) {
            errors.insert(
                "from_account_id".to_string(),
                vec!["must be a bank account, not a credit card".to_string()],
            );
        }
        if matches!(self.to, FundingSource::CreditCard(_)) {
            errors.insert(
                "to_account_id".to_string(),
                vec!["must be a bank account, not a credit card".to_string()],
            );
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// The validated account endpoints, `(from, to)`.
    pub fn account_ids(&self) -> Option<(i64, i64)> {
        match (self.from, self.to) {
            (FundingSource::Account(from), FundingSource::Account(to)) => Some((from, to)),
            _ => None,
        }
    }
}

/// Only description, notes and tags can change after creation.
#[derive(Clone, Debug, Default, Serialize)]
pub struct TransferUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}
