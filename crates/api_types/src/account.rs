use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{FieldErrors, field_error, money::Money};

/// Closed set of account types accepted by the upstream API.
///
/// Unknown values are rejected at deserialization time instead of being
/// coerced to a default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Checking,
    Savings,
    Other,
}

/// A bank account.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    /// Balance, `default_balance` in cents on the wire.
    #[serde(rename = "default_balance")]
    pub balance: Money,
    #[serde(default)]
    pub archived: bool,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AccountNew {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    #[serde(rename = "default_balance")]
    pub balance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl AccountNew {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        if self.name.trim().is_empty() {
            return Err(field_error("name", "can't be blank"));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "default_balance", skip_serializing_if = "Option::is_none")]
    pub balance: Option<Money>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}
