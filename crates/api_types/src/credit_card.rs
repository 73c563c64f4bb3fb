use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{FieldErrors, money::Money};

/// A credit card.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CreditCard {
    pub id: i64,
    pub name: String,
    /// Card network (visa, mastercard, ...). Free-form upstream.
    pub network: String,
    /// Invoice closing day of month (1-31).
    pub closing_day: u32,
    /// Payment due day of month (1-31).
    pub due_day: u32,
    #[serde(rename = "limit_cents")]
    pub limit: Money,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub default: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreditCardNew {
    pub name: String,
    pub network: String,
    pub closing_day: u32,
    pub due_day: u32,
    #[serde(rename = "limit_cents")]
    pub limit: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived: Option<bool>,
}

impl CreditCardNew {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if self.name.trim().is_empty() {
            errors.insert("name".to_string(), vec!["can't be blank".to_string()]);
        }
        if !(1..=31).contains(&self.closing_day) {
            errors.insert(
                "closing_day".to_string(),
                vec!["must be between 1 and 31".to_string()],
            );
        }
        if !(1..=31).contains(&self.due_day) {
            errors.insert(
                "due_day".to_string(),
                vec!["must be between 1 and 31".to_string()],
            );
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CreditCardUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_day: Option<u32>,
    #[serde(rename = "limit_cents", skip_serializing_if = "Option::is_none")]
    pub limit: Option<Money>,
    /// Date to recalculate invoices from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_invoices_since: Option<NaiveDate>,
}

impl CreditCardUpdate {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        if let Some(day) = self.closing_day
            && !(1..=31).contains(&day)
        {
            errors.insert(
                "closing_day".to_string(),
                vec!["must be between 1 and 31".to_string()],
            );
        }
        if let Some(day) = self.due_day
            && !(1..=31).contains(&day)
        {
            errors.insert(
                "due_day".to_string(),
                vec!["must be between 1 and 31".to_string()],
            );
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> CreditCardNew {
        CreditCardNew {
            name: "Nubank".to_string(),
            network: "mastercard".to_string(),
            closing_day: 28,
            due_day: 7,
            limit: Money::new(500_000),
            archived: None,
        }
    }

    #[test]
    fn valid_draft_passes() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn days_must_be_within_month_bounds() {
        let mut card = draft();
        card.closing_day = 0;
        card.due_day = 32;
        let errors = card.validate().unwrap_err();
        assert!(errors.contains_key("closing_day"));
        assert!(errors.contains_key("due_day"));
    }

    #[test]
    fn limit_serializes_as_cents() {
        let body = serde_json::to_value(&draft()).unwrap();
        assert_eq!(body["limit_cents"], serde_json::json!(500_000));
    }
}
