use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{FieldErrors, field_error, money::Money};

/// A credit card invoice. Belongs to exactly one card.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Invoice {
    pub id: i64,
    pub date: NaiveDate,
    pub starting_date: NaiveDate,
    pub closing_date: NaiveDate,
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    #[serde(rename = "payment_amount_cents", default)]
    pub payment_amount: Money,
    #[serde(rename = "balance_cents", default)]
    pub balance: Money,
    #[serde(rename = "previous_balance_cents", default)]
    pub previous_balance: Money,
}

/// Filters for the invoice listing endpoint.
#[derive(Clone, Debug, Default)]
pub struct InvoiceQuery {
    pub year: Option<i32>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl InvoiceQuery {
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(year) = self.year {
            params.push(("year", year.to_string()));
        }
        if let Some(start) = self.start_date {
            params.push(("start_date", start.to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date", end.to_string()));
        }
        params
    }
}

/// Payload for recording an invoice payment.
#[derive(Clone, Debug, Serialize)]
pub struct InvoicePayment {
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    /// Payment date; upstream defaults to today when absent.
    #[serde(rename = "date", skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<i64>,
}

impl InvoicePayment {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        if !self.amount.is_positive() {
            return Err(field_error("amount_cents", "must be greater than zero"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_payment_fields_default_to_zero() {
        let invoice: Invoice = serde_json::from_value(serde_json::json!({
            "id": 9,
            "date": "2025-02-10",
            "starting_date": "2025-01-11",
            "closing_date": "2025-02-10",
            "amount_cents": -123_400,
        }))
        .unwrap();
        assert_eq!(invoice.amount, Money::new(-123_400));
        assert_eq!(invoice.payment_amount, Money::ZERO);
        assert_eq!(invoice.previous_balance, Money::ZERO);
    }

    #[test]
    fn payment_must_be_positive() {
        let payment = InvoicePayment {
            amount: Money::ZERO,
            payment_date: None,
            account_id: None,
        };
        assert!(payment.validate().is_err());
    }

    #[test]
    fn query_params_use_iso_dates() {
        let query = InvoiceQuery {
            year: None,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2025, 6, 30),
        };
        assert_eq!(
            query.params(),
            vec![
                ("start_date", "2025-01-01".to_string()),
                ("end_date", "2025-06-30".to_string()),
            ]
        );
    }
}
