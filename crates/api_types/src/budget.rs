use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::money::Money;

/// A budget goal, scoped by upstream to a (year, month).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category_id: i64,
    pub date: NaiveDate,
    #[serde(rename = "amount_cents")]
    pub amount: Money,
    /// 1 = expense goal, 2 = income goal.
    pub activity_type: u8,
    /// Projected spend for the period, already in reais.
    pub predicted: Option<f64>,
    /// Actual spend for the period, already in reais.
    pub actual: Option<f64>,
}

impl Budget {
    /// Progress towards the goal as a percentage of `amount`.
    #[must_use]
    pub fn progress_percentage(&self) -> f64 {
        if self.amount.is_zero() {
            return 0.0;
        }
        self.actual.unwrap_or(0.0) / self.amount.major() * 100.0
    }
}
