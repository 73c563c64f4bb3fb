//! The aggregate snapshot handed to the assistant, the charts and the
//! summary replies. Built per request and never persisted; amounts are
//! decimal reais because this is the JSON the language model reads.

use chrono::NaiveDate;
use serde::Serialize;

use crate::account::AccountType;

/// One month of financial context: balances, month-to-date transactions,
/// cards, budgets and category names.
#[derive(Clone, Debug, Serialize)]
pub struct FinancialSummary {
    /// `dd/mm/YYYY`.
    pub today: String,
    /// Portuguese month name, lowercase.
    pub month: String,
    pub year: i32,
    pub accounts: Vec<AccountSummary>,
    /// Sum of non-archived account balances.
    #[serde(rename = "totalBalance")]
    pub total_balance: f64,
    pub income: f64,
    pub expenses: f64,
    /// income - expenses.
    pub balance: f64,
    /// The 15 most recent transactions, newest first.
    #[serde(rename = "recentTransactions")]
    pub recent_transactions: Vec<TransactionSummary>,
    /// Every transaction in the reporting range, in response order.
    #[serde(rename = "allTransactions")]
    pub all_transactions: Vec<TransactionSummary>,
    #[serde(rename = "creditCards")]
    pub credit_cards: Vec<CreditCardSummary>,
    pub budgets: Vec<BudgetSummary>,
    pub categories: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AccountType,
    pub balance: f64,
}

#[derive(Clone, Debug, Serialize)]
pub struct TransactionSummary {
    pub id: i64,
    pub description: String,
    pub amount: f64,
    pub date: NaiveDate,
    /// Resolved category name; "Sem categoria" when unset.
    pub category: String,
    pub category_id: Option<i64>,
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub paid: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct CreditCardSummary {
    pub id: i64,
    pub name: String,
    pub network: String,
    pub limit: f64,
    pub closing_day: u32,
    pub due_day: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct BudgetSummary {
    pub category_id: i64,
    /// Resolved category name; "Desconhecida" when the id is unknown.
    pub category: String,
    pub amount: f64,
    pub predicted: f64,
    pub actual: f64,
}
