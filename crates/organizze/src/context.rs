//! Per-request financial snapshot.
//!
//! Five listings are fetched concurrently and folded into one
//! [`FinancialSummary`]. The fetch is atomic: any failure aborts the whole
//! snapshot, so the assistant never reasons over partial data.

use std::collections::HashMap;

use api_types::{
    account::Account,
    budget::Budget,
    money::Money,
    category::Category,
    credit_card::CreditCard,
    summary::{
        AccountSummary, BudgetSummary, CreditCardSummary, FinancialSummary, TransactionSummary,
    },
    transaction::{Transaction, TransactionQuery},
};
use chrono::{Datelike, NaiveDate};

use crate::{client::Client, error::ApiError};

const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Cap on `recent_transactions`.
const RECENT_LIMIT: usize = 15;

const UNCATEGORIZED: &str = "Sem categoria";
const UNKNOWN_CATEGORY: &str = "Desconhecida";

/// The listings the snapshot is built from. [`Client`] implements this by
/// delegation; tests substitute canned data.
pub trait FinanceSource {
    async fn accounts(&self) -> Result<Vec<Account>, ApiError>;
    async fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, ApiError>;
    async fn credit_cards(&self) -> Result<Vec<CreditCard>, ApiError>;
    async fn categories(&self) -> Result<Vec<Category>, ApiError>;
    async fn budgets(&self, year: i32, month: u32) -> Result<Vec<Budget>, ApiError>;
}

impl FinanceSource for Client {
    async fn accounts(&self) -> Result<Vec<Account>, ApiError> {
        Client::accounts(self).await
    }

    async fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, ApiError> {
        Client::transactions(self, query).await
    }

    async fn credit_cards(&self) -> Result<Vec<CreditCard>, ApiError> {
        Client::credit_cards(self).await
    }

    async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        Client::categories(self).await
    }

    async fn budgets(&self, year: i32, month: u32) -> Result<Vec<Budget>, ApiError> {
        Client::budgets(self, Some(year), Some(month)).await
    }
}

/// Builds the month-to-date snapshot for `today`.
pub async fn get_financial_context<S: FinanceSource>(
    api: &S,
    today: NaiveDate,
) -> Result<FinancialSummary, ApiError> {
    let query = TransactionQuery::month_to_date(today);
    let (accounts, transactions, credit_cards, categories, budgets) = tokio::try_join!(
        api.accounts(),
        api.transactions(&query),
        api.credit_cards(),
        api.categories(),
        api.budgets(today.year(), today.month()),
    )?;

    tracing::debug!(
        accounts = accounts.len(),
        transactions = transactions.len(),
        "financial context fetched"
    );

    Ok(assemble(
        today,
        accounts,
        transactions,
        credit_cards,
        categories,
        budgets,
    ))
}

fn assemble(
    today: NaiveDate,
    accounts: Vec<Account>,
    transactions: Vec<Transaction>,
    credit_cards: Vec<CreditCard>,
    categories: Vec<Category>,
    budgets: Vec<Budget>,
) -> FinancialSummary {
    let category_names: HashMap<i64, String> = categories
        .iter()
        .map(|category| (category.id, category.name.clone()))
        .collect();

    let accounts: Vec<AccountSummary> = accounts
        .into_iter()
        .filter(|account| !account.archived)
        .map(|account| AccountSummary {
            id: account.id,
            name: account.name,
            kind: account.kind,
            balance: account.balance.major(),
        })
        .collect();
    let total_balance: f64 = accounts.iter().map(|account| account.balance).sum();

    // Summed in cents; converted to reais exactly once.
    let income: i64 = transactions
        .iter()
        .filter(|tx| tx.is_income())
        .map(|tx| tx.amount.cents())
        .sum();
    let expenses: i64 = transactions
        .iter()
        .filter(|tx| tx.is_expense())
        .map(|tx| tx.amount.cents().abs())
        .sum();

    let all_transactions: Vec<TransactionSummary> = transactions
        .into_iter()
        .map(|tx| TransactionSummary {
            id: tx.id,
            description: tx.description,
            amount: tx.amount.major(),
            date: tx.date,
            category: tx
                .category_id
                .and_then(|id| category_names.get(&id).cloned())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            category_id: tx.category_id,
            tags: tx.tags,
            notes: tx.notes,
            paid: tx.paid,
        })
        .collect();

    // Stable sort keeps response order among same-day transactions.
    let mut recent_transactions = all_transactions.clone();
    recent_transactions.sort_by(|a, b| b.date.cmp(&a.date));
    recent_transactions.truncate(RECENT_LIMIT);

    let credit_cards: Vec<CreditCardSummary> = credit_cards
        .into_iter()
        .filter(|card| !card.archived)
        .map(|card| CreditCardSummary {
            id: card.id,
            name: card.name,
            network: card.network,
            limit: card.limit.major(),
            closing_day: card.closing_day,
            due_day: card.due_day,
        })
        .collect();

    let budgets: Vec<BudgetSummary> = budgets
        .into_iter()
        .map(|budget| BudgetSummary {
            category_id: budget.category_id,
            category: category_names
                .get(&budget.category_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            amount: budget.amount.major(),
            predicted: budget.predicted.unwrap_or(0.0),
            actual: budget.actual.unwrap_or(0.0),
        })
        .collect();

    FinancialSummary {
        today: today.format("%d/%m/%Y").to_string(),
        month: MONTHS_PT[today.month0() as usize].to_string(),
        year: today.year(),
        accounts,
        total_balance,
        income: Money::new(income).major(),
        expenses: Money::new(expenses).major(),
        balance: Money::new(income - expenses).major(),
        recent_transactions,
        all_transactions,
        credit_cards,
        budgets,
        categories: category_names.into_values().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use api_types::account::AccountType;

    /// Canned-data source. Any listing can be swapped for a failure.
    struct StubApi {
        accounts: Result<Vec<Account>, ApiError>,
        transactions: Result<Vec<Transaction>, ApiError>,
        credit_cards: Result<Vec<CreditCard>, ApiError>,
        categories: Result<Vec<Category>, ApiError>,
        budgets: Result<Vec<Budget>, ApiError>,
        seen_query: Mutex<Option<TransactionQuery>>,
    }

    impl Default for StubApi {
        fn default() -> Self {
            Self {
                accounts: Ok(Vec::new()),
                transactions: Ok(Vec::new()),
                credit_cards: Ok(Vec::new()),
                categories: Ok(Vec::new()),
                budgets: Ok(Vec::new()),
                seen_query: Mutex::new(None),
            }
        }
    }

    fn clone_result<T: Clone>(result: &Result<Vec<T>, ApiError>) -> Result<Vec<T>, ApiError> {
        match result {
            Ok(items) => Ok(items.clone()),
            Err(ApiError::Auth) => Err(ApiError::Auth),
            Err(ApiError::Validation { errors }) => Err(ApiError::Validation {
                errors: errors.clone(),
            }),
            Err(ApiError::Api { status, message }) => Err(ApiError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }

    impl FinanceSource for StubApi {
        async fn accounts(&self) -> Result<Vec<Account>, ApiError> {
            clone_result(&self.accounts)
        }

        async fn transactions(
            &self,
            query: &TransactionQuery,
        ) -> Result<Vec<Transaction>, ApiError> {
            *self.seen_query.lock().unwrap() = Some(query.clone());
            clone_result(&self.transactions)
        }

        async fn credit_cards(&self) -> Result<Vec<CreditCard>, ApiError> {
            clone_result(&self.credit_cards)
        }

        async fn categories(&self) -> Result<Vec<Category>, ApiError> {
            clone_result(&self.categories)
        }

        async fn budgets(&self, _year: i32, _month: u32) -> Result<Vec<Budget>, ApiError> {
            clone_result(&self.budgets)
        }
    }

    fn account(id: i64, name: &str, cents: i64, archived: bool) -> Account {
        Account {
            id,
            name: name.to_string(),
            kind: AccountType::Checking,
            balance: Money::new(cents),
            archived,
            created_at: None,
            updated_at: None,
        }
    }

    fn transaction(id: i64, date: &str, cents: i64) -> Transaction {
        Transaction {
            id,
            description: format!("tx-{id}"),
            date: date.parse().unwrap(),
            amount: Money::new(cents),
            category_id: None,
            account_id: Some(1),
            credit_card_id: None,
            notes: None,
            attachments_count: 0,
            tags: Vec::new(),
            paid: true,
            recurrence_id: None,
            opposite_transaction_id: None,
            opposite_account_id: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 15).unwrap()
    }

    #[tokio::test]
    async fn archived_accounts_are_excluded_from_the_total() {
        let api = StubApi {
            accounts: Ok(vec![
                account(1, "Corrente", 100_000, false),
                account(2, "Antiga", 999_900, true),
            ]),
            ..StubApi::default()
        };
        let summary = get_financial_context(&api, today()).await.unwrap();
        assert_eq!(summary.total_balance, 1000.0);
        assert_eq!(summary.accounts.len(), 1);
        assert_eq!(summary.accounts[0].name, "Corrente");
    }

    #[tokio::test]
    async fn income_expenses_and_balance_are_split_by_sign() {
        let api = StubApi {
            transactions: Ok(vec![
                transaction(1, "2025-02-01", 500_000),
                transaction(2, "2025-02-02", -150_050),
            ]),
            ..StubApi::default()
        };
        let summary = get_financial_context(&api, today()).await.unwrap();
        assert_eq!(summary.income, 5000.0);
        assert_eq!(summary.expenses, 1500.50);
        assert_eq!(summary.balance, 3499.50);
    }

    #[tokio::test]
    async fn any_failed_listing_aborts_the_whole_snapshot() {
        let api = StubApi {
            accounts: Ok(vec![account(1, "Corrente", 100_000, false)]),
            budgets: Err(ApiError::Auth),
            ..StubApi::default()
        };
        let err = get_financial_context(&api, today()).await.unwrap_err();
        assert!(matches!(err, ApiError::Auth));
    }

    #[tokio::test]
    async fn default_range_is_month_to_date() {
        let api = StubApi::default();
        get_financial_context(&api, today()).await.unwrap();
        let query = clone_query(&api);
        assert_eq!(query.start_date, Some("2025-02-01".parse().unwrap()));
        assert_eq!(query.end_date, Some(today()));
        assert_eq!(query.account_id, None);
    }

    fn clone_query(api: &StubApi) -> TransactionQuery {
        api.seen_query.lock().unwrap().clone().unwrap()
    }

    #[tokio::test]
    async fn recent_is_capped_and_newest_first() {
        let mut txs = Vec::new();
        for day in 1..=20 {
            txs.push(transaction(day, &format!("2025-02-{day:02}"), -1000));
        }
        let api = StubApi {
            transactions: Ok(txs),
            ..StubApi::default()
        };
        let summary = get_financial_context(&api, today()).await.unwrap();
        assert_eq!(summary.all_transactions.len(), 20);
        assert_eq!(summary.recent_transactions.len(), 15);
        assert!(
            summary
                .recent_transactions
                .windows(2)
                .all(|pair| pair[0].date >= pair[1].date)
        );
        assert_eq!(summary.recent_transactions[0].id, 20);
    }

    #[tokio::test]
    async fn category_names_and_fallbacks_are_resolved() {
        let mut tx = transaction(1, "2025-02-10", -2000);
        tx.category_id = Some(7);
        let mut orphan = transaction(2, "2025-02-11", -3000);
        orphan.category_id = None;

        let api = StubApi {
            transactions: Ok(vec![tx, orphan]),
            categories: Ok(vec![Category {
                id: 7,
                name: "Mercado".to_string(),
                color: None,
                parent_id: None,
            }]),
            budgets: Ok(vec![Budget {
                id: 1,
                category_id: 99,
                date: "2025-02-01".parse().unwrap(),
                amount: Money::new(100_000),
                activity_type: 1,
                predicted: Some(800.0),
                actual: Some(250.0),
            }]),
            ..StubApi::default()
        };
        let summary = get_financial_context(&api, today()).await.unwrap();
        assert_eq!(summary.all_transactions[0].category, "Mercado");
        assert_eq!(summary.all_transactions[1].category, "Sem categoria");
        assert_eq!(summary.budgets[0].category, "Desconhecida");
        assert_eq!(summary.budgets[0].actual, 250.0);
    }

    #[tokio::test]
    async fn header_fields_follow_the_reporting_date() {
        let api = StubApi::default();
        let summary = get_financial_context(&api, today()).await.unwrap();
        assert_eq!(summary.today, "15/02/2025");
        assert_eq!(summary.month, "fevereiro");
        assert_eq!(summary.year, 2025);
    }
}
