//! Typed operations over the Organizze REST API v2.
//!
//! Every method performs exactly one HTTP round trip. Payloads are validated
//! locally first, so a malformed draft never reaches the network.

use std::time::Duration;

use api_types::{
    FieldErrors,
    account::{Account, AccountNew, AccountUpdate},
    budget::Budget,
    category::{Category, CategoryNew, CategoryUpdate},
    credit_card::{CreditCard, CreditCardNew, CreditCardUpdate},
    invoice::{Invoice, InvoicePayment, InvoiceQuery},
    money::Money,
    transaction::{
        RecurrenceScope, RecurringTransactionNew, Transaction, TransactionNew, TransactionQuery,
        TransactionUpdate,
    },
    transfer::{DateRange, Transfer, TransferNew, TransferUpdate},
    user::User,
};
use base64::Engine;
use chrono::NaiveDate;
use reqwest::{StatusCode, header};
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ApiError;

pub const BASE_URL: &str = "https://api.organizze.com.br/rest/v2";

const USER_AGENT: &str = "organizze-bot/0.1 (github.com/btavares/organizze-bot)";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Organizze API client. Cheap to clone; the inner connection pool is
/// shared.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    /// Builds a client from the account email and API key.
    ///
    /// Credentials go into a default basic-auth header marked sensitive;
    /// they are never logged and never appear in error messages.
    pub fn new(email: &str, api_key: &str) -> Result<Self, ApiError> {
        let secret = format!("{email}:{api_key}");
        let secret = format!("Basic {}", base64::prelude::BASE64_STANDARD.encode(secret));

        let mut auth = header::HeaderValue::try_from(secret)
            .map_err(|_| ApiError::api(None, "invalid characters in credentials"))?;
        auth.set_sensitive(true);

        let mut headers = header::HeaderMap::new();
        headers.insert(header::AUTHORIZATION, auth);

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            base_url: BASE_URL.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let resp = self.http.get(self.url(path)).query(query).send().await?;
        parse_body("GET", path, resp).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        parse_body("POST", path, resp).await
    }

    async fn post_json_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<(), ApiError> {
        let resp = self.http.post(self.url(path)).json(body).send().await?;
        expect_success("POST", path, resp).await
    }

    async fn put_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let resp = self.http.put(self.url(path)).json(body).send().await?;
        parse_body("PUT", path, resp).await
    }

    async fn delete(&self, path: &str, query: &[(&str, String)]) -> Result<(), ApiError> {
        let resp = self.http.delete(self.url(path)).query(query).send().await?;
        expect_success("DELETE", path, resp).await
    }

    // ---- users ----------------------------------------------------------

    pub async fn user(&self, user_id: i64) -> Result<User, ApiError> {
        self.get_json(&format!("/users/{user_id}"), &[]).await
    }

    // ---- accounts -------------------------------------------------------

    pub async fn accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.get_json("/accounts", &[]).await
    }

    pub async fn account(&self, account_id: i64) -> Result<Account, ApiError> {
        self.get_json(&format!("/accounts/{account_id}"), &[]).await
    }

    pub async fn create_account(&self, draft: &AccountNew) -> Result<Account, ApiError> {
        draft.validate()?;
        self.post_json("/accounts", draft).await
    }

    pub async fn update_account(
        &self,
        account_id: i64,
        update: &AccountUpdate,
    ) -> Result<Account, ApiError> {
        self.put_json(&format!("/accounts/{account_id}"), update)
            .await
    }

    pub async fn delete_account(&self, account_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/accounts/{account_id}"), &[]).await
    }

    // ---- categories -----------------------------------------------------

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        self.get_json("/categories", &[]).await
    }

    pub async fn category(&self, category_id: i64) -> Result<Category, ApiError> {
        self.get_json(&format!("/categories/{category_id}"), &[])
            .await
    }

    pub async fn create_category(&self, draft: &CategoryNew) -> Result<Category, ApiError> {
        draft.validate()?;
        self.post_json("/categories", draft).await
    }

    pub async fn update_category(
        &self,
        category_id: i64,
        update: &CategoryUpdate,
    ) -> Result<Category, ApiError> {
        self.put_json(&format!("/categories/{category_id}"), update)
            .await
    }

    /// Deletes a category. When `replacement_category_id` is given, upstream
    /// reassigns the orphaned transactions to it; otherwise upstream default
    /// behavior applies.
    pub async fn delete_category(
        &self,
        category_id: i64,
        replacement_category_id: Option<i64>,
    ) -> Result<(), ApiError> {
        let mut query = Vec::new();
        if let Some(replacement) = replacement_category_id {
            query.push(("replacement_category_id", replacement.to_string()));
        }
        self.delete(&format!("/categories/{category_id}"), &query)
            .await
    }

    // ---- budgets (read-only) --------------------------------------------

    pub async fn budgets(
        &self,
        year: Option<i32>,
        month: Option<u32>,
    ) -> Result<Vec<Budget>, ApiError> {
        self.get_json(&budgets_path(year, month), &[]).await
    }

    // ---- credit cards ---------------------------------------------------

    pub async fn credit_cards(&self) -> Result<Vec<CreditCard>, ApiError> {
        self.get_json("/credit_cards", &[]).await
    }

    pub async fn credit_card(&self, card_id: i64) -> Result<CreditCard, ApiError> {
        self.get_json(&format!("/credit_cards/{card_id}"), &[])
            .await
    }

    pub async fn create_credit_card(&self, draft: &CreditCardNew) -> Result<CreditCard, ApiError> {
        draft.validate()?;
        self.post_json("/credit_cards", draft).await
    }

    pub async fn update_credit_card(
        &self,
        card_id: i64,
        update: &CreditCardUpdate,
    ) -> Result<CreditCard, ApiError> {
        update.validate()?;
        self.put_json(&format!("/credit_cards/{card_id}"), update)
            .await
    }

    pub async fn delete_credit_card(&self, card_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/credit_cards/{card_id}"), &[]).await
    }

    // ---- credit card invoices -------------------------------------------

    pub async fn invoices(
        &self,
        card_id: i64,
        query: &InvoiceQuery,
    ) -> Result<Vec<Invoice>, ApiError> {
        self.get_json(&format!("/credit_cards/{card_id}/invoices"), &query.params())
            .await
    }

    pub async fn invoice(&self, card_id: i64, invoice_id: i64) -> Result<Invoice, ApiError> {
        self.get_json(
            &format!("/credit_cards/{card_id}/invoices/{invoice_id}"),
            &[],
        )
        .await
    }

    /// Records a payment against an invoice.
    pub async fn pay_invoice(
        &self,
        card_id: i64,
        invoice_id: i64,
        payment: &InvoicePayment,
    ) -> Result<(), ApiError> {
        payment.validate()?;
        self.post_json_unit(
            &format!("/credit_cards/{card_id}/invoices/{invoice_id}/payments"),
            payment,
        )
        .await
    }

    // ---- transactions ---------------------------------------------------

    pub async fn transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, ApiError> {
        self.get_json("/transactions", &query.params()).await
    }

    pub async fn transaction(&self, transaction_id: i64) -> Result<Transaction, ApiError> {
        self.get_json(&format!("/transactions/{transaction_id}"), &[])
            .await
    }

    pub async fn create_transaction(&self, draft: &TransactionNew) -> Result<Transaction, ApiError> {
        draft.validate()?;
        self.post_json("/transactions", draft).await
    }

    pub async fn create_recurring_transaction(
        &self,
        draft: &RecurringTransactionNew,
    ) -> Result<Transaction, ApiError> {
        draft.validate()?;
        self.post_json("/transactions", draft).await
    }

    pub async fn update_transaction(
        &self,
        transaction_id: i64,
        update: &TransactionUpdate,
        scope: RecurrenceScope,
    ) -> Result<Transaction, ApiError> {
        let body = TransactionUpdateBody {
            update,
            update_future: scope == RecurrenceScope::Future,
            update_all: scope == RecurrenceScope::All,
        };
        self.put_json(&format!("/transactions/{transaction_id}"), &body)
            .await
    }

    pub async fn delete_transaction(
        &self,
        transaction_id: i64,
        scope: RecurrenceScope,
    ) -> Result<(), ApiError> {
        self.delete(&format!("/transactions/{transaction_id}"), &scope_params(scope))
            .await
    }

    // ---- transfers ------------------------------------------------------

    pub async fn transfers(&self, range: &DateRange) -> Result<Vec<Transfer>, ApiError> {
        self.get_json("/transfers", &range.params()).await
    }

    pub async fn transfer(&self, transfer_id: i64) -> Result<Transfer, ApiError> {
        self.get_json(&format!("/transfers/{transfer_id}"), &[])
            .await
    }

    /// Creates a transfer between two bank accounts. A credit-card endpoint
    /// fails validation here, without any HTTP round trip.
    pub async fn create_transfer(&self, draft: &TransferNew) -> Result<Transfer, ApiError> {
        draft.validate()?;
        let (from_account_id, to_account_id) = draft
            .account_ids()
            .ok_or_else(|| ApiError::api(None, "transfer endpoints must be bank accounts"))?;

        let body = TransferBody {
            amount_cents: draft.amount,
            date: draft.date,
            from_account_id,
            to_account_id,
            description: draft.description.as_deref(),
            notes: draft.notes.as_deref(),
            tags: &draft.tags,
        };
        self.post_json("/transfers", &body).await
    }

    pub async fn update_transfer(
        &self,
        transfer_id: i64,
        update: &TransferUpdate,
    ) -> Result<Transfer, ApiError> {
        self.put_json(&format!("/transfers/{transfer_id}"), update)
            .await
    }

    pub async fn delete_transfer(&self, transfer_id: i64) -> Result<(), ApiError> {
        self.delete(&format!("/transfers/{transfer_id}"), &[]).await
    }
}

#[derive(Serialize)]
struct TransactionUpdateBody<'a> {
    #[serde(flatten)]
    update: &'a TransactionUpdate,
    #[serde(skip_serializing_if = "is_false")]
    update_future: bool,
    #[serde(skip_serializing_if = "is_false")]
    update_all: bool,
}

#[derive(Serialize)]
struct TransferBody<'a> {
    amount_cents: Money,
    date: NaiveDate,
    from_account_id: i64,
    to_account_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "<[_]>::is_empty")]
    tags: &'a [String],
}

fn is_false(value: &bool) -> bool {
    !*value
}

fn budgets_path(year: Option<i32>, month: Option<u32>) -> String {
    match (year, month) {
        (Some(year), Some(month)) => format!("/budgets/{year}/{month}"),
        (Some(year), None) => format!("/budgets/{year}"),
        // A month without a year is meaningless upstream; fall back to the
        // current-period listing.
        _ => "/budgets".to_string(),
    }
}

fn scope_params(scope: RecurrenceScope) -> Vec<(&'static str, String)> {
    match scope {
        RecurrenceScope::This => Vec::new(),
        RecurrenceScope::Future => vec![("delete_future", "true".to_string())],
        RecurrenceScope::All => vec![("delete_all", "true".to_string())],
    }
}

async fn parse_body<T: DeserializeOwned>(
    method: &str,
    path: &str,
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    tracing::debug!(method, path, %status, "organizze request");
    if status.is_success() {
        return Ok(resp.json::<T>().await?);
    }
    Err(error_for(method, path, status, resp).await)
}

async fn expect_success(method: &str, path: &str, resp: reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    tracing::debug!(method, path, %status, "organizze request");
    if status.is_success() {
        return Ok(());
    }
    Err(error_for(method, path, status, resp).await)
}

async fn error_for(
    method: &str,
    path: &str,
    status: StatusCode,
    resp: reqwest::Response,
) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Auth,
        StatusCode::UNPROCESSABLE_ENTITY => {
            let errors = match resp.json::<serde_json::Value>().await {
                Ok(body) => field_errors_from_body(&body),
                Err(_) => FieldErrors::new(),
            };
            ApiError::Validation { errors }
        }
        _ => {
            tracing::error!(method, path, %status, "organizze API error");
            ApiError::api(Some(status), format!("API request failed: {status}"))
        }
    }
}

/// Extracts field errors from a 422 body.
///
/// Upstream usually wraps them as `{"errors": {"field": ["msg"]}}` but has
/// been seen returning the bare map as well; both shapes are accepted.
fn field_errors_from_body(body: &serde_json::Value) -> FieldErrors {
    let map = match body.get("errors") {
        Some(serde_json::Value::Object(errors)) => errors,
        _ => match body {
            serde_json::Value::Object(errors) => errors,
            _ => return FieldErrors::new(),
        },
    };

    let mut errors = FieldErrors::new();
    for (field, messages) in map {
        let messages = match messages {
            serde_json::Value::Array(items) => items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            serde_json::Value::String(message) => vec![message.clone()],
            _ => continue,
        };
        errors.insert(field.clone(), messages);
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn budgets_path_variants() {
        assert_eq!(budgets_path(None, None), "/budgets");
        assert_eq!(budgets_path(Some(2025), None), "/budgets/2025");
        assert_eq!(budgets_path(Some(2025), Some(2)), "/budgets/2025/2");
        assert_eq!(budgets_path(None, Some(2)), "/budgets");
    }

    #[test]
    fn delete_scope_maps_to_upstream_params() {
        assert!(scope_params(RecurrenceScope::This).is_empty());
        assert_eq!(
            scope_params(RecurrenceScope::Future),
            vec![("delete_future", "true".to_string())]
        );
        assert_eq!(
            scope_params(RecurrenceScope::All),
            vec![("delete_all", "true".to_string())]
        );
    }

    #[test]
    fn update_scope_maps_to_body_flags() {
        let update = TransactionUpdate {
            description: Some("Mercado".to_string()),
            ..TransactionUpdate::default()
        };
        let body = TransactionUpdateBody {
            update: &update,
            update_future: true,
            update_all: false,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({"description": "Mercado", "update_future": true})
        );
    }

    #[test]
    fn field_errors_accept_wrapped_and_bare_bodies() {
        let wrapped = json!({"errors": {"name": ["can't be blank"]}});
        let bare = json!({"name": ["can't be blank"]});
        for body in [wrapped, bare] {
            let errors = field_errors_from_body(&body);
            assert_eq!(errors["name"], vec!["can't be blank".to_string()]);
        }
    }

    #[test]
    fn field_errors_from_junk_are_empty() {
        assert!(field_errors_from_body(&json!("boom")).is_empty());
        assert!(field_errors_from_body(&json!({"errors": "boom"})).is_empty());
    }

    #[test]
    fn transfer_body_carries_only_account_endpoints() {
        let body = TransferBody {
            amount_cents: Money::new(10_000),
            date: NaiveDate::from_ymd_opt(2025, 2, 15).unwrap(),
            from_account_id: 1,
            to_account_id: 2,
            description: None,
            notes: None,
            tags: &[],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(
            value,
            json!({
                "amount_cents": 10_000,
                "date": "2025-02-15",
                "from_account_id": 1,
                "to_account_id": 2,
            })
        );
    }
}
