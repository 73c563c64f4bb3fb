//! Typed request/response shapes for the Organizze REST API v2.
//!
//! Every monetary field crosses the wire as integer **cents** and is wrapped
//! in [`Money`] on this side of the boundary. Payload structs carry their own
//! local validation (`validate()`), so malformed requests fail before any
//! HTTP round trip.

use std::collections::BTreeMap;

pub mod account;
pub mod budget;
pub mod category;
pub mod credit_card;
pub mod invoice;
pub mod money;
pub mod summary;
pub mod transaction;
pub mod transfer;
pub mod user;

pub use money::Money;

/// Field name -> human-readable messages, as returned by the upstream 422
/// responses and by local payload validation.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Builds a single-field error map.
pub fn field_error(field: &str, message: &str) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert(field.to_string(), vec![message.to_string()]);
    errors
}

/// A transaction funding source: a bank account or a credit card.
///
/// Transfers accept only the [`Account`] variant; passing a credit card is a
/// local validation error, never a server round trip.
///
/// [`Account`]: FundingSource::Account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FundingSource {
    Account(i64),
    CreditCard(i64),
}
