//! Client for the Organizze REST API v2.
//!
//! One typed method per upstream operation, HTTP basic auth on every call,
//! a single bounded timeout and no retries: failures surface as one of the
//! three [`ApiError`] kinds and retry policy stays with the caller.
//!
//! [`context`] builds the per-request [`FinancialSummary`] snapshot the bot
//! hands to the assistant and the chart renderers.
//!
//! [`FinancialSummary`]: api_types::summary::FinancialSummary

pub mod client;
pub mod context;
pub mod error;

pub use client::Client;
pub use context::{FinanceSource, get_financial_context};
pub use error::ApiError;
