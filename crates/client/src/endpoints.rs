//! Typed wrappers for the business endpoints the portals read from.
//!
//! These carry no logic of their own; they exist so view code gets typed
//! results and every call rides the authorized path in
//! [`PortalClient`](crate::http::PortalClient).

use serde::Deserialize;

use crate::error::ApiError;
use crate::http::PortalClient;

/// An account as listed by `GET /accounts`.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    /// ISO 4217 code, e.g. `"EUR"`.
    pub currency: String,
    /// Balance in minor units (cents).
    pub balance_minor: i64,
}

/// A transaction as listed by `GET /accounts/{id}/transactions`.
#[derive(Debug, Clone, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: i64,
    /// Signed amount in minor units; negative for debits.
    pub amount_minor: i64,
    pub currency: String,
    pub description: String,
    pub booked_at: chrono::DateTime<chrono::Utc>,
}

impl PortalClient {
    /// `GET /accounts` -- accounts visible to the current session.
    pub async fn list_accounts(&self) -> Result<Vec<Account>, ApiError> {
        self.get_json("/accounts").await
    }

    /// `GET /accounts/{account_id}/transactions`.
    pub async fn list_transactions(&self, account_id: i64) -> Result<Vec<Transaction>, ApiError> {
        self.get_json(&format!("/accounts/{account_id}/transactions"))
            .await
    }
}
