//! Request and response bodies

use account_core::LedgerEntry;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ===== Requests =====

#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    pub account_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TransactionRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

// ===== Responses =====

#[derive(Debug, Serialize)]
pub struct CreateAccountResponse {
    pub account_id: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub account_id: String,
    pub amount: Decimal,
    pub new_balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub account_id: String,
    pub balance: Decimal,
}

#[derive(Debug, Serialize)]
pub struct EntriesResponse {
    pub account_id: String,
    pub entries: Vec<LedgerEntry>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub accounts: u64,
    pub active_actors: usize,
}
