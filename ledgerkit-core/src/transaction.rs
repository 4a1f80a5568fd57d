//! Transaction entity and mutation payloads.

use crate::{AccountNumber, Timestamp};
use serde::{Deserialize, Serialize};

/// Direction/category of a ledger transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    TransferIn,
    TransferOut,
}

/// Transaction as returned by `GET /transactions/{accountNumber}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: Option<String>,
    pub transaction_date: Timestamp,
}

/// Payload for `POST /transactions/deposit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRequest {
    pub account_number: AccountNumber,
    pub amount: f64,
    pub description: Option<String>,
}

/// Payload for `POST /transactions/withdraw`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    pub account_number: AccountNumber,
    pub amount: f64,
    pub description: Option<String>,
}

/// Payload for `POST /transactions/transfer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub from_account_number: AccountNumber,
    pub to_account_number: AccountNumber,
    pub amount: f64,
    pub description: Option<String>,
}
