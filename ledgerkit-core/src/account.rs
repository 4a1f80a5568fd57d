//! Account entity and account-creation payload.

use crate::AccountNumber;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account category offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    Savings,
    Current,
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Savings => write!(f, "SAVINGS"),
            Self::Current => write!(f, "CURRENT"),
        }
    }
}

/// Account as returned by the service.
///
/// `balance` mirrors the wire representation (a decimal number of rupees);
/// the service is the authority on rounding and overdraft rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: i64,
    pub account_number: AccountNumber,
    pub account_type: AccountType,
    pub balance: f64,
}

/// Payload for `POST /accounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAccountRequest {
    pub account_type: AccountType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_deserializes_wire_shape() {
        let json = r#"{
            "id": 7,
            "accountNumber": "ACC-1001",
            "accountType": "SAVINGS",
            "balance": 1000.0
        }"#;
        let account: Account = serde_json::from_str(json).unwrap();
        assert_eq!(account.account_number, "ACC-1001");
        assert_eq!(account.account_type, AccountType::Savings);
        assert_eq!(account.balance, 1000.0);
    }

    #[test]
    fn create_request_serializes_camel_case() {
        let req = CreateAccountRequest {
            account_type: AccountType::Current,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["accountType"], "CURRENT");
    }
}
