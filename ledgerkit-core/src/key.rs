//! Resource keys: cache index and invalidation target.

use crate::error::ParseKeyError;
use crate::AccountNumber;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier for a cacheable server-backed value.
///
/// Rendered as `accounts`, `account:{number}`, or `transactions:{number}`.
/// The same key addresses a cache entry and declares an invalidation target
/// for mutations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceKey {
    /// The aggregate listing of all of the user's accounts.
    Accounts,
    /// A single account, by account number.
    Account(AccountNumber),
    /// The transaction history of a single account.
    Transactions(AccountNumber),
}

impl ResourceKey {
    /// Key for a single account.
    pub fn account(number: impl Into<AccountNumber>) -> Self {
        Self::Account(number.into())
    }

    /// Key for an account's transaction history.
    pub fn transactions(number: impl Into<AccountNumber>) -> Self {
        Self::Transactions(number.into())
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accounts => write!(f, "accounts"),
            Self::Account(number) => write!(f, "account:{number}"),
            Self::Transactions(number) => write!(f, "transactions:{number}"),
        }
    }
}

impl FromStr for ResourceKey {
    type Err = ParseKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            None if s == "accounts" => Ok(Self::Accounts),
            Some(("account", number)) if !number.is_empty() => {
                Ok(Self::Account(number.to_string()))
            }
            Some(("transactions", number)) if !number.is_empty() => {
                Ok(Self::Transactions(number.to_string()))
            }
            _ => Err(ParseKeyError {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_expected_forms() {
        assert_eq!(ResourceKey::Accounts.to_string(), "accounts");
        assert_eq!(ResourceKey::account("ACC-1").to_string(), "account:ACC-1");
        assert_eq!(
            ResourceKey::transactions("ACC-1").to_string(),
            "transactions:ACC-1"
        );
    }

    #[test]
    fn parses_each_form() {
        assert_eq!("accounts".parse::<ResourceKey>().unwrap(), ResourceKey::Accounts);
        assert_eq!(
            "account:ACC-9".parse::<ResourceKey>().unwrap(),
            ResourceKey::account("ACC-9")
        );
        assert_eq!(
            "transactions:ACC-9".parse::<ResourceKey>().unwrap(),
            ResourceKey::transactions("ACC-9")
        );
    }

    #[test]
    fn rejects_unknown_and_empty_forms() {
        assert!("balances".parse::<ResourceKey>().is_err());
        assert!("account:".parse::<ResourceKey>().is_err());
        assert!("".parse::<ResourceKey>().is_err());
    }
}
