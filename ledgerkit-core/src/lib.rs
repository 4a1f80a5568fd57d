//! ledgerkit Core - Domain Types
//!
//! Pure data structures with no behavior: accounts, transactions, auth
//! payloads, resource keys, and the client error taxonomy. The client crate
//! depends on this; this crate depends on no transport.

pub mod account;
pub mod auth;
pub mod error;
pub mod key;
pub mod transaction;

pub use account::{Account, AccountType, CreateAccountRequest};
pub use auth::{ErrorBody, SignInRequest, SignInResponse, SignUpRequest};
pub use error::{ClientError, ParseKeyError};
pub use key::ResourceKey;
pub use transaction::{
    DepositRequest, Transaction, TransactionKind, TransferRequest, WithdrawRequest,
};

/// Timestamp type using UTC timezone.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Server-assigned account number, opaque to the client.
pub type AccountNumber = String;
