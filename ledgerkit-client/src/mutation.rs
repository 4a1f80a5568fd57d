//! Mutation execution with at-most-one-in-flight and ordered invalidation.
//!
//! The "disable button while pending" UI idiom is promoted to a hard
//! invariant here: a second mutation whose affected keys overlap a pending
//! one fails fast with `AlreadyInFlight` instead of being queued, so
//! client-side races cannot double-submit a withdrawal. On success every
//! affected cache entry is refreshed before the call resolves.

use crate::cache::ResourceCache;
use crate::fetcher::ResourceFetcher;
use crate::gateway::RequestGateway;
use futures_util::future::join_all;
use ledgerkit_core::{
    ClientError, CreateAccountRequest, DepositRequest, ResourceKey, TransferRequest,
    WithdrawRequest,
};
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

/// A state-changing operation against the account service.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    CreateAccount(CreateAccountRequest),
    Deposit(DepositRequest),
    Withdraw(WithdrawRequest),
    Transfer(TransferRequest),
}

impl Operation {
    /// Service endpoint the operation posts to.
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::CreateAccount(_) => "/accounts",
            Self::Deposit(_) => "/transactions/deposit",
            Self::Withdraw(_) => "/transactions/withdraw",
            Self::Transfer(_) => "/transactions/transfer",
        }
    }

    /// Cache keys this operation may change on success.
    ///
    /// Every balance-changing operation also affects the aggregate listing,
    /// so summary views never go stale.
    pub fn affected_keys(&self) -> BTreeSet<ResourceKey> {
        let mut keys = BTreeSet::new();
        keys.insert(ResourceKey::Accounts);
        match self {
            Self::CreateAccount(_) => {}
            Self::Deposit(DepositRequest { account_number, .. })
            | Self::Withdraw(WithdrawRequest { account_number, .. }) => {
                keys.insert(ResourceKey::account(account_number.clone()));
                keys.insert(ResourceKey::transactions(account_number.clone()));
            }
            Self::Transfer(TransferRequest {
                from_account_number,
                to_account_number,
                ..
            }) => {
                keys.insert(ResourceKey::account(from_account_number.clone()));
                keys.insert(ResourceKey::transactions(from_account_number.clone()));
                keys.insert(ResourceKey::account(to_account_number.clone()));
                keys.insert(ResourceKey::transactions(to_account_number.clone()));
            }
        }
        keys
    }

    fn body(&self) -> Result<Value, ClientError> {
        let result = match self {
            Self::CreateAccount(req) => serde_json::to_value(req),
            Self::Deposit(req) => serde_json::to_value(req),
            Self::Withdraw(req) => serde_json::to_value(req),
            Self::Transfer(req) => serde_json::to_value(req),
        };
        result.map_err(ClientError::decode)
    }
}

/// An operation plus the cache keys it declares it may invalidate.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    pub operation: Operation,
    pub affected_keys: BTreeSet<ResourceKey>,
}

impl MutationRequest {
    /// Build a request with the operation's derived affected-key set.
    pub fn new(operation: Operation) -> Self {
        let affected_keys = operation.affected_keys();
        Self {
            operation,
            affected_keys,
        }
    }

    /// Declare an additional affected key.
    pub fn with_affected_key(mut self, key: ResourceKey) -> Self {
        self.affected_keys.insert(key);
        self
    }
}

/// Executes mutations and drives cache invalidation afterwards.
pub struct MutationCoordinator {
    gateway: Arc<RequestGateway>,
    cache: Arc<ResourceCache>,
    pending: Mutex<HashSet<ResourceKey>>,
}

/// Releases a mutation's reserved keys when it finishes, including when the
/// `execute` future is dropped mid-flight. Otherwise an aborted mutation
/// would leave its keys reserved and every later overlapping mutation would
/// fail `AlreadyInFlight` forever.
struct PendingGuard<'a> {
    coordinator: &'a MutationCoordinator,
    keys: &'a BTreeSet<ResourceKey>,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut pending = self
            .coordinator
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for key in self.keys {
            pending.remove(key);
        }
    }
}

impl MutationCoordinator {
    pub fn new(gateway: Arc<RequestGateway>, cache: Arc<ResourceCache>) -> Self {
        Self {
            gateway,
            cache,
            pending: Mutex::new(HashSet::new()),
        }
    }

    /// Execute a mutation.
    ///
    /// Resolves only after every affected cache entry has been refreshed,
    /// so a caller that awaits a deposit can immediately read the updated
    /// balance. On failure the cache is left untouched and the error is
    /// returned verbatim.
    pub async fn execute<F>(
        &self,
        request: MutationRequest,
        fetcher: &F,
    ) -> Result<Value, ClientError>
    where
        F: ResourceFetcher + ?Sized,
    {
        let _reserved = self.acquire(&request.affected_keys)?;
        self.run(&request, fetcher).await
    }

    async fn run<F>(&self, request: &MutationRequest, fetcher: &F) -> Result<Value, ClientError>
    where
        F: ResourceFetcher + ?Sized,
    {
        let body = request.operation.body()?;
        let response: Value = self
            .gateway
            .post_json(request.operation.endpoint(), &body)
            .await?;

        // Refresh every affected entry before resolving. A refetch failure
        // must not mask the mutation's success: the entry is left in the
        // error state, independently observable by subscribers.
        let refetches = request
            .affected_keys
            .iter()
            .map(|key| async move {
                (key, self.cache.invalidate_and_refetch(key, fetcher).await)
            });
        for (key, result) in join_all(refetches).await {
            if let Err(err) = result {
                tracing::warn!(%key, error = %err, "post-mutation refetch failed");
            }
        }

        Ok(response)
    }

    /// Reserve the affected keys, failing fast on overlap with any pending
    /// mutation. The returned guard releases them on drop.
    fn acquire<'a>(&'a self, keys: &'a BTreeSet<ResourceKey>) -> Result<PendingGuard<'a>, ClientError> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if keys.iter().any(|key| pending.contains(key)) {
            return Err(ClientError::AlreadyInFlight);
        }
        for key in keys {
            pending.insert(key.clone());
        }
        Ok(PendingGuard {
            coordinator: self,
            keys,
        })
    }
}
