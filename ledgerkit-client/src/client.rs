//! Typed facade wiring the gateway, cache, and coordinator together.

use crate::cache::{CacheEvent, ResourceCache};
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::fetcher::{HttpFetcher, ResourceFetcher};
use crate::gateway::{RequestGateway, SessionEvent};
use crate::mutation::{MutationCoordinator, MutationRequest, Operation};
use ledgerkit_core::{
    Account, AccountNumber, AccountType, ClientError, CreateAccountRequest, DepositRequest,
    ResourceKey, SignInRequest, SignInResponse, SignUpRequest, Transaction, TransferRequest,
    WithdrawRequest,
};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// Client for the remote account service.
///
/// One instance per process; UI surfaces share it. Reads go through the
/// resource cache (deduplicated, freshness-tracked), mutations through the
/// coordinator (at-most-one-in-flight, ordered invalidation).
pub struct LedgerClient {
    gateway: Arc<RequestGateway>,
    cache: Arc<ResourceCache>,
    coordinator: MutationCoordinator,
    fetcher: HttpFetcher,
    credentials: Arc<CredentialStore>,
}

impl LedgerClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let credentials = Arc::new(CredentialStore::open(&config.credential_path)?);
        let gateway = Arc::new(RequestGateway::new(config, Arc::clone(&credentials))?);
        let cache = Arc::new(ResourceCache::new());
        let coordinator = MutationCoordinator::new(Arc::clone(&gateway), Arc::clone(&cache));
        let fetcher = HttpFetcher::new(Arc::clone(&gateway));
        Ok(Self {
            gateway,
            cache,
            coordinator,
            fetcher,
            credentials,
        })
    }

    // ------------------------------------------------------------------
    // Session
    // ------------------------------------------------------------------

    /// Sign in and persist the returned token for subsequent calls.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let response: SignInResponse = self
            .gateway
            .post_json(
                "/auth/signin",
                &SignInRequest {
                    username: username.to_string(),
                    password: password.to_string(),
                },
            )
            .await?;
        self.credentials.set(&response.token)?;
        tracing::info!(username, "signed in");
        Ok(())
    }

    /// Register a new user. Does not sign in.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Value, ClientError> {
        self.gateway.post_json("/auth/signup", request).await
    }

    /// Clear the credential and drop all cached financial data.
    pub fn sign_out(&self) -> Result<(), ClientError> {
        self.credentials.clear()?;
        self.cache.clear();
        tracing::info!("signed out");
        Ok(())
    }

    /// Whether a credential is currently present.
    pub fn is_signed_in(&self) -> bool {
        self.credentials.get().is_some()
    }

    /// Session lifecycle events (termination on rejection). The UI shell
    /// subscribes and decides navigation.
    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.gateway.session_events()
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    pub async fn accounts(&self) -> Result<Vec<Account>, ClientError> {
        self.read_as(&ResourceKey::Accounts).await
    }

    pub async fn account(&self, number: &str) -> Result<Account, ClientError> {
        self.read_as(&ResourceKey::account(number)).await
    }

    pub async fn transactions(&self, number: &str) -> Result<Vec<Transaction>, ClientError> {
        self.read_as(&ResourceKey::transactions(number)).await
    }

    /// Raw cache read for a key, without a typed projection.
    pub async fn read(&self, key: &ResourceKey) -> Result<Value, ClientError> {
        self.cache.read(key, &self.fetcher).await
    }

    /// Subscribe to cache changes for a key.
    pub fn subscribe(&self, key: &ResourceKey) -> mpsc::UnboundedReceiver<CacheEvent> {
        self.cache.subscribe(key)
    }

    async fn read_as<T: serde::de::DeserializeOwned>(
        &self,
        key: &ResourceKey,
    ) -> Result<T, ClientError> {
        let value = self.cache.read(key, &self.fetcher).await?;
        serde_json::from_value(value).map_err(ClientError::decode)
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    pub async fn create_account(&self, account_type: AccountType) -> Result<Value, ClientError> {
        self.execute(Operation::CreateAccount(CreateAccountRequest { account_type }))
            .await
    }

    pub async fn deposit(
        &self,
        account_number: impl Into<AccountNumber>,
        amount: f64,
        description: Option<String>,
    ) -> Result<Value, ClientError> {
        self.execute(Operation::Deposit(DepositRequest {
            account_number: account_number.into(),
            amount,
            description,
        }))
        .await
    }

    pub async fn withdraw(
        &self,
        account_number: impl Into<AccountNumber>,
        amount: f64,
        description: Option<String>,
    ) -> Result<Value, ClientError> {
        self.execute(Operation::Withdraw(WithdrawRequest {
            account_number: account_number.into(),
            amount,
            description,
        }))
        .await
    }

    pub async fn transfer(
        &self,
        from: impl Into<AccountNumber>,
        to: impl Into<AccountNumber>,
        amount: f64,
        description: Option<String>,
    ) -> Result<Value, ClientError> {
        self.execute(Operation::Transfer(TransferRequest {
            from_account_number: from.into(),
            to_account_number: to.into(),
            amount,
            description,
        }))
        .await
    }

    /// Execute a prepared mutation request.
    pub async fn execute(&self, operation: Operation) -> Result<Value, ClientError> {
        self.execute_request(MutationRequest::new(operation)).await
    }

    /// Execute a mutation with an explicitly adjusted affected-key set.
    pub async fn execute_request(&self, request: MutationRequest) -> Result<Value, ClientError> {
        self.coordinator.execute(request, &self.fetcher).await
    }

    /// The fetcher used for cache reads, exposed for callers composing
    /// their own cache interactions.
    pub fn fetcher(&self) -> &impl ResourceFetcher {
        &self.fetcher
    }

    /// The underlying resource cache.
    pub fn cache(&self) -> &Arc<ResourceCache> {
        &self.cache
    }
}
