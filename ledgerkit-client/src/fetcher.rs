//! Fetcher seam between the cache and the gateway.

use crate::gateway::RequestGateway;
use async_trait::async_trait;
use ledgerkit_core::{ClientError, ResourceKey};
use serde_json::Value;
use std::sync::Arc;

/// Resolves a resource key to its current server-side value.
///
/// The cache and the mutation coordinator are written against this trait so
/// tests can substitute controllable fetchers for live HTTP.
#[async_trait]
pub trait ResourceFetcher: Send + Sync {
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, ClientError>;
}

/// Production fetcher: maps each resource key to a GET through the gateway.
pub struct HttpFetcher {
    gateway: Arc<RequestGateway>,
}

impl HttpFetcher {
    pub fn new(gateway: Arc<RequestGateway>) -> Self {
        Self { gateway }
    }

    fn path(key: &ResourceKey) -> String {
        match key {
            ResourceKey::Accounts => "/accounts".to_string(),
            ResourceKey::Account(number) => format!("/accounts/{number}"),
            ResourceKey::Transactions(number) => format!("/transactions/{number}"),
        }
    }
}

#[async_trait]
impl ResourceFetcher for HttpFetcher {
    async fn fetch(&self, key: &ResourceKey) -> Result<Value, ClientError> {
        self.gateway.get_json(&Self::path(key)).await
    }
}
