//! Session-aware data-access layer for the ledgerkit banking client.
//!
//! This crate mediates between UI surfaces and the remote account service:
//!
//! - [`CredentialStore`] holds the bearer token durably across restarts.
//! - [`RequestGateway`] attaches the credential to every outbound call,
//!   classifies responses, and broadcasts a session-terminated event when
//!   the service rejects the session.
//! - [`ResourceCache`] keeps a deduplicated, per-key view of server
//!   resources with explicit freshness states.
//! - [`MutationCoordinator`] runs deposits, withdrawals, and transfers, and
//!   refreshes every affected cache entry before the call resolves, so the
//!   UI never renders a pre-mutation balance after an acknowledged mutation.
//! - [`LedgerClient`] wires the above into a typed facade.
//!
//! Presentation (layout, form rendering, routing) lives outside this crate;
//! it issues reads by [`ResourceKey`](ledgerkit_core::ResourceKey) and
//! mutations by operation, and renders whatever this layer returns.

pub mod cache;
pub mod client;
pub mod config;
pub mod credentials;
pub mod fetcher;
pub mod gateway;
pub mod mutation;

pub use cache::{CacheEvent, EntrySnapshot, EntryStatus, ResourceCache};
pub use client::LedgerClient;
pub use config::{ClientConfig, ConfigError};
pub use credentials::CredentialStore;
pub use fetcher::{HttpFetcher, ResourceFetcher};
pub use gateway::{RequestGateway, SessionEvent};
pub use mutation::{MutationCoordinator, MutationRequest, Operation};
