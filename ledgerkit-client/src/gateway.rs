//! Session-aware HTTP gateway.
//!
//! Every outbound call goes through here: the gateway attaches the bearer
//! credential when one is present, classifies the response into the client
//! error taxonomy, and handles session rejection. The original pattern of a
//! global client with implicit navigation side effects is reframed as an
//! explicit broadcast signal; the UI shell subscribes via
//! [`RequestGateway::session_events`] and decides navigation itself.

use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use ledgerkit_core::{ClientError, ErrorBody};
use reqwest::StatusCode;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

/// Events observable by the UI shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The service rejected the session; the credential has been cleared.
    Terminated,
}

/// HTTP gateway wrapping every outbound call to the account service.
pub struct RequestGateway {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
    session_tx: broadcast::Sender<SessionEvent>,
}

impl RequestGateway {
    pub fn new(
        config: &ClientConfig,
        credentials: Arc<CredentialStore>,
    ) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|err| ClientError::Network {
                message: err.to_string(),
            })?;
        let (session_tx, _) = broadcast::channel(16);
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            credentials,
            session_tx,
        })
    }

    /// Subscribe to session lifecycle events.
    pub fn session_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.session_tx.subscribe()
    }

    pub async fn get_json<T>(&self, path: &str) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.get(url);
        if let Some(token) = self.credentials.get() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(transport_error)?;
        self.parse_response(response).await
    }

    pub async fn post_json<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: serde::de::DeserializeOwned,
        B: serde::Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.client.post(url).json(body);
        if let Some(token) = self.credentials.get() {
            request = request.bearer_auth(token);
        }
        let response = request.send().await.map_err(transport_error)?;
        self.parse_response(response).await
    }

    async fn parse_response<T: serde::de::DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.reject_session();
            return Err(ClientError::AuthRejected);
        }
        if !status.is_success() {
            let text = response.text().await.map_err(transport_error)?;
            let message = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => body.message,
                Err(_) if text.trim().is_empty() => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
                Err(_) => text,
            };
            return Err(ClientError::Server {
                status: status.as_u16(),
                message,
            });
        }
        response.json::<T>().await.map_err(|err| {
            if err.is_decode() {
                ClientError::decode(err)
            } else {
                transport_error(err)
            }
        })
    }

    /// Clear the credential and signal termination.
    ///
    /// `take` returns `Some` only for the request that actually removed the
    /// token, so concurrent 401s clear and signal at most once.
    fn reject_session(&self) {
        if self.credentials.take().is_some() {
            tracing::info!("session rejected by service, credential cleared");
            let _ = self.session_tx.send(SessionEvent::Terminated);
        }
    }
}

fn transport_error(err: reqwest::Error) -> ClientError {
    ClientError::Network {
        message: err.to_string(),
    }
}
