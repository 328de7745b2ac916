use std::sync::Arc;

use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use super::types::{AuthRequest, AuthResult, AuthToken};
use crate::config::ClientConfiguration;
use crate::error::ClientError;

/// Authentication manager.
///
/// Holds the current bearer token and performs the login exchange when none
/// is held. The check-then-authenticate-then-store sequence runs under one
/// lock, so concurrent callers sharing a manager never authenticate twice for
/// the same need and never observe a partially stored token.
#[derive(Debug)]
pub struct AuthenticationManager {
    config: Arc<ClientConfiguration>,
    client: Client,
    token: Mutex<Option<AuthToken>>,
}

impl AuthenticationManager {
    /// Creates a manager with no token held.
    #[must_use]
    pub fn new(config: Arc<ClientConfiguration>, client: Client) -> Self {
        Self {
            config,
            client,
            token: Mutex::new(None),
        }
    }

    /// Returns the held token, authenticating first if none is held.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Configuration`] if the endpoint answers 404
    /// - [`ClientError::Authentication`] if the credentials are rejected
    /// - [`ClientError::TransientServer`] / [`ClientError::ServiceUnavailable`]
    ///   for 500 / 503
    /// - [`ClientError::InvalidResponse`] if no token is in the response body
    pub async fn ensure_token(&self) -> Result<AuthToken, ClientError> {
        let mut held = self.token.lock().await;
        if let Some(token) = held.as_ref() {
            return Ok(token.clone());
        }
        let token = self.authenticate().await?;
        *held = Some(token.clone());
        Ok(token)
    }

    /// Clears the held token so the next [`ensure_token`](Self::ensure_token)
    /// authenticates again.
    pub async fn invalidate(&self) {
        let mut held = self.token.lock().await;
        if held.take().is_some() {
            debug!("bearer token invalidated");
        }
    }

    /// Replaces a token the server rejected and returns a fresh one.
    ///
    /// The held token is discarded only if it is still `rejected`; if another
    /// caller already swapped it out, that newer token is returned as is.
    ///
    /// # Errors
    ///
    /// Same as [`ensure_token`](Self::ensure_token).
    pub async fn reauthenticate(&self, rejected: &AuthToken) -> Result<AuthToken, ClientError> {
        let mut held = self.token.lock().await;
        if let Some(current) = held.as_ref()
            && current != rejected
        {
            return Ok(current.clone());
        }
        *held = None;
        debug!("bearer token rejected, reauthenticating");
        let token = self.authenticate().await?;
        *held = Some(token.clone());
        Ok(token)
    }

    /// Returns true while a token is held.
    pub async fn has_token(&self) -> bool {
        self.token.lock().await.is_some()
    }

    #[instrument(level = "debug", skip(self), fields(url = %self.config.authentication_url(), username = %self.config.username()))]
    async fn authenticate(&self) -> Result<AuthToken, ClientError> {
        let url = self.config.authentication_url();
        let username = self.config.username();

        let response = self
            .client
            .post(url)
            .json(&AuthRequest {
                username,
                password: self.config.password(),
            })
            .send()
            .await
            .map_err(|e| ClientError::transport(url, e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "authentication response");

        match status {
            StatusCode::NOT_FOUND => Err(ClientError::configuration(format!(
                "authentication endpoint not found, please check url {url}"
            ))),
            StatusCode::UNAUTHORIZED => Err(ClientError::authentication(
                username,
                "invalid username or password, please reset your password via the web interface",
            )),
            StatusCode::INTERNAL_SERVER_ERROR => Err(ClientError::transient_server(url)),
            StatusCode::SERVICE_UNAVAILABLE => Err(ClientError::service_unavailable(url)),
            s if s.is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| ClientError::transport(url, e))?;
                let token = parse_access_token(url, &body)?;
                debug!("authenticated");
                Ok(token)
            }
            s => Err(ClientError::unexpected_status(url, s.as_u16())),
        }
    }
}

/// Extracts the `accessToken` from a login response body.
fn parse_access_token(url: &str, body: &[u8]) -> Result<AuthToken, ClientError> {
    let result: AuthResult = serde_json::from_slice(body)
        .map_err(|e| ClientError::invalid_response(url, format!("malformed login response: {e}")))?;

    match result.access_token.as_deref().map(str::trim) {
        Some(token) if !token.is_empty() => Ok(AuthToken::new(token)),
        _ => {
            let reason = result.detail().map_or_else(
                || "login response did not contain an accessToken".to_string(),
                |detail| format!("login response did not contain an accessToken: {detail}"),
            );
            Err(ClientError::invalid_response(url, reason))
        }
    }
}
