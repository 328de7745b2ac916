//! Authorized GET requests with status-code classification.
//!
//! Every GET carries the current bearer token. Responses are classified in a
//! fixed priority order; a 401 triggers a single reauthentication and one
//! retry of the same request before giving up.

use std::sync::Arc;

use reqwest::{Client, Response, StatusCode};
use tracing::{debug, instrument};

use crate::auth::{AuthToken, AuthenticationManager};
use crate::config::ClientConfiguration;
use crate::error::ClientError;

/// Maximum number of reauthentications per request.
pub const MAX_REAUTHENTICATIONS: u32 = 1;

/// Upper bound on how much of a 428 body is used as the error message.
const MAX_REASON_CHARS: usize = 512;

/// Outcome class of a response status, in the order the executor checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 404
    NotFound,
    /// 403
    Forbidden,
    /// 401
    Unauthorized,
    /// 428
    PreconditionRequired,
    /// 503
    ServiceUnavailable,
    /// Any 2xx.
    Success,
    /// Anything else.
    Unexpected,
}

/// Classifies a response status for a resource GET.
#[must_use]
pub fn classify_status(status: StatusCode) -> StatusClass {
    match status {
        StatusCode::NOT_FOUND => StatusClass::NotFound,
        StatusCode::FORBIDDEN => StatusClass::Forbidden,
        StatusCode::UNAUTHORIZED => StatusClass::Unauthorized,
        StatusCode::PRECONDITION_REQUIRED => StatusClass::PreconditionRequired,
        StatusCode::SERVICE_UNAVAILABLE => StatusClass::ServiceUnavailable,
        s if s.is_success() => StatusClass::Success,
        _ => StatusClass::Unexpected,
    }
}

/// Issues authorized GET requests on behalf of the download client.
#[derive(Debug)]
pub struct RequestExecutor {
    config: Arc<ClientConfiguration>,
    client: Client,
    auth: Arc<AuthenticationManager>,
}

impl RequestExecutor {
    /// Creates an executor sharing the given authentication manager.
    #[must_use]
    pub fn new(
        config: Arc<ClientConfiguration>,
        client: Client,
        auth: Arc<AuthenticationManager>,
    ) -> Self {
        Self {
            config,
            client,
            auth,
        }
    }

    /// Issues an authorized GET and returns the response on 2xx.
    ///
    /// # Errors
    ///
    /// - [`ClientError::ResourceNotFound`] on 404
    /// - [`ClientError::AuthorizationDenied`] on 403
    /// - [`ClientError::Authentication`] when a 401 persists after
    ///   reauthenticating once, or when reauthentication itself is refused
    /// - [`ClientError::PreconditionRequired`] on 428
    /// - [`ClientError::ServiceUnavailable`] on 503
    /// - [`ClientError::UnexpectedStatus`] on any other non-2xx status
    /// - [`ClientError::Network`] / [`ClientError::Timeout`] on transport failure
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    pub async fn get(&self, url: &str) -> Result<Response, ClientError> {
        let mut token = self.auth.ensure_token().await?;
        let mut reauthentications = 0;

        loop {
            let response = self.send(url, &token).await?;
            let status = response.status();
            let class = classify_status(status);
            debug!(status = status.as_u16(), ?class, "classified response");

            match class {
                StatusClass::Success => return Ok(response),
                StatusClass::Unauthorized if reauthentications < MAX_REAUTHENTICATIONS => {
                    reauthentications += 1;
                    token = self.auth.reauthenticate(&token).await?;
                }
                StatusClass::Unauthorized => {
                    return Err(ClientError::authentication(
                        self.config.username(),
                        format!("token rejected again after reauthenticating while requesting {url}"),
                    ));
                }
                StatusClass::NotFound => return Err(ClientError::resource_not_found(url)),
                StatusClass::Forbidden => {
                    return Err(ClientError::authorization_denied(
                        self.config.username(),
                        url,
                    ));
                }
                StatusClass::PreconditionRequired => {
                    let body = response.text().await.unwrap_or_default();
                    return Err(ClientError::precondition_required(
                        precondition_reason(&body).as_deref(),
                    ));
                }
                StatusClass::ServiceUnavailable => {
                    return Err(ClientError::service_unavailable(url));
                }
                StatusClass::Unexpected => {
                    return Err(ClientError::unexpected_status(url, status.as_u16()));
                }
            }
        }
    }

    async fn send(&self, url: &str, token: &AuthToken) -> Result<Response, ClientError> {
        self.client
            .get(url)
            .bearer_auth(token.as_str())
            .send()
            .await
            .map_err(|e| ClientError::transport(url, e))
    }
}

/// Extracts a human-readable reason from a 428 body: the `message` field of a
/// JSON object, otherwise the trimmed text itself.
fn precondition_reason(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    let from_json = serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string));
    let reason = from_json.unwrap_or_else(|| trimmed.to_string());
    Some(reason.chars().take(MAX_REASON_CHARS).collect())
}
