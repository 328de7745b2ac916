//! Bearer-token authentication against the account API.
//!
//! The [`AuthenticationManager`] owns at most one token per client. Tokens
//! carry no local expiry: a 401 from a download endpoint is the only signal
//! that a token is stale, at which point the request layer asks the manager
//! to reauthenticate.

mod manager;
mod types;

pub use manager::AuthenticationManager;
pub use types::AuthToken;
