//! CZDS Core Library
//!
//! This library provides a client for the ICANN Centralized Zone Data Service
//! (CZDS): it authenticates against the account API, discovers the zone files
//! a user is approved for, and downloads them to local storage.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`config`] - Validated client configuration
//! - [`auth`] - Bearer-token lifecycle
//! - [`request`] - Authorized GET requests and status classification
//! - [`download`] - Link discovery and streaming zone file downloads
//! - [`error`] - Error type with an explicit kind enumeration

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod download;
pub mod error;
mod http;
pub mod request;
mod user_agent;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use auth::{AuthToken, AuthenticationManager};
pub use config::{ClientConfiguration, HttpTimeouts};
pub use download::{BatchFailure, BatchOutcome, BatchPolicy, DownloadedFile, ZoneDownloader};
pub use error::{ClientError, ErrorKind};
pub use request::{MAX_REAUTHENTICATIONS, RequestExecutor, StatusClass, classify_status};
