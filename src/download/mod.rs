//! Zone file discovery and download.
//!
//! This module provides the [`ZoneDownloader`], which lists the zone files a
//! user is approved for and streams each one to disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for multi-gigabyte zones)
//! - Filenames taken from the server's Content-Disposition header
//! - Link lists treated as sets (duplicates downloaded once)
//! - Fail-fast or best-effort batch policies
//! - Existing files with the same name are overwritten

mod batch;
mod client;
mod filename;
mod persistence;

pub use batch::{BatchFailure, BatchOutcome, BatchPolicy, DownloadedFile};
pub use client::ZoneDownloader;
