//! Filename extraction from `Content-Disposition` and sanitization.

use std::path::{Component, Path};

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};

use crate::error::ClientError;

/// Derives the local filename for a download from its response headers.
///
/// The server names every zone file; a response without a usable
/// `Content-Disposition` filename is rejected rather than guessed at.
pub(crate) fn filename_from_headers(headers: &HeaderMap, url: &str) -> Result<String, ClientError> {
    let header = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ClientError::metadata_missing(url))?;

    let filename = parse_content_disposition(header)
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ClientError::metadata_missing(url))?;

    Ok(sanitize_filename(&filename))
}

/// Parses Content-Disposition header to extract filename.
///
/// Handles:
/// - `attachment;filename=com.txt.gz`
/// - `attachment; filename="com.txt.gz"`
/// - `attachment; filename*=UTF-8''com.txt.gz` (RFC 5987)
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    // Parameter names are case-insensitive; ASCII lowercasing keeps offsets.
    let lowered = header.to_ascii_lowercase();

    // Try filename*= first (RFC 5987 encoded)
    if let Some(pos) = lowered.find("filename*=") {
        let value = header[pos + 10..].trim();
        // Format: charset'language'encoded_value
        if let Some(quote_pos) = value.find("''") {
            let encoded = &value[quote_pos + 2..];
            let end = encoded.find(';').unwrap_or(encoded.len());
            if let Ok(decoded) = urlencoding::decode(encoded[..end].trim()) {
                return Some(decoded.into_owned());
            }
        }
    }

    let pos = lowered.find("filename=")?;
    let value = header[pos + 9..].trim();

    if let Some(stripped) = value.strip_prefix('"') {
        let end = stripped.find('"')?;
        return Some(stripped[..end].to_string());
    }

    let end = value.find(';').unwrap_or(value.len());
    let filename = value[..end].trim();
    (!filename.is_empty()).then(|| filename.to_string())
}

/// Sanitizes a server-supplied filename into a single safe path segment.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters) and rewrites `.`/`..`.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_filename_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

fn is_safe_filename_segment(name: &str) -> bool {
    !Path::new(name).components().any(|component| {
        matches!(
            component,
            Component::CurDir | Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
