//! Shared fixtures for integration tests against a mock CZDS service.

#![allow(dead_code)]

pub mod socket_guard;

use std::path::Path;

use czds_core::ClientConfiguration;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "jane@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const AUTH_PATH: &str = "/api/authenticate/";
pub const DOWNLOADS_PATH: &str = "/czds/downloads/";

/// Configuration pointing both services at the mock server.
pub fn config_for(server: &MockServer, output: &Path) -> ClientConfiguration {
    ClientConfiguration::from_base_urls(USERNAME, PASSWORD, &server.uri(), &server.uri(), output)
        .expect("mock configuration should be valid")
}

/// Mounts a login endpoint that accepts the test credentials and returns
/// `token`, expected to be called exactly `times` times.
pub async fn mount_login(server: &MockServer, token: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .and(body_json(json!({ "username": USERNAME, "password": PASSWORD })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": token })))
        .expect(times)
        .mount(server)
        .await;
}

/// A 200 response carrying a zone file attachment.
pub fn zone_response(filename: &str, body: &[u8]) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header(
            "content-disposition",
            format!("attachment;filename={filename}").as_str(),
        )
        .set_body_bytes(body.to_vec())
}

pub fn zone_path(zone: &str) -> String {
    format!("{DOWNLOADS_PATH}{zone}.zone")
}

pub fn zone_link(server: &MockServer, zone: &str) -> String {
    format!("{}{}", server.uri(), zone_path(zone))
}
