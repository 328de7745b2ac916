//! Integration tests for zone file discovery and download.
//!
//! These tests verify the full flow (login, link list, authorized GET, save)
//! against a mock CZDS service.

use std::fs;

use serde_json::json;
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use czds_core::error::DEFAULT_PRECONDITION_MESSAGE;
use czds_core::{BatchPolicy, ErrorKind, HttpTimeouts, ZoneDownloader};
mod support;
use support::socket_guard::start_mock_server_or_skip;
use support::{
    AUTH_PATH, DOWNLOADS_PATH, config_for, mount_login, zone_link, zone_path, zone_response,
};

const ZONE_BODY: &[u8] = b"aaa.\t86400\tIN\tSOA\tns1.aaa. hostmaster.aaa. 1 7200 900 1209600 86400\n";

fn links_path() -> String {
    format!("{DOWNLOADS_PATH}links")
}

#[tokio::test]
async fn test_download_zone_saves_named_file() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .and(header("authorization", "Bearer t1"))
        .respond_with(zone_response("aaa.txt.gz", ZONE_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let file = assert_ok!(downloader.download_zone(" aaa ").await);

    let expected = temp_dir.path().join("zonefiles").join("aaa.txt.gz");
    assert!(file.path.is_absolute());
    assert_eq!(file.path, std::path::absolute(&expected).unwrap());
    assert_eq!(file.source_filename, "aaa.txt.gz");
    assert_eq!(file.source_url, zone_link(&mock_server, "aaa"));
    assert_eq!(file.bytes_written, ZONE_BODY.len() as u64);
    assert_eq!(fs::read(&expected).unwrap(), ZONE_BODY);
}

#[tokio::test]
async fn test_download_zone_forbidden_is_authorization_denied() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    Mock::given(method("GET"))
        .and(path(zone_path("aaaa")))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let err = assert_err!(downloader.download_zone("aaaa").await);
    assert_eq!(err.kind(), ErrorKind::AuthorizationDenied);
    assert!(err.to_string().contains("jane@example.com"));

    let zonefiles = temp_dir.path().join("zonefiles");
    assert!(!zonefiles.exists() || fs::read_dir(&zonefiles).unwrap().next().is_none());
}

#[tokio::test]
async fn test_download_zone_status_mapping() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    let cases = [
        ("missing", 404_u16, ErrorKind::ResourceNotFound),
        ("busy", 503, ErrorKind::ServiceUnavailable),
        ("teapot", 418, ErrorKind::UnexpectedStatus),
        ("terms", 428, ErrorKind::PreconditionRequired),
    ];
    for (zone, status, _) in cases {
        Mock::given(method("GET"))
            .and(path(zone_path(zone)))
            .respond_with(ResponseTemplate::new(status))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    for (zone, status, kind) in cases {
        let err = assert_err!(downloader.download_zone(zone).await);
        assert_eq!(err.kind(), kind, "status {status} for zone {zone}");
    }
}

#[tokio::test]
async fn test_precondition_required_carries_server_message() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    Mock::given(method("GET"))
        .and(path(links_path()))
        .respond_with(
            ResponseTemplate::new(428)
                .set_body_json(json!({ "message": "Please accept the updated terms" })),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .respond_with(ResponseTemplate::new(428))
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();

    let err = assert_err!(downloader.download_all().await);
    assert_eq!(err.kind(), ErrorKind::PreconditionRequired);
    assert!(err.to_string().contains("Please accept the updated terms"));

    let err = assert_err!(downloader.download_zone("aaa").await);
    assert_eq!(err.kind(), ErrorKind::PreconditionRequired);
    assert!(err.to_string().contains(DEFAULT_PRECONDITION_MESSAGE));
}

#[tokio::test]
async fn test_missing_content_disposition_is_metadata_missing() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(ZONE_BODY.to_vec()))
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let err = assert_err!(downloader.download_zone("aaa").await);
    assert_eq!(err.kind(), ErrorKind::MetadataMissing);
    assert!(!temp_dir.path().join("zonefiles").join("aaa.zone").exists());
}

#[tokio::test]
async fn test_download_overwrites_existing_file() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    let zonefiles = temp_dir.path().join("zonefiles");
    fs::create_dir_all(&zonefiles).unwrap();
    fs::write(zonefiles.join("aaa.zone"), b"stale content that is longer than the new one").unwrap();

    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .respond_with(zone_response("aaa.zone", b"fresh"))
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    assert_ok!(downloader.download_zone("aaa").await);
    assert_eq!(fs::read(zonefiles.join("aaa.zone")).unwrap(), b"fresh");
    assert_eq!(fs::read_dir(&zonefiles).unwrap().count(), 1);
}

#[tokio::test]
async fn test_download_all_with_empty_link_list() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    Mock::given(method("GET"))
        .and(path(links_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let files = assert_ok!(downloader.download_all().await);
    assert!(files.is_empty());
}

#[tokio::test]
async fn test_download_all_fetches_duplicate_links_once() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    let aaa = zone_link(&mock_server, "aaa");
    let bbb = zone_link(&mock_server, "bbb");
    Mock::given(method("GET"))
        .and(path(links_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([aaa, bbb, aaa])))
        .expect(1)
        .mount(&mock_server)
        .await;
    for zone in ["aaa", "bbb"] {
        Mock::given(method("GET"))
            .and(path(zone_path(zone)))
            .respond_with(zone_response(&format!("{zone}.zone"), ZONE_BODY))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let files = assert_ok!(downloader.download_all().await);
    let names: Vec<_> = files.iter().map(|f| f.source_filename.as_str()).collect();
    assert_eq!(names, vec!["aaa.zone", "bbb.zone"]);
}

#[tokio::test]
async fn test_rejected_token_reauthenticates_once_and_retries() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "t1" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path(AUTH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "accessToken": "t2" })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .and(header("authorization", "Bearer t1"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .and(header("authorization", "Bearer t2"))
        .respond_with(zone_response("aaa.zone", ZONE_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let file = assert_ok!(downloader.download_zone("aaa").await);
    assert_eq!(fs::read(&file.path).unwrap(), ZONE_BODY);

    let token = assert_ok!(downloader.authentication().ensure_token().await);
    assert_eq!(token.as_str(), "t2");
}

#[tokio::test]
async fn test_persistent_unauthorized_gives_up_after_one_retry() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 2).await;

    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let err = assert_err!(downloader.download_zone("aaa").await);
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn test_best_effort_continues_past_failures() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    let links = json!([
        zone_link(&mock_server, "aaa"),
        zone_link(&mock_server, "bbb"),
        zone_link(&mock_server, "ccc"),
    ]);
    Mock::given(method("GET"))
        .and(path(links_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(links))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path("bbb")))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;
    for zone in ["aaa", "ccc"] {
        Mock::given(method("GET"))
            .and(path(zone_path(zone)))
            .respond_with(zone_response(&format!("{zone}.zone"), ZONE_BODY))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let outcome = assert_ok!(
        downloader
            .download_all_with_policy(BatchPolicy::BestEffort)
            .await
    );
    assert_eq!(outcome.completed(), 2);
    assert_eq!(outcome.failed(), 1);
    assert_eq!(outcome.failures[0].url, zone_link(&mock_server, "bbb"));
    assert_eq!(
        outcome.failures[0].error.kind(),
        ErrorKind::AuthorizationDenied
    );
}

#[tokio::test]
async fn test_fail_fast_stops_at_first_failure() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .respond_with(zone_response("aaa.zone", ZONE_BODY))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path("bbb")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path(zone_path("ccc")))
        .respond_with(zone_response("ccc.zone", ZONE_BODY))
        .expect(0)
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let err = assert_err!(
        downloader
            .download_zones(&["aaa", "bbb", "ccc"], BatchPolicy::FailFast)
            .await
    );
    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
    assert!(temp_dir.path().join("zonefiles").join("aaa.zone").exists());
}

#[tokio::test]
async fn test_list_links_rejects_malformed_body() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    Mock::given(method("GET"))
        .and(path(links_path()))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let downloader = ZoneDownloader::new(config_for(&mock_server, temp_dir.path())).unwrap();
    let err = assert_err!(downloader.list_links().await);
    assert_eq!(err.kind(), ErrorKind::InvalidResponse);
}

#[tokio::test]
async fn test_truncated_stream_removes_partial_file() {
    let Some(mock_server) = start_mock_server_or_skip().await else {
        return;
    };
    let temp_dir = TempDir::new().unwrap();
    mount_login(&mock_server, "t1", 1).await;

    Mock::given(method("GET"))
        .and(path(zone_path("aaa")))
        .respond_with(
            zone_response("aaa.zone", b"0123456789").insert_header("content-length", "100000"),
        )
        .mount(&mock_server)
        .await;

    let config =
        config_for(&mock_server, temp_dir.path()).with_timeouts(HttpTimeouts::from_secs(1, 1));
    let downloader = ZoneDownloader::new(config).unwrap();
    let err = assert_err!(downloader.download_zone("aaa").await);
    assert!(
        matches!(err.kind(), ErrorKind::Network | ErrorKind::Timeout),
        "unexpected kind: {:?}",
        err.kind()
    );
    assert!(!temp_dir.path().join("zonefiles").join("aaa.zone").exists());
}
