//! Login handshake against a mock API server

mod common;

use common::helpers::*;
use serde_json::json;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use wikibot::{AuthState, Error, WikiClient, WikiClientGeneric};
use wiremock::matchers::{body_string_contains, method};
use wiremock::{Mock, MockServer};

#[tokio::test]
async fn test_two_step_login_uses_two_posts() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    let client = assert_ok!(WikiClient::connect(profile(&server)).await);
    assert_eq!(client.auth_state(), AuthState::Authenticated);
    assert_eq!(posts_containing(&server, "action=login").await, 2);
    assert_eq!(posts_containing(&server, "lgname=ExampleBot").await, 2);
}

#[tokio::test]
async fn test_wrong_password() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("lgtoken="))
        .respond_with(json_reply(json!({"login": {"result": "WrongPass"}})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(json_reply(json!({"login": {"result": "NeedToken", "token": "t"}})))
        .mount(&server)
        .await;

    let err = assert_err!(WikiClient::connect(profile(&server)).await);
    assert!(matches!(err, Error::LoginFailed { ref reason, .. } if reason == "WrongPass"));
    assert_eq!(err.code(), 101);
}

#[tokio::test]
async fn test_throttled_login_waits_before_retrying() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("action=login"))
        .respond_with(json_reply(json!({"login": {"result": "Throttled", "wait": 5}})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_login(&server).await;

    let backoff = Duration::from_millis(100);
    let started = Instant::now();
    let client = WikiClient::connect(profile(&server).with_login_backoff(backoff))
        .await
        .unwrap();

    assert!(started.elapsed() >= backoff);
    assert!(client.is_authenticated());
    assert_eq!(posts_containing(&server, "action=login").await, 3);
}

#[tokio::test]
async fn test_login_gives_up_after_bounded_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(json_reply(json!({
            "error": {"code": "maxlag", "info": "Waiting for a database server: 9 seconds lagged"}
        })))
        .mount(&server)
        .await;

    let err = assert_err!(
        WikiClient::connect(profile(&server).with_login_attempts(3)).await
    );
    assert!(matches!(err, Error::LoginRetriesExhausted { attempts: 3 }));
    assert_eq!(posts_containing(&server, "action=login").await, 3);
}

#[tokio::test]
async fn test_login_cookies_are_saved() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("action=login"))
        .respond_with(
            json_reply(json!({"login": {"result": "Success"}}))
                .insert_header("set-cookie", "examplewikiSession=s3cr3t; path=/; HttpOnly"),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let cookie_file = dir.path().join("cookie.txt");
    let client = WikiClient::connect(profile(&server).with_cookie_file(&cookie_file))
        .await
        .unwrap();

    let saved = std::fs::read_to_string(&cookie_file).unwrap();
    assert!(saved.contains("examplewikiSession"));
    assert!(saved.contains("s3cr3t"));
    assert_eq!(client.transport().cookies().len(), 1);
}

#[tokio::test]
async fn test_close_sends_logout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_string_contains("action=logout"))
        .respond_with(json_reply(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let client = connect(&server).await;

    client.close().await;
}

#[tokio::test]
async fn test_unauthenticated_client_refuses_reads() {
    let server = MockServer::start().await;
    let client = WikiClientGeneric::with_transport(
        profile(&server),
        wikibot::HttpTransport::new(&profile(&server)).unwrap(),
    );

    let err = client.get_page("Sandbox").await.unwrap_err();
    assert!(matches!(err, Error::NotAuthenticated));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}
