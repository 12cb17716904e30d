//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

/// Test helper functions
#[allow(dead_code)]
pub mod helpers {
    use serde_json::{Value, json};
    use std::time::Duration;
    use url::Url;
    use wikibot::{BotProfile, WikiClient};
    use wiremock::matchers::{body_string_contains, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// API endpoint of a mock server
    pub fn api_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/w/api.php", server.uri())).unwrap()
    }

    /// Profile without pacing and with a short login backoff
    pub fn profile(server: &MockServer) -> BotProfile {
        BotProfile::new(api_url(server), "ExampleBot", "hunter2")
            .with_edits_per_minute(0)
            .with_login_backoff(Duration::from_millis(20))
    }

    /// Two step login that succeeds
    pub async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(body_string_contains("action=login"))
            .and(body_string_contains("lgtoken=logintoken"))
            .respond_with(json_reply(json!({
                "login": {"result": "Success", "lgusername": "ExampleBot", "lguserid": 7}
            })))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("action=login"))
            .respond_with(json_reply(json!({
                "login": {"result": "NeedToken", "token": "logintoken"}
            })))
            .mount(server)
            .await;
    }

    /// Logged-in client against a mock server
    pub async fn connect(server: &MockServer) -> WikiClient {
        mount_login(server).await;
        WikiClient::connect(profile(server)).await.unwrap()
    }

    pub fn json_reply(body: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(body)
    }

    /// Token reply for one page
    pub fn token_page(title: &str, key: &str, exists: bool) -> Value {
        let mut page = json!({
            "ns": 0,
            "title": title,
            "starttimestamp": "2024-05-01T10:00:00Z",
        });
        page[key] = json!("token+\\");
        if exists {
            page["pageid"] = json!(42);
            page["revisions"] = json!([{"timestamp": "2024-04-30T08:00:00Z"}]);
        } else {
            page["missing"] = json!("");
        }
        json!({"query": {"pages": {"42": page}}})
    }

    /// Content reply; `None` for a missing page
    pub fn content_page(title: &str, text: Option<&str>) -> Value {
        match text {
            Some(text) => json!({"query": {"pages": {"42": {
                "pageid": 42, "ns": 0, "title": title,
                "revisions": [{"*": text, "timestamp": "2024-04-30T08:00:00Z"}]
            }}}}),
            None => json!({"query": {"pages": {"-1": {"ns": 0, "title": title, "missing": ""}}}}),
        }
    }

    /// Serve a token query for `intoken=<kind>`
    pub async fn mount_token(server: &MockServer, kind: &str, reply: Value) {
        Mock::given(method("GET"))
            .and(query_param("intoken", kind))
            .respond_with(json_reply(reply))
            .mount(server)
            .await;
    }

    /// Number of POSTs whose body contains `needle`
    pub async fn posts_containing(server: &MockServer, needle: &str) -> usize {
        server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() == "POST")
            .filter(|r| String::from_utf8_lossy(&r.body).contains(needle))
            .count()
    }
}
