//! HTTP transport to the API endpoint
//!
//! Every request goes to the same `api.php` URL. POST bodies are form
//! encoded, GET requests carry the parameters in the query string together
//! with a `maxlag` ceiling. Replies are decoded once, here, into an
//! [`ApiReply`].

use super::cookies::CookieJar;
use crate::{
    Result,
    config::BotProfile,
    types::{ApiParams, ApiReply},
};
use async_trait::async_trait;
use reqwest::{Client, multipart};
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// A file sent as multipart form data
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Request channel used by the session and the client
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Read request: query string, `maxlag` attached
    async fn get(&self, params: &ApiParams) -> Result<ApiReply>;

    /// Write request: form encoded body
    async fn post(&self, params: &ApiParams) -> Result<ApiReply>;

    /// Write request with a file attached
    async fn post_multipart(&self, params: &ApiParams, file: FilePart) -> Result<ApiReply>;

    /// HTTP status of an arbitrary URL (used to check upload sources)
    async fn probe(&self, url: &str) -> Result<u16>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn get(&self, params: &ApiParams) -> Result<ApiReply> {
        (**self).get(params).await
    }

    async fn post(&self, params: &ApiParams) -> Result<ApiReply> {
        (**self).post(params).await
    }

    async fn post_multipart(&self, params: &ApiParams, file: FilePart) -> Result<ApiReply> {
        (**self).post_multipart(params, file).await
    }

    async fn probe(&self, url: &str) -> Result<u16> {
        (**self).probe(url).await
    }
}

/// `reqwest` based transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_url: Url,
    maxlag: u32,
    cookies: Arc<CookieJar>,
}

impl HttpTransport {
    /// Build the HTTP client for a profile
    pub fn new(profile: &BotProfile) -> Result<Self> {
        let cookies = Arc::new(match &profile.cookie_file {
            Some(path) => CookieJar::load(path),
            None => CookieJar::in_memory(),
        });

        let client = Client::builder()
            .user_agent(profile.user_agent.as_str())
            .cookie_provider(cookies.clone())
            .timeout(profile.timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: profile.api_url.clone(),
            maxlag: profile.maxlag,
            cookies,
        })
    }

    /// Endpoint URL
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Cookie jar shared with the HTTP client
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    fn with_format(params: &ApiParams) -> ApiParams {
        params.clone().set("format", "json")
    }

    async fn decode(response: reqwest::Response) -> Result<ApiReply> {
        let response = response.error_for_status()?;
        let value: serde_json::Value = response.json().await?;
        Ok(ApiReply::from_value(value))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, params: &ApiParams) -> Result<ApiReply> {
        let params = Self::with_format(params).set("maxlag", self.maxlag.to_string());
        debug!("GET {} action={:?}", self.api_url, params.action_name());

        let response = self
            .client
            .get(self.api_url.clone())
            .query(params.pairs())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post(&self, params: &ApiParams) -> Result<ApiReply> {
        let params = Self::with_format(params);
        debug!("POST {} action={:?}", self.api_url, params.action_name());

        let response = self
            .client
            .post(self.api_url.clone())
            .form(params.pairs())
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn post_multipart(&self, params: &ApiParams, file: FilePart) -> Result<ApiReply> {
        let params = Self::with_format(params);
        debug!(
            "POST (multipart, {} bytes) {} action={:?}",
            file.bytes.len(),
            self.api_url,
            params.action_name()
        );

        let mut form = multipart::Form::new();
        for (key, value) in params.pairs() {
            form = form.text(key.clone(), value.clone());
        }
        let part = multipart::Part::bytes(file.bytes).file_name(file.file_name);
        form = form.part(file.field, part);

        let response = self
            .client
            .post(self.api_url.clone())
            .multipart(form)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn probe(&self, url: &str) -> Result<u16> {
        let response = self.client.head(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::METHOD_NOT_ALLOWED {
            debug!("HEAD not allowed for {}, retrying with GET", url);
            let response = self.client.get(url).send().await?;
            return Ok(response.status().as_u16());
        }
        Ok(status.as_u16())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn transport(server: &MockServer) -> HttpTransport {
        let url = Url::parse(&format!("{}/w/api.php", server.uri())).unwrap();
        HttpTransport::new(&BotProfile::new(url, "Bot", "pw")).unwrap()
    }

    #[tokio::test]
    async fn test_get_adds_format_and_maxlag() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("format", "json"))
            .and(query_param("maxlag", "5"))
            .and(query_param("meta", "siteinfo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"query": {}})))
            .expect(1)
            .mount(&server)
            .await;

        let reply = transport(&server)
            .await
            .get(&ApiParams::query().set("meta", "siteinfo"))
            .await
            .unwrap();
        assert_eq!(reply, ApiReply::Success(json!({"query": {}})));
    }

    #[tokio::test]
    async fn test_post_is_form_encoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("action=logout"))
            .and(body_string_contains("format=json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let reply = transport(&server)
            .await
            .post(&ApiParams::action("logout"))
            .await
            .unwrap();
        assert!(!reply.is_failure());
    }

    #[tokio::test]
    async fn test_error_branch_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": "badtoken", "info": "Invalid token"}
            })))
            .mount(&server)
            .await;

        let reply = transport(&server)
            .await
            .post(&ApiParams::action("edit"))
            .await
            .unwrap();
        assert!(reply.is_failure());
    }

    #[tokio::test]
    async fn test_http_error_status_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = transport(&server)
            .await
            .get(&ApiParams::query())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::Network(_)));
    }

    #[tokio::test]
    async fn test_cookies_are_replayed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("action=login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("set-cookie", "testwikiSession=abc; path=/")
                    .set_body_json(json!({"login": {"result": "Success"}})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::header("cookie", "testwikiSession=abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let transport = transport(&server).await;
        transport.post(&ApiParams::action("login")).await.unwrap();
        assert_eq!(transport.cookies().len(), 1);

        let reply = transport.get(&ApiParams::query()).await.unwrap();
        assert_eq!(reply, ApiReply::Success(json!({"ok": true})));
    }

    #[tokio::test]
    async fn test_probe_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let status = transport(&server)
            .await
            .probe(&format!("{}/missing.png", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, 404);
    }
}
