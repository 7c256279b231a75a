//! HTTP client for the generation backend

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use super::envelope::{Envelope, decode};
use super::{
    Gateway, HEALTH_PATH, PLUGIN_GENERATE_PATH, PLUGIN_LIST_PATH, PLUGIN_SERVE_PATH,
    TEXT_PROMPT_PATH,
};
use crate::plugins::GeneratedPlugin;
use crate::{Error, Result};

/// Gateway backed by the JSON-over-HTTP backend service
#[derive(Debug, Clone)]
pub struct HttpGateway {
    /// HTTP client
    client: Client,
    /// Base URL of the backend (e.g., <http://127.0.0.1:8000>)
    base_url: Url,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TextPromptRequest<'a> {
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TextPromptResponse {
    response: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PluginGenerationRequest<'a> {
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct PluginSourceResponse {
    code: String,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    detail: String,
}

impl HttpGateway {
    /// Create a gateway for the given base URL
    ///
    /// No timeout is set; a hung backend blocks the call until the
    /// connection is dropped.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL is not an http(s) URL
    pub fn new(base_url: &str) -> Result<Self> {
        Self::build(base_url, None)
    }

    /// Create a gateway whose transport gives up after `timeout`
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client cannot be built
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::build(base_url, Some(timeout))
    }

    fn build(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url,
        })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Check that the backend is up, returning its reported status
    ///
    /// # Errors
    ///
    /// Returns `TransportUnavailable` if the backend cannot be reached
    pub async fn health(&self) -> Result<String> {
        let url = self.endpoint(HEALTH_PATH, &[])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::RemoteApplication(format!(
                "health check returned HTTP {status}"
            )));
        }

        let body = self.read_body(response).await?;
        let health: HealthResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::MalformedResponse(format!("invalid health response: {e}")))?;
        Ok(health.status)
    }

    /// Fetch the source of a plugin held by the backend
    ///
    /// Returns `None` if the backend does not know the plugin.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached or reports a failure
    pub async fn plugin_source(&self, plugin_id: &str) -> Result<Option<String>> {
        let url = self.endpoint(PLUGIN_SERVE_PATH, &[plugin_id])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            tracing::debug!(plugin_id, "backend has no source for plugin");
            return Ok(None);
        }

        let body = self.read_body(response).await?;
        if !status.is_success() {
            let message = serde_json::from_slice::<ErrorDetail>(&body)
                .map_or_else(|_| format!("HTTP {status}"), |d| d.detail);
            return Err(Error::RemoteApplication(message));
        }

        let source: PluginSourceResponse = serde_json::from_slice(&body)
            .map_err(|e| Error::MalformedResponse(format!("invalid plugin source: {e}")))?;
        Ok(Some(source.code))
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path, &[])?;
        tracing::debug!(%url, "POST");

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.unwrap_envelope(response).await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.endpoint(path, &[])?;
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.unwrap_envelope(response).await
    }

    /// Decode a 2xx envelope; any other status is a remote failure carrying
    /// the envelope's `error` when present, else the status
    async fn unwrap_envelope<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();
        let body = self.read_body(response).await?;

        if status.is_success() {
            return decode(&body);
        }

        let message = serde_json::from_slice::<Envelope<serde_json::Value>>(&body)
            .ok()
            .and_then(|envelope| envelope.error)
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| format!("HTTP {status}"));
        tracing::debug!(%status, %message, "backend returned an error status");
        Err(Error::RemoteApplication(message))
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>> {
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| self.transport_error(e))
    }

    fn endpoint(&self, path: &str, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut parts = url.path_segments_mut().map_err(|()| {
                Error::Config(format!("backend URL cannot be a base: {}", self.base_url))
            })?;
            parts.pop_if_empty();
            parts.extend(path.split('/').filter(|s| !s.is_empty()));
            parts.extend(segments);
        }
        Ok(url)
    }

    fn transport_error(&self, e: reqwest::Error) -> Error {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            Error::TransportUnavailable(format!(
                "backend service is not reachable at {}; make sure it is running ({e})",
                self.base_url
            ))
        } else if e.is_body() || e.is_decode() {
            Error::MalformedResponse(e.to_string())
        } else {
            Error::Http(e)
        }
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn send_text_prompt(&self, prompt: &str, user_id: Option<&str>) -> Result<String> {
        let request = TextPromptRequest { prompt, user_id };
        let reply: TextPromptResponse = self.post(TEXT_PROMPT_PATH, &request).await?;
        Ok(reply.response)
    }

    async fn generate_plugin(
        &self,
        description: &str,
        user_id: Option<&str>,
    ) -> Result<GeneratedPlugin> {
        let request = PluginGenerationRequest {
            description,
            user_id,
        };
        self.post(PLUGIN_GENERATE_PATH, &request).await
    }

    async fn list_plugins(&self) -> Result<Vec<GeneratedPlugin>> {
        self.get(PLUGIN_LIST_PATH).await
    }
}

/// Parse and check a backend base URL
///
/// # Errors
///
/// Returns a configuration error unless the URL is absolute http or https
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("invalid backend URL {raw:?}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::Config(format!(
            "backend URL must be http or https, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::ErrorKind;
    use crate::plugins::PluginType;

    fn gateway_for(server: &MockServer) -> HttpGateway {
        HttpGateway::new(&server.uri()).expect("gateway")
    }

    fn generated_json() -> serde_json::Value {
        json!({
            "pluginId": "test-plugin-123",
            "code": "function TestPlugin() { return <div>Test Plugin</div>; }",
            "metadata": {
                "name": "Test Plugin",
                "description": "A test plugin",
                "version": "1.0.0",
                "type": "component"
            }
        })
    }

    #[test]
    fn rejects_non_http_base_url() {
        assert!(parse_base_url("ftp://example.com").is_err());
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url(" http://127.0.0.1:8000 ").is_ok());
    }

    #[test]
    fn endpoint_joins_paths() {
        let gateway = HttpGateway::new("http://localhost:8000/backend/").unwrap();
        let url = gateway.endpoint(PLUGIN_SERVE_PATH, &["a b"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/backend/api/plugin/serve/a%20b"
        );
    }

    #[tokio::test]
    async fn send_text_prompt_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_PROMPT_PATH))
            .and(body_json(json!({ "prompt": "Test prompt", "userId": "user123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "response": "Mock AI response for testing" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = gateway_for(&server)
            .send_text_prompt("Test prompt", Some("user123"))
            .await
            .unwrap();
        assert_eq!(reply, "Mock AI response for testing");
    }

    #[tokio::test]
    async fn send_text_prompt_omits_missing_user_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_PROMPT_PATH))
            .and(body_json(json!({ "prompt": "test" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": { "response": "ok" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = gateway_for(&server).send_text_prompt("test", None).await;
        tokio_test::assert_ok!(reply);
    }

    #[tokio::test]
    async fn send_text_prompt_application_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_PROMPT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": false,
                "error": "API Error"
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .send_text_prompt("test", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteApplication);
        assert!(err.to_string().contains("API Error"));
    }

    #[tokio::test]
    async fn error_status_with_envelope_keeps_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_PROMPT_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": false,
                "error": "model overloaded"
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .send_text_prompt("test", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RemoteApplication(ref m) if m == "model overloaded"));
    }

    #[tokio::test]
    async fn error_status_without_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_PROMPT_PATH))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .send_text_prompt("test", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteApplication);
        assert!(err.to_string().contains("502"));
    }

    #[tokio::test]
    async fn error_status_with_success_envelope_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_PROMPT_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "success": true,
                "data": { "response": "from a 500" }
            })))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .send_text_prompt("test", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteApplication);
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn error_status_with_empty_error_uses_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PLUGIN_LIST_PATH))
            .respond_with(
                ResponseTemplate::new(503).set_body_json(json!({ "success": false, "error": "" })),
            )
            .mount(&server)
            .await;

        let err = gateway_for(&server).list_plugins().await.unwrap_err();
        assert!(matches!(err, Error::RemoteApplication(ref m) if m.contains("503")));
    }

    #[tokio::test]
    async fn success_without_data_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_PROMPT_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .send_text_prompt("test", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_unavailable() {
        // Bind then drop a listener so the port is known to be closed
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let gateway = HttpGateway::new(&format!("http://127.0.0.1:{port}")).unwrap();

        let err = gateway.send_text_prompt("test", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportUnavailable);
        assert!(err.to_string().contains("not reachable"));
    }

    #[tokio::test]
    async fn transport_timeout_is_transport_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(TEXT_PROMPT_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "data": { "response": "late" } }))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let gateway = HttpGateway::with_timeout(&server.uri(), Duration::from_millis(100)).unwrap();
        let err = gateway.send_text_prompt("test", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TransportUnavailable);
    }

    #[tokio::test]
    async fn generate_plugin_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(PLUGIN_GENERATE_PATH))
            .and(body_json(json!({ "description": "Test plugin", "userId": "user123" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": generated_json()
            })))
            .mount(&server)
            .await;

        let generated = gateway_for(&server)
            .generate_plugin("Test plugin", Some("user123"))
            .await
            .unwrap();
        assert_eq!(generated.plugin_id, "test-plugin-123");
        assert_eq!(generated.metadata.kind, PluginType::Component);
    }

    #[tokio::test]
    async fn generate_plugin_with_invalid_type_is_malformed() {
        let server = MockServer::start().await;
        let mut data = generated_json();
        data["metadata"]["type"] = json!("service");
        Mock::given(method("POST"))
            .and(path(PLUGIN_GENERATE_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data })),
            )
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .generate_plugin("Test plugin", None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[tokio::test]
    async fn list_plugins_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PLUGIN_LIST_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": [generated_json()]
            })))
            .mount(&server)
            .await;

        let plugins = gateway_for(&server).list_plugins().await.unwrap();
        assert_eq!(plugins.len(), 1);
        assert_eq!(plugins[0].plugin_id, "test-plugin-123");
    }

    #[tokio::test]
    async fn list_plugins_empty_is_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PLUGIN_LIST_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": [] })),
            )
            .mount(&server)
            .await;

        let plugins = gateway_for(&server).list_plugins().await.unwrap();
        assert!(plugins.is_empty());
    }

    #[tokio::test]
    async fn health_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(HEALTH_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "healthy" })))
            .mount(&server)
            .await;

        assert_eq!(gateway_for(&server).health().await.unwrap(), "healthy");
    }

    #[tokio::test]
    async fn plugin_source_found_and_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plugin/serve/timer-001"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "code": "export default 1" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/plugin/serve/missing"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({ "detail": "Plugin not found" })),
            )
            .mount(&server)
            .await;

        let gateway = gateway_for(&server);
        assert_eq!(
            gateway.plugin_source("timer-001").await.unwrap().as_deref(),
            Some("export default 1")
        );
        assert!(gateway.plugin_source("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn plugin_source_server_error_uses_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/plugin/serve/broken"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({ "detail": "disk full" })),
            )
            .mount(&server)
            .await;

        let err = gateway_for(&server)
            .plugin_source("broken")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RemoteApplication(ref m) if m == "disk full"));
    }
}
