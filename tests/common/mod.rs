//! Shared test utilities

use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a mock backend
pub async fn start_backend() -> MockServer {
    MockServer::start().await
}

/// Plugin generation payload as the backend returns it
#[must_use]
pub fn plugin_json(id: &str, name: &str) -> Value {
    json!({
        "pluginId": id,
        "code": format!("export default function {name}Plugin() {{}}"),
        "metadata": {
            "name": name,
            "description": format!("A {name} plugin"),
            "version": "1.0.0",
            "type": "widget",
            "dependencies": ["react"]
        }
    })
}

/// Mount a successful text reply
pub async fn mount_text_reply(server: &MockServer, reply: &str) {
    Mock::given(method("POST"))
        .and(path("/api/prompt/text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": { "response": reply }
        })))
        .mount(server)
        .await;
}

/// Mount an envelope response for plugin generation, expecting `calls` requests
pub async fn mount_plugin_envelope(server: &MockServer, envelope: Value, calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/plugin/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope))
        .expect(calls)
        .mount(server)
        .await;
}
