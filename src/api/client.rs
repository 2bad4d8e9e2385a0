use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use super::types::{
    AudioUpload, ChatRequest, Message, NewSessionRequest, Role, Session, SummaryResponse,
};
use crate::config::{BackendConfig, LanguagePair, Preferences};
use crate::error::ApiError;

pub const SESSION_HEADER: &str = "X-Session-ID";
pub const GEMINI_KEY_HEADER: &str = "X-Gemini-API-Key";
pub const OPENAI_KEY_HEADER: &str = "X-OpenAI-API-Key";

/// HTTP side of the backend contract.
///
/// The active session id is registered once via [`BackendClient::set_session_id`]
/// and attached to every later request; API keys are re-read from preferences
/// on each request so edits in the settings panel apply immediately.
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    preferences: Preferences,
    session_id: ArcSwapOption<String>,
}

impl BackendClient {
    pub fn new(config: &BackendConfig, preferences: Preferences) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: "client init",
                source,
            })?;
        Ok(Self::with_http(http, &config.base_url, preferences))
    }

    pub fn with_http(http: reqwest::Client, base_url: &str, preferences: Preferences) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            preferences,
            session_id: ArcSwapOption::empty(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn set_session_id(&self, session_id: &str) {
        self.session_id.store(Some(Arc::new(session_id.to_string())));
    }

    pub fn session_id(&self) -> Option<String> {
        self.session_id.load_full().map(|id| String::clone(&id))
    }

    /// Absolute URL for a backend-relative path such as a message `audio_url`.
    pub fn resolve(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        let origin = url::Url::parse(&self.base_url)
            .ok()
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|| self.base_url.clone());
        format!("{origin}/{}", path.trim_start_matches('/'))
    }

    // ── Sessions ─────────────────────────────────────────────────────────

    /// Shared demo session configured with the given language pair.
    pub async fn demo_session(&self, languages: &LanguagePair) -> Result<Session, ApiError> {
        const ENDPOINT: &str = "GET /session/demo";
        let request = self.request(Method::GET, "/session/demo").query(&[
            ("doctor_lang", languages.doctor.as_str()),
            ("patient_lang", languages.patient.as_str()),
        ]);
        let response = Self::execute(ENDPOINT, request).await?;
        Self::decode(ENDPOINT, response).await
    }

    /// Brand-new, non-demo session.
    pub async fn create_session(&self, languages: &LanguagePair) -> Result<Session, ApiError> {
        const ENDPOINT: &str = "POST /session";
        let request = self
            .request(Method::POST, "/session")
            .json(&NewSessionRequest {
                doctor_lang: &languages.doctor,
                patient_lang: &languages.patient,
            });
        let response = Self::execute(ENDPOINT, request).await?;
        Self::decode(ENDPOINT, response).await
    }

    // ── Messages ─────────────────────────────────────────────────────────

    pub async fn messages(&self) -> Result<Vec<Message>, ApiError> {
        const ENDPOINT: &str = "GET /messages";
        let response = Self::execute(ENDPOINT, self.request(Method::GET, "/messages")).await?;
        Self::decode(ENDPOINT, response).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Message>, ApiError> {
        const ENDPOINT: &str = "GET /search";
        let request = self.request(Method::GET, "/search").query(&[("q", query)]);
        let response = Self::execute(ENDPOINT, request).await?;
        Self::decode(ENDPOINT, response).await
    }

    /// History for an optional filter: empty query means the full history.
    pub async fn fetch(&self, query: &str) -> Result<Vec<Message>, ApiError> {
        if query.is_empty() {
            self.messages().await
        } else {
            self.search(query).await
        }
    }

    /// Submit a typed message. The persisted copy arrives over the live channel,
    /// so the response body is ignored.
    pub async fn send_chat(&self, role: Role, content: &str) -> Result<(), ApiError> {
        const ENDPOINT: &str = "POST /chat";
        let request = self
            .request(Method::POST, "/chat")
            .json(&ChatRequest { role, content });
        Self::execute(ENDPOINT, request).await.map(drop)
    }

    pub async fn upload_audio(&self, role: Role, audio: AudioUpload) -> Result<(), ApiError> {
        const ENDPOINT: &str = "POST /audio";
        let AudioUpload {
            bytes,
            file_name,
            mime_type,
        } = audio;
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|e| ApiError::InvalidRequest(format!("audio MIME type {mime_type}: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("role", role.to_string())
            .part("file", part);
        let request = self.request(Method::POST, "/audio").multipart(form);
        Self::execute(ENDPOINT, request).await.map(drop)
    }

    pub async fn summary(&self) -> Result<String, ApiError> {
        const ENDPOINT: &str = "POST /summary";
        let request = self.request(Method::POST, "/summary").json(&json!({}));
        let response = Self::execute(ENDPOINT, request).await?;
        let body: SummaryResponse = Self::decode(ENDPOINT, response).await?;
        Ok(body.summary)
    }

    // ── Plumbing ─────────────────────────────────────────────────────────

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, format!("{}{path}", self.base_url));

        if let Some(session_id) = self.session_id.load_full() {
            builder = builder.header(SESSION_HEADER, session_id.as_str());
        }

        let keys = self.preferences.api_keys();
        if let Some(key) = keys.gemini {
            builder = builder.header(GEMINI_KEY_HEADER, key);
        }
        if let Some(key) = keys.openai {
            builder = builder.header(OPENAI_KEY_HEADER, key);
        }
        builder
    }

    async fn execute(endpoint: &'static str, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|error| format!("<failed to read response body: {error}>"));
        tracing::debug!(endpoint, status = status.as_u16(), "backend rejected request");
        Err(ApiError::Status {
            endpoint,
            status: status.as_u16(),
            body,
        })
    }

    async fn decode<T: DeserializeOwned>(
        endpoint: &'static str,
        response: Response,
    ) -> Result<T, ApiError> {
        let bytes = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiKeyProvider;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(base: &str) -> BackendClient {
        BackendClient::with_http(reqwest::Client::new(), base, Preferences::in_memory())
    }

    fn session_json(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "created_at": "2025-03-04T10:00:00",
            "doctor_lang": "en",
            "patient_lang": "es"
        })
    }

    #[test]
    fn strips_trailing_slash() {
        let c = client("http://localhost:8000/api/");
        assert_eq!(c.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn resolves_audio_paths_against_origin() {
        let c = client("http://localhost:8000/api");
        assert_eq!(
            c.resolve("/uploads/abc_recording.webm"),
            "http://localhost:8000/uploads/abc_recording.webm"
        );
        assert_eq!(c.resolve("https://cdn.example/a.wav"), "https://cdn.example/a.wav");
    }

    #[tokio::test]
    async fn demo_session_sends_language_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/session/demo"))
            .and(query_param("doctor_lang", "fr"))
            .and(query_param("patient_lang", "zh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_json("demo")))
            .expect(1)
            .mount(&server)
            .await;

        let c = client(&server.uri());
        let session = c
            .demo_session(&LanguagePair {
                doctor: "fr".into(),
                patient: "zh".into(),
            })
            .await
            .unwrap();
        assert_eq!(session.id, "demo");
    }

    #[tokio::test]
    async fn session_and_key_headers_are_attached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .and(header(SESSION_HEADER, "s-42"))
            .and(header(GEMINI_KEY_HEADER, "g-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let c = client(&server.uri());
        c.preferences()
            .set_api_key(ApiKeyProvider::Gemini, "g-key")
            .unwrap();
        c.set_session_id("s-42");

        assert!(c.messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn chat_posts_role_and_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({"role": "doctor", "content": "Hello"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
            .expect(1)
            .mount(&server)
            .await;

        client(&server.uri())
            .send_chat(Role::Doctor, "Hello")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn non_success_status_carries_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/summary"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Session not found"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).summary().await.unwrap_err();
        match err {
            ApiError::Status { status, body, .. } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Session not found");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let err = client(&server.uri()).messages().await.unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_connectivity_error() {
        let err = client("http://127.0.0.1:9").messages().await.unwrap_err();
        assert!(err.is_connectivity());
    }
}
