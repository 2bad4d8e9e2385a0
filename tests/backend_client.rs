#[path = "support/backend_harness.rs"]
mod backend_harness;

use std::sync::Arc;

use backend_harness::session_json;
use careline::api::{BackendClient, Role};
use careline::chat::session;
use careline::config::{
    ApiKeyProvider, Config, FilePreferenceStore, LanguagePair, PreferenceStore, Preferences,
};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn file_preferences(dir: &tempfile::TempDir) -> Preferences {
    Preferences::new(Arc::new(FilePreferenceStore::new(
        dir.path().join("preferences.toml"),
    )))
}

#[tokio::test]
async fn stored_preferences_drive_the_session_request_and_headers() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = file_preferences(&dir);
    prefs
        .set_languages(&LanguagePair {
            doctor: "fr".into(),
            patient: "hi".into(),
        })
        .unwrap();
    prefs.set_api_key(ApiKeyProvider::Gemini, "g-123").unwrap();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/demo"))
        .and(query_param("doctor_lang", "fr"))
        .and(query_param("patient_lang", "hi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s-7")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("X-Session-ID", "s-7"))
        .and(header("X-Gemini-API-Key", "g-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    // a second handle on the same file sees the stored values
    let client = BackendClient::with_http(
        reqwest::Client::new(),
        &server.uri(),
        file_preferences(&dir),
    );
    let joined = session::join_demo(&client).await.unwrap();
    session::register(&client, &joined);
    client.send_chat(Role::Doctor, "Bonjour").await.unwrap();
}

#[tokio::test]
async fn cleared_key_is_no_longer_forwarded() {
    let dir = tempfile::tempdir().unwrap();
    let prefs = file_preferences(&dir);
    prefs.set_api_key(ApiKeyProvider::OpenAi, "sk-1").unwrap();
    prefs.clear_api_key(ApiKeyProvider::OpenAi).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/summary"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "summary": "ok" })))
        .mount(&server)
        .await;

    let client = BackendClient::with_http(reqwest::Client::new(), &server.uri(), prefs);
    assert_eq!(client.summary().await.unwrap(), "ok");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("x-openai-api-key"));
}

#[test]
fn preference_file_is_plain_toml() {
    let dir = tempfile::tempdir().unwrap();
    let store = FilePreferenceStore::new(dir.path().join("nested/preferences.toml"));
    store.set("doctorLang", "zh").unwrap();

    let raw = std::fs::read_to_string(store.path()).unwrap();
    assert!(raw.contains("doctorLang = \"zh\""));
    assert_eq!(store.get("doctorLang").unwrap().as_deref(), Some("zh"));
    assert_eq!(store.get("patientLang").unwrap(), None);
}

#[test]
fn first_run_writes_default_config() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join(".careline");

    let config = Config::load_or_init_in(&data_dir).unwrap();
    assert!(config.config_path.exists());
    assert_eq!(config.preferences_path(), data_dir.join("preferences.toml"));
    assert_eq!(config.summaries_dir(), data_dir.join("summaries"));

    let reloaded = Config::load_or_init_in(&data_dir).unwrap();
    assert_eq!(reloaded.backend.base_url, config.backend.base_url);
    assert_eq!(reloaded.backend.ws_url, config.backend.ws_url);
}
