#[path = "support/backend_harness.rs"]
mod backend_harness;

use std::time::Duration;

use backend_harness::{
    FakeLive, ScriptedMicrophone, clear_history_event, controller, join, message_json, mount_demo,
    new_message_event, pump_until, session_json, settle,
};
use careline::api::Role;
use careline::chat::{ChatController, NoMicrophone, SEND_FAILED, SESSION_FAILED};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn texts(ctrl: &ChatController) -> Vec<String> {
    ctrl.state()
        .messages()
        .iter()
        .map(|m| m.original_text.clone())
        .collect()
}

#[tokio::test]
async fn sent_message_appears_exactly_once_via_push() {
    let server = MockServer::start().await;
    let live = FakeLive::start().await;
    mount_demo(&server, "s-1", vec![]).await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(header("X-Session-ID", "s-1"))
        .and(body_json(json!({ "role": "doctor", "content": "Hello, how are you?" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, &live.url, Role::Doctor, Box::new(NoMicrophone));
    join(&mut ctrl, &live, "s-1").await;

    ctrl.state_mut().composer_mut().set_draft("Hello, how are you?");
    assert!(ctrl.send());
    assert_eq!(ctrl.state().composer().draft(), "");
    assert!(ctrl.state().messages().is_empty(), "no local echo");

    assert!(pump_until(&mut ctrl, |c| !c.state().composer().is_sending()).await);
    live.push(&new_message_event(message_json(
        1,
        "s-1",
        "doctor",
        "Hello, how are you?",
    )));
    assert!(pump_until(&mut ctrl, |c| !c.state().messages().is_empty()).await);
    settle(&mut ctrl, Duration::from_millis(100)).await;

    assert_eq!(texts(&ctrl), ["Hello, how are you?"]);
    assert_eq!(ctrl.state().composer().draft(), "");
    assert!(ctrl.state().notice().is_none());
    ctrl.shutdown().await;
}

#[tokio::test]
async fn pushes_append_in_order_and_foreign_clears_are_ignored() {
    let server = MockServer::start().await;
    let live = FakeLive::start().await;
    mount_demo(
        &server,
        "s-1",
        vec![message_json(1, "s-1", "patient", "I have a fever")],
    )
    .await;

    let mut ctrl = controller(&server, &live.url, Role::Doctor, Box::new(NoMicrophone));
    join(&mut ctrl, &live, "s-1").await;
    assert_eq!(texts(&ctrl), ["I have a fever"]);

    live.push(&clear_history_event("s-old"));
    live.push(&new_message_event(message_json(2, "s-1", "doctor", "Since when?")));
    live.push(&new_message_event(message_json(3, "s-1", "patient", "Two days")));
    assert!(pump_until(&mut ctrl, |c| c.state().messages().len() == 3).await);
    assert_eq!(texts(&ctrl), ["I have a fever", "Since when?", "Two days"]);

    live.push(&clear_history_event("s-1"));
    assert!(pump_until(&mut ctrl, |c| c.state().messages().is_empty()).await);
    ctrl.shutdown().await;
}

#[tokio::test]
async fn search_results_replace_the_list() {
    let server = MockServer::start().await;
    let live = FakeLive::start().await;
    mount_demo(
        &server,
        "s-1",
        vec![
            message_json(1, "s-1", "patient", "I have a fever"),
            message_json(2, "s-1", "doctor", "Any cough?"),
        ],
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "fever"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([message_json(1, "s-1", "patient", "I have a fever")])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, &live.url, Role::Doctor, Box::new(NoMicrophone));
    join(&mut ctrl, &live, "s-1").await;
    assert_eq!(ctrl.state().messages().len(), 2);

    ctrl.set_search("fever");
    assert!(pump_until(&mut ctrl, |c| c.state().messages().len() == 1).await);
    assert_eq!(texts(&ctrl), ["I have a fever"]);

    ctrl.set_search("");
    assert!(pump_until(&mut ctrl, |c| c.state().messages().len() == 2).await);
    ctrl.shutdown().await;
}

#[tokio::test]
async fn failed_send_restores_the_draft() {
    let server = MockServer::start().await;
    let live = FakeLive::start().await;
    mount_demo(&server, "s-1", vec![]).await;
    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_string("translation failed"))
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, &live.url, Role::Patient, Box::new(NoMicrophone));
    join(&mut ctrl, &live, "s-1").await;

    ctrl.state_mut().composer_mut().set_draft("Me duele la cabeza");
    assert!(ctrl.send());
    assert!(pump_until(&mut ctrl, |c| c.state().notice().is_some()).await);

    assert_eq!(ctrl.state().notice(), Some(SEND_FAILED));
    assert_eq!(ctrl.state().composer().draft(), "Me duele la cabeza");
    assert!(!ctrl.state().composer().is_sending());
    assert!(ctrl.state().messages().is_empty());
    ctrl.shutdown().await;
}

#[tokio::test]
async fn summary_is_reused_within_ttl_and_refetched_after() {
    let server = MockServer::start().await;
    let live = FakeLive::start().await;
    mount_demo(&server, "s-1", vec![]).await;
    Mock::given(method("POST"))
        .and(path("/summary"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "summary": "Fever for two days." })),
        )
        .expect(2)
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, &live.url, Role::Doctor, Box::new(NoMicrophone))
        .with_summary_ttl(Duration::from_millis(400));
    join(&mut ctrl, &live, "s-1").await;

    ctrl.open_summary();
    assert!(ctrl.state().summary().loading);
    assert!(pump_until(&mut ctrl, |c| !c.state().summary().loading).await);
    assert_eq!(ctrl.state().summary().text, "Fever for two days.");
    ctrl.close_summary();

    // cache hit: served synchronously, no request
    ctrl.open_summary();
    assert!(!ctrl.state().summary().loading);
    assert_eq!(ctrl.state().summary().text, "Fever for two days.");
    ctrl.close_summary();

    tokio::time::sleep(Duration::from_millis(450)).await;
    ctrl.open_summary();
    assert!(ctrl.state().summary().loading);
    assert!(pump_until(&mut ctrl, |c| !c.state().summary().loading).await);
    ctrl.shutdown().await;
}

#[tokio::test]
async fn clear_chat_moves_to_a_fresh_session() {
    let server = MockServer::start().await;
    let live = FakeLive::start().await;
    mount_demo(
        &server,
        "s-1",
        vec![message_json(1, "s-1", "doctor", "Good morning")],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_json("s-2")))
        .expect(1)
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, &live.url, Role::Doctor, Box::new(NoMicrophone));
    join(&mut ctrl, &live, "s-1").await;
    assert_eq!(ctrl.state().messages().len(), 1);

    assert!(ctrl.clear_chat());
    assert!(!ctrl.clear_chat(), "replacement already in flight");
    assert!(pump_until(&mut ctrl, |c| c.state().session_id() == Some("s-2")).await);
    assert!(ctrl.state().messages().is_empty());
    assert_eq!(ctrl.client().session_id().as_deref(), Some("s-2"));

    // the new channel delivers messages for the new session only
    assert!(pump_until(&mut ctrl, |_| live.accepted() == 2 && live.connections() == 1).await);
    settle(&mut ctrl, Duration::from_millis(100)).await;
    live.push(&new_message_event(message_json(9, "s-1", "doctor", "stale")));
    live.push(&new_message_event(message_json(1, "s-2", "patient", "Hola")));
    assert!(pump_until(&mut ctrl, |c| !c.state().messages().is_empty()).await);
    settle(&mut ctrl, Duration::from_millis(100)).await;
    assert_eq!(texts(&ctrl), ["Hola"]);
    ctrl.shutdown().await;
}

#[tokio::test]
async fn failed_clear_chat_keeps_the_current_session() {
    let server = MockServer::start().await;
    let live = FakeLive::start().await;
    mount_demo(
        &server,
        "s-1",
        vec![message_json(1, "s-1", "doctor", "Good morning")],
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/session"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, &live.url, Role::Doctor, Box::new(NoMicrophone));
    join(&mut ctrl, &live, "s-1").await;

    assert!(ctrl.clear_chat());
    assert!(pump_until(&mut ctrl, |c| c.state().notice().is_some()).await);
    assert_eq!(ctrl.state().notice(), Some(SESSION_FAILED));
    assert_eq!(ctrl.state().session_id(), Some("s-1"));
    assert_eq!(texts(&ctrl), ["Good morning"]);
    assert!(!ctrl.state().is_replacing());
    ctrl.shutdown().await;
}

#[tokio::test]
async fn unreachable_backend_shows_offline_without_session() {
    let live = FakeLive::start().await;
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/session/demo"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let mut ctrl = controller(&server, &live.url, Role::Doctor, Box::new(NoMicrophone));
    ctrl.init();
    assert!(pump_until(&mut ctrl, |c| !c.state().is_online()).await);
    assert!(ctrl.state().session().is_none());
    assert_eq!(live.connections(), 0);
}

#[tokio::test]
async fn recording_is_uploaded_as_multipart() {
    let server = MockServer::start().await;
    let live = FakeLive::start().await;
    mount_demo(&server, "s-1", vec![]).await;
    Mock::given(method("POST"))
        .and(path("/audio"))
        .and(header("X-Session-ID", "s-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 4 })))
        .expect(1)
        .mount(&server)
        .await;

    let microphone = ScriptedMicrophone::new(&[b"RIFF", b"data"]);
    let mut ctrl = controller(&server, &live.url, Role::Patient, Box::new(microphone));
    join(&mut ctrl, &live, "s-1").await;

    ctrl.stop_recording();
    ctrl.start_recording();
    assert!(ctrl.state().is_recording());
    ctrl.stop_recording();
    assert!(!ctrl.state().is_recording());
    settle(&mut ctrl, Duration::from_millis(300)).await;

    let requests = server.received_requests().await.unwrap_or_default();
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/audio")
        .expect("audio upload");
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("name=\"role\""));
    assert!(body.contains("patient"));
    assert!(body.contains("filename=\"recording.webm\""));
    assert!(body.contains("RIFFdata"));
    assert!(ctrl.state().notice().is_none());
    ctrl.shutdown().await;
}
