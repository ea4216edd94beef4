use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, BodyDataStream, Bytes};
use axum::http::{Request, StatusCode, header};
use axum_test::TestServer;
use campus_erp::AppState;
use campus_erp::auth::Role;
use campus_erp::chat::Message;
use campus_erp::config::{AppConfig, ServerConfig, StorageConfig, TimingConfig};
use campus_erp::server::build_router;
use campus_erp::storage::{FileStore, KeyValueStore, MemoryStore};
use futures::StreamExt;
use serde_json::{Value, json};
use tower::ServiceExt;

fn config_with_delay(reply_delay_ms: u64) -> Arc<AppConfig> {
    Arc::new(AppConfig {
        server: ServerConfig {
            port: 0,
            host: "127.0.0.1".to_string(),
        },
        storage: StorageConfig {
            path: String::new(),
        },
        timing: TimingConfig {
            login_latency_ms: 0,
            reply_delay_ms,
        },
    })
}

fn server_with(storage: Arc<dyn KeyValueStore>, reply_delay_ms: u64) -> (TestServer, AppState) {
    let state = AppState::new(
        config_with_delay(reply_delay_ms),
        storage,
        Arc::new(|history: &[Message]| format!("reply #{}", history.len())),
    );
    let server = TestServer::new(build_router(state.clone())).unwrap();
    (server, state)
}

fn test_server() -> TestServer {
    server_with(Arc::new(MemoryStore::new()), 0).0
}

async fn login_teacher(server: &TestServer) {
    server
        .post("/api/login")
        .json(&json!({
            "identifier": "teacher@school.com",
            "secret": "password123",
            "role": "teacher"
        }))
        .await
        .assert_status_ok();
}

async fn wait_for_reply(server: &TestServer, id: &str) -> Value {
    for _ in 0..100 {
        let body: Value = server
            .get(&format!("/api/conversations/{id}/messages"))
            .await
            .json();
        if body["awaitingReply"] == json!(false) {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("reply never arrived");
}

#[tokio::test]
async fn test_login_and_session_status() {
    let server = test_server();

    let status: Value = server.get("/api/session").await.json();
    assert_eq!(status, json!({ "authenticated": false, "user": null }));

    let response = server
        .post("/api/login")
        .json(&json!({
            "identifier": "teacher@school.com",
            "secret": "password123",
            "role": "teacher"
        }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "identifier": "teacher@school.com",
            "role": "teacher",
            "displayName": "TEACHER"
        })
    );

    let status: Value = server.get("/api/session").await.json();
    assert_eq!(status["authenticated"], json!(true));
    assert_eq!(status["user"]["displayName"], json!("TEACHER"));
}

#[tokio::test]
async fn test_login_failures() {
    let server = test_server();

    let wrong = server
        .post("/api/login")
        .json(&json!({
            "identifier": "teacher@school.com",
            "secret": "wrong",
            "role": "teacher"
        }))
        .await;
    wrong.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(
        wrong.json::<Value>()["error"],
        json!("Invalid email or password for this role")
    );

    let cases = [
        json!({ "identifier": "", "secret": "x", "role": "student" }),
        json!({ "identifier": "x", "secret": "", "role": "teacher" }),
        json!({ "identifier": "x", "secret": "y" }),
        json!({ "identifier": "x@y.z", "secret": "y", "role": "admin" }),
        json!({ "identifier": "not-an-email", "secret": "password123", "role": "student" }),
    ];
    for body in cases {
        server
            .post("/api/login")
            .json(&body)
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let status: Value = server.get("/api/session").await.json();
    assert_eq!(status["authenticated"], json!(false));
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let server = test_server();
    login_teacher(&server).await;

    server.post("/api/logout").await.assert_status(StatusCode::NO_CONTENT);
    server.post("/api/logout").await.assert_status(StatusCode::NO_CONTENT);

    let status: Value = server.get("/api/session").await.json();
    assert_eq!(status["authenticated"], json!(false));
}

#[tokio::test]
async fn test_conversations_require_session() {
    let server = test_server();
    server
        .get("/api/conversations/c1/messages")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .post("/api/conversations/c1/messages")
        .json(&json!({ "content": "Hello" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
    server
        .get("/api/navigation")
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_message_and_reply() {
    let server = test_server();
    login_teacher(&server).await;

    let created = server.post("/api/conversations").await;
    created.assert_status(StatusCode::CREATED);
    let id = created.json::<Value>()["id"].as_str().unwrap().to_string();

    let posted = server
        .post(&format!("/api/conversations/{id}/messages"))
        .json(&json!({ "content": "  Hello  " }))
        .await;
    posted.assert_status(StatusCode::ACCEPTED);
    let user_message: Value = posted.json();
    assert_eq!(user_message["content"], json!("Hello"));
    assert_eq!(user_message["origin"], json!("user"));

    let transcript = wait_for_reply(&server, &id).await;
    let messages = transcript["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], user_message);
    assert_eq!(messages[1]["origin"], json!("assistant"));
    assert_eq!(messages[1]["content"], json!("reply #1"));

    server
        .delete(&format!("/api/conversations/{id}/messages"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let cleared: Value = server
        .get(&format!("/api/conversations/{id}/messages"))
        .await
        .json();
    assert_eq!(cleared["messages"], json!([]));
}

#[tokio::test]
async fn test_empty_message_is_rejected() {
    let server = test_server();
    login_teacher(&server).await;

    server
        .post("/api/conversations/c1/messages")
        .json(&json!({ "content": "   " }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    let transcript: Value = server.get("/api/conversations/c1/messages").await.json();
    assert_eq!(transcript["messages"], json!([]));
}

#[tokio::test]
async fn test_second_message_while_pending_is_busy() {
    let (server, state) = server_with(Arc::new(MemoryStore::new()), 60_000);
    login_teacher(&server).await;

    server
        .post("/api/conversations/c1/messages")
        .json(&json!({ "content": "first" }))
        .await
        .assert_status(StatusCode::ACCEPTED);
    server
        .post("/api/conversations/c1/messages")
        .json(&json!({ "content": "second" }))
        .await
        .assert_status(StatusCode::CONFLICT);

    let log = state.conversations.get("c1").unwrap();
    assert_eq!(log.len(), 1);
    assert!(log.is_awaiting_reply());
}

#[tokio::test]
async fn test_navigation_follows_role() {
    let server = test_server();
    server
        .post("/api/login")
        .json(&json!({
            "identifier": "emma.student@school.com",
            "secret": "password123",
            "role": "student"
        }))
        .await
        .assert_status_ok();

    let nav: Value = server.get("/api/navigation").await.json();
    assert_eq!(nav["role"], json!("student"));
    let paths: Vec<&str> = nav["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["path"].as_str().unwrap())
        .collect();
    assert_eq!(paths, ["/dashboard", "/my-courses", "/grades", "/teachers", "/chat"]);
}

#[tokio::test]
async fn test_theme_toggle() {
    let server = test_server();
    let theme: Value = server.get("/api/preferences/theme").await.json();
    assert_eq!(theme, json!({ "darkMode": false }));

    let toggled: Value = server.post("/api/preferences/theme/toggle").await.json();
    assert_eq!(toggled, json!({ "darkMode": true }));

    let theme: Value = server.get("/api/preferences/theme").await.json();
    assert_eq!(theme, json!({ "darkMode": true }));
}

#[tokio::test]
async fn test_session_survives_restart_with_file_storage() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slots.json");

    let (server, _) = server_with(Arc::new(FileStore::new(&path)), 0);
    login_teacher(&server).await;
    server.post("/api/preferences/theme/toggle").await.assert_status_ok();
    drop(server);

    let (_, restarted) = server_with(Arc::new(FileStore::new(&path)), 0);
    let session = restarted.sessions.restore_session().await.unwrap();
    assert_eq!(session.identifier, "teacher@school.com");
    assert!(restarted.theme.is_dark_mode().await.unwrap());

    restarted.sessions.logout().await;
    let (_, again) = server_with(Arc::new(FileStore::new(&path)), 0);
    assert!(again.sessions.restore_session().await.is_none());
    assert!(again.theme.is_dark_mode().await.unwrap());
}

#[tokio::test]
async fn test_malformed_bodies_get_json_errors() {
    let server = test_server();
    login_teacher(&server).await;

    let not_json = server
        .post("/api/login")
        .bytes(Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;
    not_json.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(not_json.json::<Value>()["error"], json!("Malformed request body"));

    let no_content_type = server
        .post("/api/conversations/c1/messages")
        .bytes(Bytes::from_static(br#"{"content":"Hello"}"#))
        .await;
    no_content_type.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(
        no_content_type.json::<Value>()["error"],
        json!("Malformed request body")
    );

    let wrong_type = server
        .post("/api/login")
        .json(&json!({ "identifier": "teacher@school.com", "secret": "x", "role": 5 }))
        .await;
    wrong_type.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(wrong_type.json::<Value>()["error"], json!("Malformed request body"));

    let status: Value = server.get("/api/session").await.json();
    assert_eq!(status["user"]["identifier"], json!("teacher@school.com"));
}

#[tokio::test]
async fn test_corrupt_storage_file_does_not_block_login() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("slots.json");
    std::fs::write(&path, "{garbage").unwrap();

    let (server, state) = server_with(Arc::new(FileStore::new(&path)), 0);
    assert!(state.sessions.restore_session().await.is_none());

    let theme: Value = server.get("/api/preferences/theme").await.json();
    assert_eq!(theme, json!({ "darkMode": false }));
    login_teacher(&server).await;

    let (_, restarted) = server_with(Arc::new(FileStore::new(&path)), 0);
    let session = restarted.sessions.restore_session().await.unwrap();
    assert_eq!(session.identifier, "teacher@school.com");
}

#[tokio::test]
async fn test_conversations_can_be_listed_and_removed() {
    let server = test_server();
    login_teacher(&server).await;

    let id = server.post("/api/conversations").await.json::<Value>()["id"]
        .as_str()
        .unwrap()
        .to_string();
    let listed: Value = server.get("/api/conversations").await.json();
    assert_eq!(listed, json!({ "ids": [id] }));

    server
        .delete(&format!("/api/conversations/{id}"))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .delete(&format!("/api/conversations/{id}"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get(&format!("/api/conversations/{id}/stream"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let listed: Value = server.get("/api/conversations").await.json();
    assert_eq!(listed, json!({ "ids": [] }));
}

#[tokio::test]
async fn test_resolve_redirects_forbidden_pages() {
    let server = test_server();
    server
        .post("/api/login")
        .json(&json!({
            "identifier": "emma.student@school.com",
            "secret": "password123",
            "role": "student"
        }))
        .await
        .assert_status_ok();

    let forbidden: Value = server
        .get("/api/navigation/resolve")
        .add_query_param("path", "/students")
        .await
        .json();
    assert_eq!(forbidden, json!({ "page": "dashboard", "path": "/dashboard" }));

    let allowed: Value = server
        .get("/api/navigation/resolve")
        .add_query_param("path", "/my-courses")
        .await
        .json();
    assert_eq!(allowed, json!({ "page": "my-courses", "path": "/my-courses" }));
}

async fn read_until(frames: &mut BodyDataStream, received: &mut String, needle: &str) {
    let read = async {
        while !received.contains(needle) {
            let chunk = frames.next().await.expect("stream ended").unwrap();
            received.push_str(std::str::from_utf8(&chunk).unwrap());
        }
    };
    let outcome = tokio::time::timeout(Duration::from_secs(5), read).await;
    assert!(outcome.is_ok(), "no {needle:?} frame in {received:?}");
}

#[tokio::test]
async fn test_stream_pushes_conversation_events() {
    let (_, state) = server_with(Arc::new(MemoryStore::new()), 0);
    state
        .sessions
        .login("teacher@school.com", "password123", Some(Role::Teacher))
        .await
        .unwrap();
    let id = state.conversations.create().id().to_string();
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/api/conversations/{id}/stream"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/event-stream")
    );
    let mut frames = response.into_body().into_data_stream();

    let posted = app
        .clone()
        .oneshot(
            Request::post(format!("/api/conversations/{id}/messages"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "content": "Hello" }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(posted.status(), StatusCode::ACCEPTED);

    let mut received = String::new();
    read_until(&mut frames, &mut received, r#""data":false"#).await;

    assert_eq!(received.matches("event: message").count(), 2);
    assert_eq!(received.matches("event: typing").count(), 2);
    let typing_on = received.find(r#""data":true"#).unwrap();
    let user = received.find(r#""content":"Hello""#).unwrap();
    let reply = received.find(r#""content":"reply #1""#).unwrap();
    assert!(user < reply);
    assert!(typing_on < reply);

    let cleared = app
        .oneshot(
            Request::delete(format!("/api/conversations/{id}/messages"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(cleared.status(), StatusCode::NO_CONTENT);
    read_until(&mut frames, &mut received, "event: cleared").await;
}
