//! HTTP-level tests for the Trello client and chat webhook.
//!
//! Tests use mocked HTTP responses to verify request shape and error
//! classification without real credentials or network access.

use cardpulse_core::integrations::{
    BoardReader, ChatWebhook, EventSource, OwnerResolver, Publisher, TrelloClient,
};
use cardpulse_core::window::day_window;
use cardpulse_core::{
    run_digest, AllowList, DigestError, DigestRequest, ItemId, TimeWindow, TrelloCredentials,
};
use chrono::NaiveDate;
use mockito::{Matcher, Server};
use serde_json::json;
use std::io;
use std::sync::{Arc, Mutex};

// ============================================================================
// Test Helpers
// ============================================================================

fn client(server: &Server) -> TrelloClient {
    TrelloClient::new(
        &server.url(),
        TrelloCredentials {
            api_key: "test-key".into(),
            token: "test-token".into(),
        },
    )
    .unwrap()
}

fn window() -> TimeWindow {
    day_window(
        chrono_tz::America::Mexico_City,
        NaiveDate::from_ymd_opt(2025, 9, 17).unwrap(),
    )
    .unwrap()
}

fn auth() -> Vec<Matcher> {
    vec![
        Matcher::UrlEncoded("key".into(), "test-key".into()),
        Matcher::UrlEncoded("token".into(), "test-token".into()),
    ]
}

fn with_auth(mut matchers: Vec<Matcher>) -> Matcher {
    matchers.extend(auth());
    Matcher::AllOf(matchers)
}

/// Log sink shared with a thread-local subscriber.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ============================================================================
// Creation events
// ============================================================================

#[tokio::test]
async fn test_list_created_queries_window_and_extracts_card_ids() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/1/boards/AQJCiqwE/actions")
        .match_query(with_auth(vec![
            Matcher::UrlEncoded("filter".into(), "createCard".into()),
            Matcher::UrlEncoded("since".into(), "2025-09-17T06:00:00Z".into()),
            Matcher::UrlEncoded("before".into(), "2025-09-18T06:00:00Z".into()),
            Matcher::UrlEncoded("limit".into(), "1000".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "id": "a1", "data": { "card": { "id": "c1", "name": "Acme" } } },
                { "id": "a2", "data": { "list": { "id": "l1" } } },
                { "id": "a3" },
                { "id": "a4", "data": { "card": { "id": "c2" } } }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let ids = client(&server)
        .list_created("AQJCiqwE", &window())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(ids, vec![ItemId::new("c1"), ItemId::new("c2")]);
}

#[tokio::test]
async fn test_list_created_auth_failure_is_source_unavailable() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/1/boards/AQJCiqwE/actions")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body("invalid token")
        .create_async()
        .await;

    let err = client(&server)
        .list_created("AQJCiqwE", &window())
        .await
        .unwrap_err();

    match err {
        DigestError::SourceUnavailable { message, .. } => {
            assert!(message.contains("401"));
            assert!(message.contains("invalid token"));
        }
        other => panic!("expected SourceUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn test_list_created_malformed_body_is_source_unavailable() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/1/boards/AQJCiqwE/actions")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;

    let err = client(&server)
        .list_created("AQJCiqwE", &window())
        .await
        .unwrap_err();
    assert!(err.is_source_unavailable());
}

#[tokio::test]
async fn test_list_created_full_page_is_kept_and_warned_without_paging() {
    let mut server = Server::new_async().await;
    let actions: Vec<_> = (0..1000)
        .map(|n| json!({ "id": format!("a{n}"), "data": { "card": { "id": format!("c{n}") } } }))
        .collect();
    let mock = server
        .mock("GET", "/1/boards/AQJCiqwE/actions")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(serde_json::Value::Array(actions).to_string())
        .expect(1)
        .create_async()
        .await;

    let logs = CapturedLogs::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let ids = client(&server)
        .list_created("AQJCiqwE", &window())
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(ids.len(), 1000);
    assert_eq!(ids.first(), Some(&ItemId::new("c0")));
    assert_eq!(ids.last(), Some(&ItemId::new("c999")));
    let logs = logs.text();
    assert!(logs.contains("WARN"), "logs: {logs}");
    assert!(logs.contains("filled a whole page"), "logs: {logs}");
}

#[tokio::test]
async fn test_list_created_short_page_does_not_warn() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/1/boards/AQJCiqwE/actions")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!([{ "data": { "card": { "id": "c1" } } }]).to_string())
        .create_async()
        .await;

    let logs = CapturedLogs::default();
    let sink = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || sink.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let ids = client(&server)
        .list_created("AQJCiqwE", &window())
        .await
        .unwrap();

    assert_eq!(ids, vec![ItemId::new("c1")]);
    assert!(!logs.text().contains("filled a whole page"));
}

#[test]
fn test_trello_client_rejects_non_http_base_url() {
    let credentials = || TrelloCredentials {
        api_key: "k".into(),
        token: "t".into(),
    };
    assert!(matches!(
        TrelloClient::new("ftp://api.trello.com", credentials()),
        Err(DigestError::Config(_))
    ));
    assert!(matches!(
        TrelloClient::new("mailto:ops@example.com", credentials()),
        Err(DigestError::Config(_))
    ));
    assert!(TrelloClient::new("https://api.trello.com", credentials()).is_ok());
}

// ============================================================================
// Owner lookup
// ============================================================================

#[tokio::test]
async fn test_resolve_uses_members_before_labels() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/1/cards/c1")
        .match_query(with_auth(vec![
            Matcher::UrlEncoded("fields".into(), "name,labels,idMembers".into()),
            Matcher::UrlEncoded("members".into(), "true".into()),
            Matcher::UrlEncoded("member_fields".into(), "fullName".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "id": "c1",
                "name": "Acme",
                "labels": [{ "name": "OWNER: Someone Else" }],
                "idMembers": ["m1", "m2"],
                "members": [
                    { "id": "m1", "fullName": " Ana Lopez " },
                    { "id": "m2", "fullName": null },
                    { "id": "m3", "fullName": "Bob" }
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let owners = client(&server).resolve(&ItemId::new("c1")).await.unwrap();

    mock.assert_async().await;
    assert_eq!(owners, vec!["Ana Lopez", "Bob"]);
}

#[tokio::test]
async fn test_resolve_falls_back_to_owner_label_then_sentinel() {
    let mut server = Server::new_async().await;
    let _labelled = server
        .mock("GET", "/1/cards/c1")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!({
                "id": "c1",
                "labels": [{ "name": "Hot" }, { "name": "owner: Cy" }, { "name": null }],
                "members": []
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _bare = server
        .mock("GET", "/1/cards/c2")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({ "id": "c2", "name": "Bare" }).to_string())
        .create_async()
        .await;

    let trello = client(&server);
    assert_eq!(trello.resolve(&ItemId::new("c1")).await.unwrap(), vec!["Cy"]);
    assert_eq!(
        trello.resolve(&ItemId::new("c2")).await.unwrap(),
        vec!["Unassigned/Other"]
    );
}

#[tokio::test]
async fn test_resolve_not_found_is_source_unavailable() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/1/cards/gone")
        .match_query(Matcher::Any)
        .with_status(404)
        .with_body("The requested resource was not found.")
        .create_async()
        .await;

    let err = client(&server).resolve(&ItemId::new("gone")).await.unwrap_err();
    assert!(err.is_source_unavailable());
}

// ============================================================================
// Open cards
// ============================================================================

#[tokio::test]
async fn test_list_open_items_skips_closed_cards() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/1/boards/vkpjS0Dm/cards")
        .match_query(with_auth(vec![
            Matcher::UrlEncoded("filter".into(), "open".into()),
            Matcher::UrlEncoded("members".into(), "true".into()),
        ]))
        .with_status(200)
        .with_body(
            json!([
                { "id": "68cac2c0a1b2c3d4e5f60718", "name": "Acme", "closed": false,
                  "members": [{ "fullName": "Ana" }], "labels": [] },
                { "id": "68cac2c0a1b2c3d4e5f60719", "name": "Old", "closed": true }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let items = client(&server).list_open_items("vkpjS0Dm").await.unwrap();

    mock.assert_async().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "Acme");
    assert_eq!(items[0].members[0].full_name, "Ana");
}

// ============================================================================
// Chat webhook
// ============================================================================

#[tokio::test]
async fn test_chat_webhook_posts_text_payload() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/v1/spaces/abc/messages")
        .match_query(Matcher::UrlEncoded("key".into(), "hook-key".into()))
        .match_body(Matcher::Json(json!({ "text": "hello\nworld" })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let webhook =
        ChatWebhook::new(&format!("{}/v1/spaces/abc/messages?key=hook-key", server.url())).unwrap();
    webhook.publish("hello\nworld").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn test_chat_webhook_error_is_publish_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/hook")
        .with_status(500)
        .with_body("boom")
        .create_async()
        .await;

    let webhook = ChatWebhook::new(&format!("{}/hook", server.url())).unwrap();
    let err = webhook.publish("x").await.unwrap_err();
    match err {
        DigestError::Publish(message) => assert!(message.contains("boom")),
        other => panic!("expected Publish, got {other:?}"),
    }
}

#[test]
fn test_chat_webhook_rejects_non_http_url() {
    assert!(matches!(
        ChatWebhook::new("not a url"),
        Err(DigestError::Config(_))
    ));
    assert!(matches!(
        ChatWebhook::new("ftp://example.com/hook"),
        Err(DigestError::Config(_))
    ));
}

// ============================================================================
// Full pipeline
// ============================================================================

#[tokio::test]
async fn test_run_digest_end_to_end() {
    let mut server = Server::new_async().await;
    let _actions = server
        .mock("GET", "/1/boards/AQJCiqwE/actions")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(
            json!([
                { "data": { "card": { "id": "c1" } } },
                { "data": { "card": { "id": "c2" } } },
                { "data": { "card": { "id": "c3" } } },
                { "data": { "card": { "id": "c4" } } }
            ])
            .to_string(),
        )
        .create_async()
        .await;
    let _c1 = server
        .mock("GET", "/1/cards/c1")
        .match_query(Matcher::Any)
        .with_body(json!({ "id": "c1", "members": [{ "fullName": "bob" }] }).to_string())
        .create_async()
        .await;
    let _c2 = server
        .mock("GET", "/1/cards/c2")
        .match_query(Matcher::Any)
        .with_body(
            json!({ "id": "c2", "members": [{ "fullName": "Ana" }, { "fullName": "bob" }] })
                .to_string(),
        )
        .create_async()
        .await;
    let _c3 = server
        .mock("GET", "/1/cards/c3")
        .match_query(Matcher::Any)
        .with_status(500)
        .create_async()
        .await;
    let _c4 = server
        .mock("GET", "/1/cards/c4")
        .match_query(Matcher::Any)
        .with_body(json!({ "id": "c4", "labels": [{ "name": "OWNER: Ana" }] }).to_string())
        .create_async()
        .await;
    let chat = server
        .mock("POST", "/hook")
        .match_body(Matcher::Json(json!({
            "text": "🔔 Leads on Wed Sep 17:\nAna: 2\nbob: 2"
        })))
        .with_status(200)
        .create_async()
        .await;

    let trello = client(&server);
    let webhook = ChatWebhook::new(&format!("{}/hook", server.url())).unwrap();
    let request = DigestRequest {
        board_id: "AQJCiqwE".into(),
        window: window(),
        title: "Leads".into(),
        allow_list: Some(AllowList::new(["ANA", "Bob"])),
    };

    let report = run_digest(&trello, &trello, &webhook, &request).await.unwrap();

    chat.assert_async().await;
    assert_eq!(report.items_seen, 4);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].id, ItemId::new("c3"));
}
