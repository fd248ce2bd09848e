//! End-to-end: a real server on an ephemeral port, two live websocket
//! clients, and the REST write path driving fan-out between them.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use clipsync_server::config::Setting;
use clipsync_server::infrastructure::context::AppContext;
use clipsync_server::infrastructure::storage::db::pool::init_pool;
use clipsync_server::infrastructure::web;
use clipsync_server::infrastructure::web::schemas::{
    ClipboardHistoryResponse, ClipboardItemResponse, TokenResponse,
};

type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct TestServer {
    addr: SocketAddr,
    user_token: String,
    http: reqwest::Client,
    _dir: tempfile::TempDir,
}

impl TestServer {
    async fn start() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("e2e.db");

        let mut setting = Setting::default();
        setting.storage.database_url = db_path.to_str().unwrap().to_string();
        setting.auth.token_secret = "e2e-secret".to_string();
        setting.storage.max_items_per_user = 20;

        let pool = init_pool(&setting.storage.database_url).unwrap();
        let ctx = AppContext::build(setting, pool);

        let user_id = Uuid::new_v4();
        let user_token = ctx.tokens.issue(user_id, None).unwrap();

        let (addr, server) = web::bind(&ctx, SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
        tokio::spawn(server);

        Self {
            addr,
            user_token,
            http: reqwest::Client::new(),
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn register_device(&self, name: &str, client_id: &str) -> TokenResponse {
        let response = self
            .http
            .post(self.url("/device/register"))
            .bearer_auth(&self.user_token)
            .json(&json!({
                "device_name": name,
                "device_class": "desktop",
                "device_info": {
                    "user_agent": "e2e-test",
                    "platform": "linux",
                    "client_id": client_id,
                }
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        response.json().await.unwrap()
    }

    async fn connect_ws(&self, token: &str) -> WsClient {
        let url = format!("ws://{}/ws/clipboard?token={}", self.addr, token);
        let (ws, _) = connect_async(url).await.unwrap();
        ws
    }
}

async fn next_json(ws: &mut WsClient) -> Value {
    loop {
        let frame = timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for websocket message")
            .expect("websocket stream ended")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

async fn expect_silence(ws: &mut WsClient, window: Duration) {
    match timeout(window, ws.next()).await {
        Err(_) => {}
        Ok(Some(Ok(Message::Text(text)))) => {
            panic!("expected no message, got: {}", text)
        }
        Ok(other) => panic!("expected no message, got frame: {:?}", other),
    }
}

fn sample_body(hash_label: &str) -> Value {
    json!({
        "encrypted_content": "ZW5jcnlwdGVkLXBheWxvYWQ=",
        "iv": "cmFuZG9tLWl2",
        "content_hash": format!("{:0>64}", hash_label),
        "content_type": "text",
        "content_size": 17,
    })
}

#[tokio::test]
async fn test_update_fans_out_with_origin_excluded() {
    let server = TestServer::start().await;

    let token_a = server.register_device("Laptop", "device-a").await;
    let token_b = server.register_device("Phone", "device-b").await;
    let device_a = token_a.device_id.unwrap();
    let device_b = token_b.device_id.unwrap();
    assert_ne!(device_a, device_b);

    let mut ws_a = server.connect_ws(&token_a.access_token).await;
    let mut ws_b = server.connect_ws(&token_b.access_token).await;

    // Both sessions open with a connected ack naming their device.
    let hello_a = next_json(&mut ws_a).await;
    assert_eq!(hello_a["type"], "connected");
    assert_eq!(hello_a["data"]["device_id"], device_a.to_string());
    let hello_b = next_json(&mut ws_b).await;
    assert_eq!(hello_b["type"], "connected");
    assert_eq!(hello_b["data"]["device_id"], device_b.to_string());

    // Device A pushes an item over HTTP.
    let response = server
        .http
        .post(server.url("/clipboard/update"))
        .bearer_auth(&token_a.access_token)
        .json(&sample_body("e2e-item"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let created: ClipboardItemResponse = response.json().await.unwrap();

    // B sees the update; the data is exactly the persisted row.
    let update = next_json(&mut ws_b).await;
    assert_eq!(update["type"], "clipboard_update");
    assert_eq!(update["data"]["item_id"], created.id.to_string());
    assert_eq!(update["data"]["device_id"], device_a.to_string());
    assert_eq!(update["data"]["content_hash"], created.content_hash);

    // The origin device never hears its own write.
    expect_silence(&mut ws_a, Duration::from_millis(300)).await;

    // History immediately reflects the same row as the newest entry.
    let history: ClipboardHistoryResponse = server
        .http
        .get(server.url("/clipboard/history"))
        .bearer_auth(&server.user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.total, 1);
    assert_eq!(history.items[0].id, created.id);

    // A duplicate push within the window returns the same item and is
    // not re-broadcast.
    let duplicate = server
        .http
        .post(server.url("/clipboard/update"))
        .bearer_auth(&token_a.access_token)
        .json(&sample_body("e2e-item"))
        .send()
        .await
        .unwrap();
    assert_eq!(duplicate.status(), 201);
    let duplicate: ClipboardItemResponse = duplicate.json().await.unwrap();
    assert_eq!(duplicate.id, created.id);
    expect_silence(&mut ws_b, Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_client_ping_gets_echoed_pong() {
    let server = TestServer::start().await;
    let token = server.register_device("Laptop", "pinger").await;

    let mut ws = server.connect_ws(&token.access_token).await;
    let hello = next_json(&mut ws).await;
    assert_eq!(hello["type"], "connected");

    ws.send(Message::Text(
        r#"{"type":"ping","timestamp":"2026-08-06T10:00:00Z"}"#.to_string(),
    ))
    .await
    .unwrap();

    let pong = next_json(&mut ws).await;
    assert_eq!(pong["type"], "pong");
    assert_eq!(pong["timestamp"], "2026-08-06T10:00:00Z");
}

#[tokio::test]
async fn test_unknown_message_types_are_ignored() {
    let server = TestServer::start().await;
    let token = server.register_device("Laptop", "chatty").await;

    let mut ws = server.connect_ws(&token.access_token).await;
    next_json(&mut ws).await; // connected

    ws.send(Message::Text(r#"{"type":"telemetry","data":{}}"#.into()))
        .await
        .unwrap();
    // Connection stays up: a ping after the unknown frame still works.
    ws.send(Message::Text(r#"{"type":"ping","timestamp":1}"#.into()))
        .await
        .unwrap();
    let pong = next_json(&mut ws).await;
    assert_eq!(pong["type"], "pong");
}

#[tokio::test]
async fn test_device_less_token_closed_with_policy_violation() {
    let server = TestServer::start().await;

    // The user-scoped token decodes fine but has no device association.
    let mut ws = server.connect_ws(&server.user_token).await;

    let frame = timeout(Duration::from_secs(5), ws.next())
        .await
        .expect("timed out waiting for close")
        .expect("websocket stream ended")
        .expect("websocket error");
    match frame {
        Message::Close(Some(frame)) => {
            assert_eq!(frame.code, CloseCode::Policy);
        }
        other => panic!("expected close frame, got {:?}", other),
    }
}

#[tokio::test]
async fn test_rest_surface_round_trip() {
    let server = TestServer::start().await;

    let token = server.register_device("Laptop", "rest-device").await;
    let device_id = token.device_id.unwrap();

    // Re-registering the same physical device reactivates, not duplicates.
    let again = server.register_device("Laptop Renamed", "rest-device").await;
    assert_eq!(again.device_id.unwrap(), device_id);

    let devices: Value = server
        .http
        .get(server.url("/device/list"))
        .bearer_auth(&server.user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(devices.as_array().unwrap().len(), 1);
    assert_eq!(devices[0]["device_name"], "Laptop Renamed");

    // Heartbeat by id.
    let status = server
        .http
        .put(server.url(&format!("/device/{}/heartbeat", device_id)))
        .bearer_auth(&server.user_token)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 204);

    // Write an item, read it back, delete it.
    let created: ClipboardItemResponse = server
        .http
        .post(server.url("/clipboard/update"))
        .bearer_auth(&token.access_token)
        .json(&sample_body("rest-item"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let latest: ClipboardItemResponse = server
        .http
        .get(server.url("/clipboard/latest"))
        .bearer_auth(&server.user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(latest.id, created.id);

    let status = server
        .http
        .delete(server.url(&format!("/clipboard/{}", created.id)))
        .bearer_auth(&server.user_token)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 204);

    let status = server
        .http
        .get(server.url("/clipboard/latest"))
        .bearer_auth(&server.user_token)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 404);

    // Unregister is a soft delete: the row stays, flagged inactive.
    let status = server
        .http
        .delete(server.url(&format!("/device/{}", device_id)))
        .bearer_auth(&server.user_token)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 204);

    let devices: Value = server
        .http
        .get(server.url("/device/list"))
        .bearer_auth(&server.user_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(devices[0]["is_active"], false);
}

#[tokio::test]
async fn test_auth_failures_on_rest_surface() {
    let server = TestServer::start().await;

    // No credential at all.
    let status = server
        .http
        .get(server.url("/clipboard/latest"))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 401);

    // A user-scoped token cannot write: writes need a device identity.
    let status = server
        .http
        .post(server.url("/clipboard/update"))
        .bearer_auth(&server.user_token)
        .json(&sample_body("nope"))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 401);

    // Oversized content is rejected with 413 before any persistence.
    let token = server.register_device("Laptop", "oversize").await;
    let mut body = sample_body("huge");
    body["content_size"] = json!(100 * 1024 * 1024);
    let status = server
        .http
        .post(server.url("/clipboard/update"))
        .bearer_auth(&token.access_token)
        .json(&body)
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, 413);
}
