//! End-to-end WebSocket tests against a server on an ephemeral port.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use livetranslate_protocol::{ClientMessage, Language, ServerMessage};
use livetranslate_server::state::Config;
use livetranslate_server::translate::{TranslateError, Translator};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

struct StaticTranslator;

#[async_trait]
impl Translator for StaticTranslator {
    async fn translate(&self, text: &str, _target: Language) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Err(TranslateError::EmptyInput);
        }
        Ok("hola".to_string())
    }
}

async fn start_test_server() -> SocketAddr {
    let config = Config {
        bind_address: "127.0.0.1:0".to_string(),
        database_url: "sqlite::memory:".to_string(),
        google_api_key: None,
        gemini_model: "test-model".to_string(),
    };

    let app = livetranslate_server::create_app(config, Arc::new(StaticTranslator))
        .await
        .expect("failed to build app");

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind");
    let addr = listener.local_addr().expect("no local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    addr
}

async fn connect(addr: SocketAddr) -> WsStream {
    let (stream, _) = connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect failed");
    stream
}

async fn send(stream: &mut WsStream, message: &ClientMessage) {
    let json = serde_json::to_string(message).expect("serialize client message");
    stream
        .send(Message::Text(json.into()))
        .await
        .expect("websocket send failed");
}

async fn recv(stream: &mut WsStream) -> ServerMessage {
    loop {
        let msg = timeout(Duration::from_secs(3), stream.next())
            .await
            .expect("timed out waiting for server message")
            .expect("websocket stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("server message should deserialize");
        }
    }
}

#[tokio::test]
async fn http_surface_reports_healthy_and_lists_languages() {
    let addr = start_test_server().await;
    let client = reqwest::Client::new();

    let health: serde_json::Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "healthy");

    let languages: serde_json::Value = client
        .get(format!("http://{addr}/api/languages"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let names: Vec<&str> = languages
        .as_array()
        .unwrap()
        .iter()
        .map(|l| l["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Spanish"));
    assert!(names.contains(&"Turkish"));
}

#[tokio::test]
async fn new_connection_is_acknowledged_immediately() {
    let addr = start_test_server().await;
    let mut stream = connect(addr).await;

    match recv(&mut stream).await {
        ServerMessage::Connected { .. } => {}
        other => panic!("expected connected ack, got {other:?}"),
    }

    send(&mut stream, &ClientMessage::Ping).await;
    assert!(matches!(recv(&mut stream).await, ServerMessage::Pong));
}

#[tokio::test]
async fn join_translate_and_leave_round_trip() {
    let addr = start_test_server().await;

    let mut alice = connect(addr).await;
    let _ = recv(&mut alice).await; // connected

    send(&mut alice, &ClientMessage::CreateRoom { room_id: None }).await;
    let room_id = match recv(&mut alice).await {
        ServerMessage::RoomCreated { room_id } => room_id,
        other => panic!("expected room-created, got {other:?}"),
    };

    send(
        &mut alice,
        &ClientMessage::JoinRoom {
            room_id: room_id.clone(),
            user_id: "alice".to_string(),
            name: "Alice".to_string(),
            language: Language::French,
        },
    )
    .await;
    match recv(&mut alice).await {
        ServerMessage::JoinedRoom { users, .. } => assert_eq!(users.len(), 1),
        other => panic!("expected joined-room, got {other:?}"),
    }

    let mut bob = connect(addr).await;
    let _ = recv(&mut bob).await; // connected
    send(
        &mut bob,
        &ClientMessage::JoinRoom {
            room_id: room_id.clone(),
            user_id: "bob".to_string(),
            name: "Bob".to_string(),
            language: Language::German,
        },
    )
    .await;
    match recv(&mut bob).await {
        ServerMessage::JoinedRoom { users, .. } => assert_eq!(users.len(), 2),
        other => panic!("expected joined-room, got {other:?}"),
    }
    match recv(&mut alice).await {
        ServerMessage::UserJoined { user_id, .. } => assert_eq!(user_id, "bob"),
        other => panic!("expected user-joined, got {other:?}"),
    }

    send(
        &mut alice,
        &ClientMessage::AudioChunk {
            room_id: room_id.clone(),
            user_id: "alice".to_string(),
            text: "Hello".to_string(),
            source_lang: "en".to_string(),
            target_lang: Language::French,
        },
    )
    .await;
    for stream in [&mut alice, &mut bob] {
        match recv(stream).await {
            ServerMessage::TranslationResult {
                original,
                translated,
                ..
            } => {
                assert_eq!(original, "Hello");
                assert_eq!(translated, "hola");
            }
            other => panic!("expected translation-result, got {other:?}"),
        }
    }

    // Dropping bob's socket must surface as user-left to alice.
    drop(bob);
    match recv(&mut alice).await {
        ServerMessage::UserLeft { user_id } => assert_eq!(user_id, "bob"),
        other => panic!("expected user-left, got {other:?}"),
    }
}
