use crate::recordings::NewRecording;
use crate::rooms::JoinRejected;
use crate::state::AppState;
use axum::{
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    response::Response,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures_util::{SinkExt, StreamExt};
use livetranslate_protocol::{ClientMessage, Language, ServerMessage};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Ceiling on the number of recordings returned per room.
const RECORDINGS_LIMIT: u32 = 50;

/// Placeholder broadcast in place of a live translation when the gateway
/// fails, so the room's conversation is never blocked.
const TRANSLATION_PLACEHOLDER: &str = "...";

pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let connection_id = Uuid::new_v4();

    // Register before acking so nothing emitted by a racing handler is lost.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    state.connections.add_connection(connection_id, tx).await;
    state
        .connections
        .send_to_connection(connection_id, &ServerMessage::Connected { connection_id })
        .await;

    tracing::info!("client connected: {}", connection_id);

    // Forward outbound messages from the channel to the socket.
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                let client_msg: ClientMessage = match serde_json::from_str(&text) {
                    Ok(m) => m,
                    Err(e) => {
                        tracing::warn!("invalid message on {}: {}", connection_id, e);
                        state
                            .connections
                            .send_to_connection(
                                connection_id,
                                &ServerMessage::Error {
                                    message: "Invalid message format".to_string(),
                                },
                            )
                            .await;
                        continue;
                    }
                };

                handle_client_message(&state, connection_id, client_msg).await;
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::debug!("websocket error on {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    state.connections.remove_connection(connection_id).await;
    send_task.abort();
    handle_disconnect(&state, connection_id).await;
}

/// Disconnect is the sole guaranteed cleanup path: resolve the connection to
/// its room membership, drop it, and tell the rest of the room. Idempotent
/// against a prior explicit leave (the lookup simply misses).
pub async fn handle_disconnect(state: &AppState, connection_id: Uuid) {
    let Some((room_id, user_id)) = state.rooms.lookup_by_connection(connection_id).await else {
        tracing::debug!("connection {} closed without room membership", connection_id);
        return;
    };

    state.rooms.leave(&room_id, &user_id).await;
    state
        .broadcast(
            &room_id,
            Some(connection_id),
            &ServerMessage::UserLeft {
                user_id: user_id.clone(),
            },
        )
        .await;
    tracing::info!("user {} left room {} on disconnect", user_id, room_id);
}

/// Dispatch one inbound event. Handlers that call out to the translation
/// gateway or the recording store run on their own tasks so external
/// latency never stalls this connection's frame relay.
pub async fn handle_client_message(
    state: &AppState,
    connection_id: Uuid,
    message: ClientMessage,
) {
    match message {
        ClientMessage::CreateRoom { room_id } => {
            let room_id = state.rooms.create_room(room_id).await;
            tracing::info!("room created: {}", room_id);
            state
                .connections
                .send_to_connection(connection_id, &ServerMessage::RoomCreated { room_id })
                .await;
        }

        ClientMessage::JoinRoom {
            room_id,
            user_id,
            name,
            language,
        } => {
            handle_join_room(state, connection_id, room_id, user_id, name, language).await;
        }

        ClientMessage::LeaveRoom { room_id, user_id } => {
            state.rooms.leave(&room_id, &user_id).await;
            state
                .broadcast(
                    &room_id,
                    Some(connection_id),
                    &ServerMessage::UserLeft {
                        user_id: user_id.clone(),
                    },
                )
                .await;
            tracing::info!("user {} left room {}", user_id, room_id);
        }

        ClientMessage::VideoFrame {
            room_id,
            user_id,
            frame,
        } => {
            // First frame doubles as the stream-start transition.
            state.rooms.set_stream_active(&room_id, &user_id, true).await;
            state
                .broadcast(
                    &room_id,
                    Some(connection_id),
                    &ServerMessage::VideoFrame { user_id, frame },
                )
                .await;
        }

        ClientMessage::ScreenFrame {
            room_id,
            user_id,
            frame,
        } => {
            state
                .rooms
                .set_screen_share_active(&room_id, &user_id, true)
                .await;
            state
                .broadcast(
                    &room_id,
                    Some(connection_id),
                    &ServerMessage::ScreenFrame { user_id, frame },
                )
                .await;
        }

        ClientMessage::StopScreenShare { room_id, user_id } => {
            state
                .rooms
                .set_screen_share_active(&room_id, &user_id, false)
                .await;
            state
                .broadcast(&room_id, None, &ServerMessage::ScreenShareStopped { user_id })
                .await;
        }

        ClientMessage::AudioChunk {
            room_id,
            user_id,
            text,
            source_lang,
            target_lang,
        } => {
            if text.trim().is_empty() {
                return;
            }
            let state = state.clone();
            tokio::spawn(async move {
                handle_audio_chunk(state, room_id, user_id, text, source_lang, target_lang).await;
            });
        }

        ClientMessage::SaveRecording {
            room_id,
            user_id,
            audio_blob,
            original_text,
            target_language,
            duration,
        } => {
            let state = state.clone();
            tokio::spawn(async move {
                handle_save_recording(
                    state,
                    connection_id,
                    room_id,
                    user_id,
                    audio_blob,
                    original_text,
                    target_language,
                    duration,
                )
                .await;
            });
        }

        ClientMessage::GetRecordings { room_id } => {
            let state = state.clone();
            tokio::spawn(async move {
                let message = match state.recordings.list_by_room(&room_id, RECORDINGS_LIMIT).await
                {
                    Ok(recordings) => ServerMessage::RecordingsList { recordings },
                    Err(e) => {
                        tracing::error!("failed to list recordings for {}: {}", room_id, e);
                        ServerMessage::RecordingError {
                            message: "Failed to load recordings".to_string(),
                        }
                    }
                };
                state
                    .connections
                    .send_to_connection(connection_id, &message)
                    .await;
            });
        }

        ClientMessage::TranslateRecording {
            recording_id,
            target_language,
            original_text,
        } => {
            let state = state.clone();
            tokio::spawn(async move {
                let message = match state.translator.translate(&original_text, target_language).await
                {
                    Ok(translated) => ServerMessage::RecordingTranslated {
                        recording_id,
                        target_language,
                        translated,
                    },
                    Err(e) => {
                        tracing::warn!("re-translation of recording {} failed: {}", recording_id, e);
                        ServerMessage::RecordingError {
                            message: "Translation failed".to_string(),
                        }
                    }
                };
                state
                    .connections
                    .send_to_connection(connection_id, &message)
                    .await;
            });
        }

        ClientMessage::UpdateLanguage {
            room_id,
            user_id,
            language,
        } => {
            state.rooms.update_language(&room_id, &user_id, language).await;
            state
                .broadcast(
                    &room_id,
                    None,
                    &ServerMessage::LanguageUpdated { user_id, language },
                )
                .await;
        }

        ClientMessage::Signal {
            room_id,
            target_user: _,
            from_user,
            signal,
        } => {
            // Fan-out is room-wide minus the sender; targetUser is advisory
            // and interpreted by the receiving clients.
            state
                .broadcast(
                    &room_id,
                    Some(connection_id),
                    &ServerMessage::Signal { from_user, signal },
                )
                .await;
        }

        ClientMessage::Ping => {
            state
                .connections
                .send_to_connection(connection_id, &ServerMessage::Pong)
                .await;
        }
    }
}

async fn handle_join_room(
    state: &AppState,
    connection_id: Uuid,
    room_id: String,
    user_id: String,
    name: String,
    language: Language,
) {
    let room_id = room_id.trim().to_string();
    let user_id = user_id.trim().to_string();

    if room_id.is_empty() || user_id.is_empty() {
        state
            .connections
            .send_to_connection(
                connection_id,
                &ServerMessage::Error {
                    message: "Invalid room or user ID".to_string(),
                },
            )
            .await;
        return;
    }

    match state
        .rooms
        .join(&room_id, &user_id, connection_id, name.clone(), language)
        .await
    {
        Ok(()) => {}
        Err(JoinRejected::RoomFull) => {
            state
                .connections
                .send_to_connection(connection_id, &ServerMessage::RoomFull { room_id })
                .await;
            return;
        }
        Err(JoinRejected::InvalidRoomId) => {
            state
                .connections
                .send_to_connection(
                    connection_id,
                    &ServerMessage::Error {
                        message: "Invalid room or user ID".to_string(),
                    },
                )
                .await;
            return;
        }
    }

    // The joiner sees its own confirmation (with the post-join snapshot)
    // before anyone else observes the user-joined broadcast.
    let users = state.rooms.snapshot(&room_id).await;
    state
        .connections
        .send_to_connection(
            connection_id,
            &ServerMessage::JoinedRoom {
                room_id: room_id.clone(),
                user_id: user_id.clone(),
                users,
            },
        )
        .await;

    state
        .broadcast(
            &room_id,
            Some(connection_id),
            &ServerMessage::UserJoined {
                user_id: user_id.clone(),
                name,
                language,
            },
        )
        .await;

    tracing::info!("user {} joined room {}", user_id, room_id);
}

async fn handle_audio_chunk(
    state: AppState,
    room_id: String,
    user_id: String,
    text: String,
    source_lang: String,
    target_lang: Language,
) {
    let result = match state.translator.translate(&text, target_lang).await {
        Ok(translated) => {
            // A non-English speaker also gets the text back in English for
            // their own reference; an independent call, so its failure only
            // drops the reverse field.
            let reverse_translation = if source_lang != Language::English.code() {
                state
                    .translator
                    .translate(&text, Language::English)
                    .await
                    .ok()
            } else {
                None
            };

            ServerMessage::TranslationResult {
                user_id,
                original: text,
                translated,
                source_lang,
                target_lang,
                reverse_translation,
            }
        }
        Err(e) => {
            tracing::warn!("live translation failed in room {}: {}", room_id, e);
            ServerMessage::TranslationResult {
                user_id,
                original: text,
                translated: TRANSLATION_PLACEHOLDER.to_string(),
                source_lang,
                target_lang,
                reverse_translation: None,
            }
        }
    };

    state.broadcast(&room_id, None, &result).await;
}

#[allow(clippy::too_many_arguments)]
async fn handle_save_recording(
    state: AppState,
    connection_id: Uuid,
    room_id: String,
    user_id: String,
    audio_blob: String,
    original_text: String,
    target_language: Language,
    duration: f64,
) {
    let original_text = original_text.trim().to_string();

    if original_text.is_empty() {
        recording_error(&state, connection_id, "No text to translate").await;
        return;
    }
    if audio_blob.is_empty() {
        recording_error(&state, connection_id, "No audio data").await;
        return;
    }

    let audio = match BASE64.decode(&audio_blob) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!("audio decode failed for room {}: {}", room_id, e);
            recording_error(&state, connection_id, "Invalid audio data").await;
            return;
        }
    };

    let translated = match state.translator.translate(&original_text, target_language).await {
        Ok(t) if !t.trim().is_empty() => t,
        Ok(_) | Err(_) => {
            recording_error(&state, connection_id, "Translation failed").await;
            return;
        }
    };

    let saved = state
        .recordings
        .save(NewRecording {
            room_id,
            user_id,
            audio,
            original_text: original_text.clone(),
            translated_text: translated.clone(),
            target_language,
            duration,
        })
        .await;

    match saved {
        Ok(recording_id) => {
            tracing::info!("recording saved: {}", recording_id);
            state
                .connections
                .send_to_connection(
                    connection_id,
                    &ServerMessage::RecordingSaved {
                        recording_id,
                        original: original_text,
                        translated,
                        target_language,
                    },
                )
                .await;
        }
        Err(e) => {
            tracing::error!("failed to persist recording: {}", e);
            recording_error(&state, connection_id, &format!("Failed to save: {e}")).await;
        }
    }
}

async fn recording_error(state: &AppState, connection_id: Uuid, message: &str) {
    state
        .connections
        .send_to_connection(
            connection_id,
            &ServerMessage::RecordingError {
                message: message.to_string(),
            },
        )
        .await;
}
