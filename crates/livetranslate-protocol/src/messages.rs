use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::languages::Language;
use crate::types::{ParticipantData, RecordingData};

fn default_name() -> String {
    "Anonymous".to_string()
}

fn default_source_lang() -> String {
    "en".to_string()
}

/// Events sent from client to server over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientMessage {
    /// Create (or idempotently re-create) a room.
    #[serde(rename_all = "camelCase")]
    CreateRoom {
        #[serde(default)]
        room_id: Option<String>,
    },

    /// Join a room, creating it on first join.
    #[serde(rename_all = "camelCase")]
    JoinRoom {
        room_id: String,
        user_id: String,
        #[serde(default = "default_name")]
        name: String,
        #[serde(default)]
        language: Language,
    },

    /// Explicitly leave a room.
    #[serde(rename_all = "camelCase")]
    LeaveRoom { room_id: String, user_id: String },

    /// Opaque webcam frame to relay to the rest of the room.
    #[serde(rename_all = "camelCase")]
    VideoFrame {
        room_id: String,
        user_id: String,
        frame: String,
    },

    /// Opaque screen-share frame to relay to the rest of the room.
    #[serde(rename_all = "camelCase")]
    ScreenFrame {
        room_id: String,
        user_id: String,
        frame: String,
    },

    #[serde(rename_all = "camelCase")]
    StopScreenShare { room_id: String, user_id: String },

    /// Transcribed speech for live translation.
    #[serde(rename_all = "camelCase")]
    AudioChunk {
        room_id: String,
        user_id: String,
        text: String,
        #[serde(default = "default_source_lang")]
        source_lang: String,
        #[serde(default)]
        target_lang: Language,
    },

    /// Persist a voice recording together with its translation.
    #[serde(rename_all = "camelCase")]
    SaveRecording {
        room_id: String,
        user_id: String,
        /// Base64-encoded audio payload.
        audio_blob: String,
        original_text: String,
        #[serde(default)]
        target_language: Language,
        #[serde(default)]
        duration: f64,
    },

    #[serde(rename_all = "camelCase")]
    GetRecordings { room_id: String },

    /// Re-translate an existing recording to a new language.
    #[serde(rename_all = "camelCase")]
    TranslateRecording {
        recording_id: i64,
        target_language: Language,
        original_text: String,
    },

    #[serde(rename_all = "camelCase")]
    UpdateLanguage {
        room_id: String,
        user_id: String,
        language: Language,
    },

    /// WebRTC handshake payload, relayed opaquely.
    #[serde(rename_all = "camelCase")]
    Signal {
        room_id: String,
        target_user: String,
        from_user: String,
        signal: serde_json::Value,
    },

    /// Keepalive.
    Ping,
}

/// Events sent from server to client over the WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerMessage {
    /// Connection acknowledged.
    #[serde(rename_all = "camelCase")]
    Connected { connection_id: Uuid },

    #[serde(rename_all = "camelCase")]
    RoomCreated { room_id: String },

    /// Join confirmation carrying the post-join membership snapshot,
    /// including the joiner itself.
    #[serde(rename_all = "camelCase")]
    JoinedRoom {
        room_id: String,
        user_id: String,
        users: Vec<ParticipantData>,
    },

    #[serde(rename_all = "camelCase")]
    UserJoined {
        user_id: String,
        name: String,
        language: Language,
    },

    /// The room already holds its maximum of four participants.
    #[serde(rename_all = "camelCase")]
    RoomFull { room_id: String },

    #[serde(rename_all = "camelCase")]
    UserLeft { user_id: String },

    #[serde(rename_all = "camelCase")]
    VideoFrame { user_id: String, frame: String },

    #[serde(rename_all = "camelCase")]
    ScreenFrame { user_id: String, frame: String },

    #[serde(rename_all = "camelCase")]
    ScreenShareStopped { user_id: String },

    /// Live translation broadcast to the whole room. `translated` carries
    /// the `"..."` placeholder when the gateway failed.
    #[serde(rename_all = "camelCase")]
    TranslationResult {
        user_id: String,
        original: String,
        translated: String,
        source_lang: String,
        target_lang: Language,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reverse_translation: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    RecordingSaved {
        recording_id: i64,
        original: String,
        translated: String,
        target_language: Language,
    },

    #[serde(rename_all = "camelCase")]
    RecordingError { message: String },

    #[serde(rename_all = "camelCase")]
    RecordingsList { recordings: Vec<RecordingData> },

    #[serde(rename_all = "camelCase")]
    RecordingTranslated {
        recording_id: i64,
        target_language: Language,
        translated: String,
    },

    #[serde(rename_all = "camelCase")]
    LanguageUpdated { user_id: String, language: Language },

    #[serde(rename_all = "camelCase")]
    Signal {
        from_user: String,
        signal: serde_json::Value,
    },

    /// Generic validation failure, reported to the caller only.
    #[serde(rename_all = "camelCase")]
    Error { message: String },

    Pong,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_use_kebab_case_tags() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"join-room","roomId":"R1","userId":"alice"}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::JoinRoom {
                room_id,
                user_id,
                name,
                language,
            } => {
                assert_eq!(room_id, "R1");
                assert_eq!(user_id, "alice");
                assert_eq!(name, "Anonymous");
                assert_eq!(language, Language::Spanish);
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn server_events_use_camel_case_fields() {
        let json = serde_json::to_value(&ServerMessage::RoomFull {
            room_id: "R1".to_string(),
        })
        .unwrap();
        assert_eq!(json["type"], "room-full");
        assert_eq!(json["roomId"], "R1");
    }

    #[test]
    fn translation_result_omits_absent_reverse_translation() {
        let json = serde_json::to_value(&ServerMessage::TranslationResult {
            user_id: "alice".to_string(),
            original: "Hello".to_string(),
            translated: "...".to_string(),
            source_lang: "en".to_string(),
            target_lang: Language::French,
            reverse_translation: None,
        })
        .unwrap();
        assert!(json.get("reverseTranslation").is_none());
    }

    #[test]
    fn unknown_event_tag_is_rejected() {
        let result: Result<ClientMessage, _> =
            serde_json::from_str(r#"{"type":"launch-missiles"}"#);
        assert!(result.is_err());
    }
}
