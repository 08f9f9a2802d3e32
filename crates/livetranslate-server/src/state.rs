use crate::recordings::RecordingStore;
use crate::rooms::RoomRegistry;
use crate::translate::{self, Translator};
use crate::ws::connections::ConnectionManager;
use livetranslate_protocol::ServerMessage;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct Config {
    pub bind_address: String,
    pub database_url: String,
    pub google_api_key: Option<String>,
    pub gemini_model: String,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:5000".to_string());

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:livetranslate.db".to_string());

        let google_api_key = std::env::var("GOOGLE_API_KEY").ok();

        let gemini_model = std::env::var("GEMINI_MODEL")
            .unwrap_or_else(|_| translate::DEFAULT_MODEL.to_string());

        Ok(Config {
            bind_address,
            database_url,
            google_api_key,
            gemini_model,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub rooms: Arc<RoomRegistry>,
    pub connections: Arc<ConnectionManager>,
    pub translator: Arc<dyn Translator>,
    pub recordings: Arc<dyn RecordingStore>,
}

impl AppState {
    pub fn new(
        config: Config,
        translator: Arc<dyn Translator>,
        recordings: Arc<dyn RecordingStore>,
    ) -> Self {
        Self {
            config,
            rooms: Arc::new(RoomRegistry::new()),
            connections: Arc::new(ConnectionManager::new()),
            translator,
            recordings,
        }
    }

    /// The one broadcast primitive: deliver a message to a room's current
    /// audience, optionally excluding the sending connection.
    pub async fn broadcast(
        &self,
        room_id: &str,
        exclude: Option<Uuid>,
        message: &ServerMessage,
    ) {
        let audience = self.rooms.audience(room_id, exclude).await;
        self.connections.send_to_many(&audience, message).await;
    }
}
