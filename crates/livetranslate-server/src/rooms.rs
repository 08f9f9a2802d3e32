use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use livetranslate_protocol::{Language, ParticipantData};
use rand::RngCore;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Maximum participants per room.
pub const ROOM_CAPACITY: usize = 4;

/// Why a join was refused. Capacity is a distinct outcome so clients can
/// tell "try another room" apart from bad input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinRejected {
    InvalidRoomId,
    RoomFull,
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub connection_id: Uuid,
    pub name: String,
    pub language: Language,
    pub stream_active: bool,
    pub screen_share_active: bool,
}

#[derive(Debug)]
struct Room {
    participants: HashMap<String, Participant>,
    created_at: DateTime<Utc>,
}

impl Room {
    fn new() -> Self {
        Self {
            participants: HashMap::new(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Default)]
struct RegistryInner {
    rooms: HashMap<String, Room>,
    /// Reverse index from connection id to (room id, user id). Disconnects
    /// arrive with only the connection id, so this must stay in lock-step
    /// with room membership.
    by_connection: HashMap<Uuid, (String, String)>,
}

/// Owns all room and participant state.
///
/// Both maps live under one lock so every mutating operation is
/// linearizable: the capacity check-then-insert in [`join`](Self::join) and
/// the membership/index updates are single atomic steps with respect to
/// other joins and leaves.
pub struct RoomRegistry {
    inner: RwLock<RegistryInner>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Create a room, generating an id when none is supplied. Idempotent
    /// for an existing id.
    pub async fn create_room(&self, room_id: Option<String>) -> String {
        let room_id = match room_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => generate_room_id(),
        };

        let mut inner = self.inner.write().await;
        inner.rooms.entry(room_id.clone()).or_insert_with(Room::new);
        room_id
    }

    /// Add a user to a room, creating the room on first join.
    ///
    /// Re-joining with an existing user id replaces that participant's
    /// connection, name, and language in place (a reconnect) and never
    /// counts against capacity.
    pub async fn join(
        &self,
        room_id: &str,
        user_id: &str,
        connection_id: Uuid,
        name: String,
        language: Language,
    ) -> Result<(), JoinRejected> {
        if room_id.trim().is_empty() || user_id.trim().is_empty() {
            return Err(JoinRejected::InvalidRoomId);
        }

        let mut inner = self.inner.write().await;
        let superseded = {
            let room = inner.rooms.entry(room_id.to_string()).or_insert_with(Room::new);
            if !room.participants.contains_key(user_id)
                && room.participants.len() >= ROOM_CAPACITY
            {
                return Err(JoinRejected::RoomFull);
            }

            room.participants
                .insert(
                    user_id.to_string(),
                    Participant {
                        connection_id,
                        name,
                        language,
                        stream_active: false,
                        screen_share_active: false,
                    },
                )
                .map(|prev| prev.connection_id)
                .filter(|prev| *prev != connection_id)
        };

        // A reconnect under a new connection id invalidates the old entry.
        if let Some(stale) = superseded {
            inner.by_connection.remove(&stale);
        }
        inner
            .by_connection
            .insert(connection_id, (room_id.to_string(), user_id.to_string()));
        Ok(())
    }

    /// Remove a user from a room. Removes the room itself once it is empty.
    /// Silent no-op when the room or user does not exist.
    pub async fn leave(&self, room_id: &str, user_id: &str) {
        let mut inner = self.inner.write().await;
        let removed = match inner.rooms.get_mut(room_id) {
            Some(room) => room.participants.remove(user_id),
            None => return,
        };

        let Some(participant) = removed else { return };

        // Only drop the index entry if it still points at this membership;
        // the connection may have since joined a different room.
        let still_ours = inner
            .by_connection
            .get(&participant.connection_id)
            .is_some_and(|(r, u)| r == room_id && u == user_id);
        if still_ours {
            inner.by_connection.remove(&participant.connection_id);
        }

        if inner
            .rooms
            .get(room_id)
            .is_some_and(|room| room.participants.is_empty())
        {
            inner.rooms.remove(room_id);
        }
    }

    /// Resolve a disconnecting connection to its room membership.
    pub async fn lookup_by_connection(&self, connection_id: Uuid) -> Option<(String, String)> {
        self.inner
            .read()
            .await
            .by_connection
            .get(&connection_id)
            .cloned()
    }

    pub async fn set_stream_active(&self, room_id: &str, user_id: &str, active: bool) {
        let mut inner = self.inner.write().await;
        if let Some(participant) = inner
            .rooms
            .get_mut(room_id)
            .and_then(|room| room.participants.get_mut(user_id))
        {
            participant.stream_active = active;
        }
    }

    pub async fn set_screen_share_active(&self, room_id: &str, user_id: &str, active: bool) {
        let mut inner = self.inner.write().await;
        if let Some(participant) = inner
            .rooms
            .get_mut(room_id)
            .and_then(|room| room.participants.get_mut(user_id))
        {
            participant.screen_share_active = active;
        }
    }

    pub async fn update_language(&self, room_id: &str, user_id: &str, language: Language) {
        let mut inner = self.inner.write().await;
        if let Some(participant) = inner
            .rooms
            .get_mut(room_id)
            .and_then(|room| room.participants.get_mut(user_id))
        {
            participant.language = language;
        }
    }

    /// Read-only membership projection, as sent to a newly joined client.
    pub async fn snapshot(&self, room_id: &str) -> Vec<ParticipantData> {
        let inner = self.inner.read().await;
        let Some(room) = inner.rooms.get(room_id) else {
            return Vec::new();
        };
        room.participants
            .iter()
            .map(|(user_id, p)| ParticipantData {
                id: user_id.clone(),
                name: p.name.clone(),
                language: p.language,
                stream_active: p.stream_active,
                screen_share_active: p.screen_share_active,
            })
            .collect()
    }

    /// The connection ids a room broadcast should reach, optionally
    /// excluding the sender.
    pub async fn audience(&self, room_id: &str, exclude: Option<Uuid>) -> Vec<Uuid> {
        let inner = self.inner.read().await;
        let Some(room) = inner.rooms.get(room_id) else {
            return Vec::new();
        };
        room.participants
            .values()
            .map(|p| p.connection_id)
            .filter(|id| Some(*id) != exclude)
            .collect()
    }

    pub async fn contains_room(&self, room_id: &str) -> bool {
        self.inner.read().await.rooms.contains_key(room_id)
    }

    pub async fn room_count(&self) -> usize {
        self.inner.read().await.rooms.len()
    }

    pub async fn participant_count(&self, room_id: &str) -> usize {
        self.inner
            .read()
            .await
            .rooms
            .get(room_id)
            .map(|room| room.participants.len())
            .unwrap_or(0)
    }

    pub async fn room_created_at(&self, room_id: &str) -> Option<DateTime<Utc>> {
        self.inner
            .read()
            .await
            .rooms
            .get(room_id)
            .map(|room| room.created_at)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// URL-safe room id with 12 bytes of CSPRNG entropy.
fn generate_room_id() -> String {
    let mut bytes = [0u8; 12];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
