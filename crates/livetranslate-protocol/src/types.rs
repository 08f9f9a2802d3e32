use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::languages::Language;

/// Room membership view of a single participant, as sent in the
/// `joined-room` snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantData {
    pub id: String,
    pub name: String,
    pub language: Language,
    pub stream_active: bool,
    pub screen_share_active: bool,
}

/// Saved recording as returned by `recordings-list`.
///
/// The audio blob is deliberately omitted from the listing projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingData {
    pub id: i64,
    pub room_id: String,
    pub user_id: String,
    pub original_text: String,
    pub translated_text: String,
    pub target_language: Language,
    pub duration: f64,
    pub created_at: DateTime<Utc>,
}
