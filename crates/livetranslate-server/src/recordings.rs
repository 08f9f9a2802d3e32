use async_trait::async_trait;
use chrono::{DateTime, Utc};
use livetranslate_protocol::{Language, RecordingData};
use sqlx::{Row, SqlitePool};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A recording ready to be persisted.
#[derive(Debug, Clone)]
pub struct NewRecording {
    pub room_id: String,
    pub user_id: String,
    pub audio: Vec<u8>,
    pub original_text: String,
    pub translated_text: String,
    pub target_language: Language,
    pub duration: f64,
}

/// Durable store for saved recordings. The relay only constructs records
/// and forwards them here; the store owns their lifecycle.
#[async_trait]
pub trait RecordingStore: Send + Sync {
    async fn save(&self, recording: NewRecording) -> Result<i64, StoreError>;

    /// Recordings for a room, newest first, without the audio payload.
    async fn list_by_room(&self, room_id: &str, limit: u32)
    -> Result<Vec<RecordingData>, StoreError>;
}

#[derive(Clone)]
pub struct SqliteRecordingStore {
    db: SqlitePool,
}

impl SqliteRecordingStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordingStore for SqliteRecordingStore {
    async fn save(&self, recording: NewRecording) -> Result<i64, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO recordings
                (room_id, user_id, audio_data, original_text, translated_text,
                 target_language, duration, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&recording.room_id)
        .bind(&recording.user_id)
        .bind(&recording.audio)
        .bind(&recording.original_text)
        .bind(&recording.translated_text)
        .bind(recording.target_language.name())
        .bind(recording.duration)
        .bind(Utc::now())
        .fetch_one(&self.db)
        .await?;

        Ok(row.try_get("id")?)
    }

    async fn list_by_room(
        &self,
        room_id: &str,
        limit: u32,
    ) -> Result<Vec<RecordingData>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, room_id, user_id, original_text, translated_text,
                   target_language, duration, created_at
            FROM recordings
            WHERE room_id = ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(room_id)
        .bind(limit as i64)
        .fetch_all(&self.db)
        .await?;

        rows.into_iter()
            .map(|row| {
                Ok(RecordingData {
                    id: row.try_get("id")?,
                    room_id: row.try_get("room_id")?,
                    user_id: row.try_get("user_id")?,
                    original_text: row.try_get("original_text")?,
                    translated_text: row.try_get("translated_text")?,
                    target_language: Language::from_name(
                        &row.try_get::<String, _>("target_language")?,
                    ),
                    duration: row.try_get("duration")?,
                    created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn store() -> SqliteRecordingStore {
        let pool = db::init_pool("sqlite::memory:").await.unwrap();
        db::init_schema(&pool).await.unwrap();
        SqliteRecordingStore::new(pool)
    }

    fn recording(room: &str, text: &str) -> NewRecording {
        NewRecording {
            room_id: room.to_string(),
            user_id: "alice".to_string(),
            audio: vec![1, 2, 3],
            original_text: text.to_string(),
            translated_text: format!("{text} (es)"),
            target_language: Language::Spanish,
            duration: 1.5,
        }
    }

    #[tokio::test]
    async fn save_returns_increasing_ids() {
        let store = store().await;
        let first = store.save(recording("R1", "one")).await.unwrap();
        let second = store.save(recording("R1", "two")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn list_is_newest_first_scoped_to_room_and_bounded() {
        let store = store().await;
        store.save(recording("R1", "one")).await.unwrap();
        store.save(recording("R2", "other")).await.unwrap();
        store.save(recording("R1", "two")).await.unwrap();

        let listed = store.list_by_room("R1", 50).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].original_text, "two");
        assert_eq!(listed[1].original_text, "one");
        assert_eq!(listed[0].target_language, Language::Spanish);

        let capped = store.list_by_room("R1", 1).await.unwrap();
        assert_eq!(capped.len(), 1);
        assert_eq!(capped[0].original_text, "two");
    }
}
