//! LiveTranslate Server Library
//!
//! This module exposes the server components for testing and embedding.

pub mod api;
pub mod db;
pub mod recordings;
pub mod rooms;
pub mod state;
pub mod translate;
pub mod ws;

use crate::recordings::{RecordingStore, SqliteRecordingStore};
use crate::translate::Translator;
use anyhow::Result;
use std::sync::Arc;

/// Create and configure the server application.
pub async fn create_app(
    config: state::Config,
    translator: Arc<dyn Translator>,
) -> Result<axum::Router> {
    let pool = db::init_pool(&config.database_url).await?;
    db::init_schema(&pool).await?;
    let recordings: Arc<dyn RecordingStore> = Arc::new(SqliteRecordingStore::new(pool));
    let app_state = state::AppState::new(config, translator, recordings);
    Ok(api::create_router(app_state))
}
