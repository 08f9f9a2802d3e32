//! LiveTranslate Protocol
//!
//! Shared wire types for the LiveTranslate relay: the tagged client/server
//! event enums and the data structures they carry. Event tags and payload
//! field names are fixed by the wire protocol (kebab-case tags, camelCase
//! fields).

pub mod languages;
pub mod messages;
pub mod types;

pub use languages::{Language, LanguageInfo};
pub use messages::{ClientMessage, ServerMessage};
pub use types::{ParticipantData, RecordingData};
