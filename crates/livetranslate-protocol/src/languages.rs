use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported translation languages.
///
/// The twelve selectable targets plus English, which is the reference
/// language used for reverse translations. On the wire a language is its
/// English name; unknown names fall back to the default (Spanish).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Language {
    #[default]
    Spanish,
    French,
    German,
    Hindi,
    Chinese,
    Japanese,
    Korean,
    Arabic,
    Portuguese,
    Russian,
    Italian,
    Turkish,
    English,
}

/// Language metadata as served by `/api/languages`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInfo {
    pub name: &'static str,
    pub code: &'static str,
    pub native_name: &'static str,
}

impl Language {
    pub const ALL: [Language; 13] = [
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Hindi,
        Language::Chinese,
        Language::Japanese,
        Language::Korean,
        Language::Arabic,
        Language::Portuguese,
        Language::Russian,
        Language::Italian,
        Language::Turkish,
        Language::English,
    ];

    /// Resolve a language by its English name, falling back to the default
    /// for anything unrecognized.
    pub fn from_name(name: &str) -> Self {
        Language::ALL
            .into_iter()
            .find(|lang| lang.name() == name)
            .unwrap_or_default()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Hindi => "Hindi",
            Language::Chinese => "Chinese",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Arabic => "Arabic",
            Language::Portuguese => "Portuguese",
            Language::Russian => "Russian",
            Language::Italian => "Italian",
            Language::Turkish => "Turkish",
            Language::English => "English",
        }
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Spanish => "es",
            Language::French => "fr",
            Language::German => "de",
            Language::Hindi => "hi",
            Language::Chinese => "zh",
            Language::Japanese => "ja",
            Language::Korean => "ko",
            Language::Arabic => "ar",
            Language::Portuguese => "pt",
            Language::Russian => "ru",
            Language::Italian => "it",
            Language::Turkish => "tr",
            Language::English => "en",
        }
    }

    pub fn native_name(&self) -> &'static str {
        match self {
            Language::Spanish => "Español",
            Language::French => "Français",
            Language::German => "Deutsch",
            Language::Hindi => "हिन्दी",
            Language::Chinese => "中文",
            Language::Japanese => "日本語",
            Language::Korean => "한국어",
            Language::Arabic => "العربية",
            Language::Portuguese => "Português",
            Language::Russian => "Русский",
            Language::Italian => "Italiano",
            Language::Turkish => "Türkçe",
            Language::English => "English",
        }
    }

    pub fn info(&self) -> LanguageInfo {
        LanguageInfo {
            name: self.name(),
            code: self.code(),
            native_name: self.native_name(),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for Language {
    fn from(name: String) -> Self {
        Language::from_name(&name)
    }
}

impl From<Language> for String {
    fn from(lang: Language) -> Self {
        lang.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_names() {
        assert_eq!(Language::from_name("French"), Language::French);
        assert_eq!(Language::from_name("Turkish").code(), "tr");
    }

    #[test]
    fn unknown_name_falls_back_to_default() {
        assert_eq!(Language::from_name("Klingon"), Language::Spanish);
        assert_eq!(Language::from_name(""), Language::Spanish);
    }

    #[test]
    fn serializes_as_bare_name() {
        let json = serde_json::to_string(&Language::German).unwrap();
        assert_eq!(json, "\"German\"");
        let parsed: Language = serde_json::from_str("\"Japanese\"").unwrap();
        assert_eq!(parsed, Language::Japanese);
    }
}
