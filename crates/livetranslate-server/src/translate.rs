use async_trait::async_trait;
use livetranslate_protocol::Language;
use thiserror::Error;

/// Default generation model, matching the service's provider account.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("empty input text")]
    EmptyInput,

    #[error("translation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("translation provider returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("malformed provider response")]
    MalformedResponse,
}

/// The translation gateway: one synchronous-per-request operation that
/// yields the bare translated string or a failure. Provider errors never
/// escape as anything other than [`TranslateError`].
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslateError>;
}

/// Gemini-backed [`Translator`] using the `generateContent` endpoint.
pub struct GeminiTranslator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiTranslator {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        )
    }
}

/// Few-shot prompt that pins the model to emitting only the translation,
/// with no surrounding explanation.
fn translation_prompt(text: &str, target: Language) -> String {
    format!(
        "Task: Translate to {target}.\n\
         Rule: Return ONLY the translated text. No notes, no explanations.\n\
         \n\
         Examples:\n\
         Input: Hello there\n\
         Output: Hola\n\
         Input: How are you doing?\n\
         Output: ¿Cómo estás?\n\
         Input: Good morning\n\
         Output: Buenos días\n\
         \n\
         Input: {text}\n\
         Output:"
    )
}

#[async_trait]
impl Translator for GeminiTranslator {
    async fn translate(&self, text: &str, target: Language) -> Result<String, TranslateError> {
        if text.trim().is_empty() {
            return Err(TranslateError::EmptyInput);
        }

        let body = serde_json::json!({
            "contents": [{"parts": [{"text": translation_prompt(text, target)}]}],
            "generationConfig": {
                "temperature": 0.0,
                "maxOutputTokens": 50,
            },
        });

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("translation provider returned {}", status);
            return Err(TranslateError::Status(status));
        }

        let payload: serde_json::Value = response.json().await?;
        let translated = payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::trim)
            .ok_or(TranslateError::MalformedResponse)?;

        if translated.is_empty() {
            return Err(TranslateError::MalformedResponse);
        }
        Ok(translated.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_fails_without_calling_the_provider() {
        // The key and model are bogus; an HTTP call would error differently.
        let translator = GeminiTranslator::new("no-key".to_string(), "no-model".to_string());
        let result = translator.translate("", Language::French).await;
        assert!(matches!(result, Err(TranslateError::EmptyInput)));
        let result = translator.translate("   ", Language::French).await;
        assert!(matches!(result, Err(TranslateError::EmptyInput)));
    }

    #[test]
    fn prompt_names_the_target_and_ends_at_the_output_marker() {
        let prompt = translation_prompt("Good evening", Language::German);
        assert!(prompt.starts_with("Task: Translate to German."));
        assert!(prompt.contains("Input: Good evening\n"));
        assert!(prompt.ends_with("Output:"));
    }
}
