use crate::config::EngineConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum TranslationFailure {
    /// Network failure or timeout before a response arrived
    #[error("translation request failed: {0}")]
    Request(String),

    /// The engine answered with a non-success status
    #[error("translation engine returned status {status}: {message}")]
    Engine { status: u16, message: String },

    /// The engine answered but the structured reply did not parse
    #[error("malformed translation response: {0}")]
    Malformed(String),
}

/// Normalized translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub translated_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detected_source_language: Option<String>,
    /// Model self-reported confidence, 0.0-1.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate one text into the target language. Callers are responsible
    /// for skipping no-op translations (target == configured source); the
    /// gateway always issues the request. Never retried automatically.
    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
        context: Option<&str>,
    ) -> Result<Translation, TranslationFailure>;

    /// Translate a batch concurrently. Results line up with the input by
    /// index; there is no ordering dependency between the requests.
    async fn batch_translate(
        &self,
        texts: &[String],
        source_language: Option<&str>,
        target_language: &str,
    ) -> Vec<Result<Translation, TranslationFailure>> {
        let requests = texts
            .iter()
            .map(|text| self.translate(text, source_language, target_language, None));
        futures::future::join_all(requests).await
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Shape the model is instructed to reply with
#[derive(Debug, Deserialize)]
struct StructuredTranslation {
    translation: String,
    #[serde(default)]
    detected_language: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
}

/// `Translator` backed by an OpenAI-compatible chat-completions endpoint
pub struct HttpTranslationGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl HttpTranslationGateway {
    pub fn new(config: &EngineConfig) -> Result<Self, TranslationFailure> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TranslationFailure::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }
}

fn build_prompt(
    text: &str,
    source_language: Option<&str>,
    target_language: &str,
    context: Option<&str>,
) -> String {
    let source_clause = match source_language {
        Some(source) if !source.is_empty() && !source.eq_ignore_ascii_case("auto") => {
            format!(" from {}", source)
        }
        _ => String::new(),
    };
    let context_clause = context
        .filter(|c| !c.is_empty())
        .map(|c| format!("Context for this text: {}\n", c))
        .unwrap_or_default();

    format!(
        "Translate the following text{} into {}.\n\
         Requirements:\n\
         - Preserve the tone and register of the original.\n\
         - Keep proper nouns and brand names untranslated.\n\
         - If the text is already in {}, return it unchanged.\n\
         {}\
         Respond with only a JSON object of the form \
         {{\"translation\": \"...\", \"detected_language\": \"...\", \"confidence\": 0.0}} \
         where confidence is between 0.0 and 1.0.\n\n\
         Text:\n{}",
        source_clause, target_language, target_language, context_clause, text
    )
}

/// Models wrap the JSON reply in a code fence often enough to tolerate it
fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[async_trait]
impl Translator for HttpTranslationGateway {
    async fn translate(
        &self,
        text: &str,
        source_language: Option<&str>,
        target_language: &str,
        context: Option<&str>,
    ) -> Result<Translation, TranslationFailure> {
        let url = format!("{}/chat/completions", self.base_url);

        let request_body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: build_prompt(text, source_language, target_language, context),
            }],
            temperature: 0.2,
        };

        let mut request = self.client.post(&url).json(&request_body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TranslationFailure::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error response".to_string());
            return Err(TranslationFailure::Engine {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| TranslationFailure::Malformed(e.to_string()))?;

        let content = completion
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                TranslationFailure::Malformed("no content in completion response".to_string())
            })?;

        let structured: StructuredTranslation = serde_json::from_str(strip_code_fence(&content))
            .map_err(|e| TranslationFailure::Malformed(e.to_string()))?;

        debug!(
            "Translated {} chars into {} ({} chars)",
            text.len(),
            target_language,
            structured.translation.len()
        );

        Ok(Translation {
            translated_text: structured.translation,
            detected_source_language: structured.detected_language,
            confidence: structured.confidence,
        })
    }
}
