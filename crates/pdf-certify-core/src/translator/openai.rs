use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::Lang;
use crate::error::{Error, Result};
use super::sanitize::{sanitize_text, strip_unpaired_surrogates};
use super::traits::{TranslationRequest, Translator, TranslatorInfo};

/// OpenAI-compatible chat completions translator.
///
/// Sends the whole text in a single request: no chunking, no retries, and
/// no client-side timeout.
pub struct OpenAiTranslator {
    client: Client,
    /// Base URL for the API (e.g., "https://api.openai.com/v1")
    pub api_base: String,
    /// Optional API key for authentication
    pub api_key: Option<String>,
    /// Model identifier
    pub model: String,
    /// Sampling temperature, left to the service when unset
    pub temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Instruction sent as the system message for a language pair.
pub fn system_prompt(source: &Lang, target: &Lang) -> String {
    format!(
        "You are a helpful assistant. You are expert in translating from {source} to {target}. \
         Please translate the article text verbatim, excluding any website navigation, ads, \
         footers, or other non-article elements. Translate header. You are tasked with \
         outputting the translation of the whole article. Please output nothing but the \
         translation"
    )
}

/// Decode a chat completions body, dropping bytes that are not valid UTF-8
/// and surrogate escapes that do not form a pair.
fn parse_chat_response(body: &[u8]) -> Result<String> {
    let body = strip_unpaired_surrogates(&sanitize_text(body));
    let response: ChatResponse = serde_json::from_str(&body)
        .map_err(|e| Error::TranslationService(format!("invalid response body: {e}")))?;

    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.is_empty())
        .ok_or(Error::TranslationEmptyResponse)
}

impl OpenAiTranslator {
    pub fn new(api_base: String, api_key: Option<String>, model: String) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::TranslationService(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base,
            api_key,
            model,
            temperature: None,
        })
    }

    #[must_use]
    pub const fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    async fn request(&self, request: &TranslationRequest) -> Result<String> {
        let url = self.endpoint();
        let prompt = system_prompt(&request.source, &request.target);

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &prompt,
                },
                Message {
                    role: "user",
                    content: &request.text,
                },
            ],
            temperature: self.temperature,
        };

        debug!(
            "Sending {} characters to {} ({})",
            request.text.chars().count(),
            url,
            self.model
        );

        let mut req = self.client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| {
            error!("Request failed: {}", e);
            Error::TranslationService(e.to_string())
        })?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::TranslationService(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            let body = sanitize_text(&bytes);
            error!("API error: {} - {}", status, body);
            return Err(Error::TranslationService(format!("HTTP {status}: {body}")));
        }

        parse_chat_response(&bytes)
    }
}

#[async_trait]
impl Translator for OpenAiTranslator {
    fn info(&self) -> TranslatorInfo {
        TranslatorInfo {
            name: "OpenAI Compatible",
            requires_api_key: true,
        }
    }

    async fn translate(&self, request: &TranslationRequest) -> Result<String> {
        self.request(request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_API_BASE;

    #[test]
    fn test_system_prompt_embeds_languages() {
        let prompt = system_prompt(&Lang::new("English"), &Lang::new("Spanish"));
        assert!(prompt.contains("expert in translating from English to Spanish."));
        assert!(prompt.ends_with("Please output nothing but the translation"));
    }

    #[test]
    fn test_parse_chat_response() {
        let body = br#"{"choices":[{"message":{"role":"assistant","content":"Hola\nMundo"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "Hola\nMundo");
    }

    #[test]
    fn test_parse_chat_response_drops_invalid_bytes() {
        let body = b"{\"choices\":[{\"message\":{\"content\":\"Hola \xFFMundo\"}}]}";
        assert_eq!(parse_chat_response(body).unwrap(), "Hola Mundo");
    }

    #[test]
    fn test_parse_chat_response_drops_lone_surrogates() {
        let body = br#"{"choices":[{"message":{"content":"Hola \ud83d Mundo"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "Hola  Mundo");

        let body = br#"{"choices":[{"message":{"content":"ok \ud83d\ude00"}}]}"#;
        assert_eq!(parse_chat_response(body).unwrap(), "ok \u{1F600}");
    }

    #[test]
    fn test_info_requires_api_key() {
        let translator =
            OpenAiTranslator::new(DEFAULT_API_BASE.to_string(), None, "m".to_string()).unwrap();
        assert!(translator.info().requires_api_key);
        assert_eq!(translator.name(), "OpenAI Compatible");
    }

    #[test]
    fn test_parse_chat_response_without_content() {
        for body in [
            br#"{"choices":[]}"#.as_slice(),
            br#"{"choices":[{"message":{"content":null}}]}"#.as_slice(),
            br#"{"choices":[{"message":{"content":""}}]}"#.as_slice(),
        ] {
            assert!(matches!(
                parse_chat_response(body),
                Err(Error::TranslationEmptyResponse)
            ));
        }
    }

    #[test]
    fn test_parse_chat_response_garbage() {
        assert!(matches!(
            parse_chat_response(b"<html>Bad Gateway</html>"),
            Err(Error::TranslationService(_))
        ));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        let translator = OpenAiTranslator::new(
            "https://api.openai.com/v1/".to_string(),
            None,
            "gpt-4-turbo-preview".to_string(),
        )
        .unwrap();
        assert_eq!(translator.endpoint(), "https://api.openai.com/v1/chat/completions");
    }

    #[test]
    fn test_request_serialization() {
        let body = ChatRequest {
            model: "m",
            messages: vec![Message {
                role: "user",
                content: "text",
            }],
            temperature: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "user");
        assert!(json.get("temperature").is_none());
    }
}
