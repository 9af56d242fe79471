use async_trait::async_trait;
use crate::config::Lang;
use crate::error::Result;

/// Information about a translator backend
#[derive(Debug, Clone)]
pub struct TranslatorInfo {
    /// Human-readable name
    pub name: &'static str,
    /// Whether this translator requires an API key
    pub requires_api_key: bool,
}

/// Text to translate together with its language pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub text: String,
    pub source: Lang,
    pub target: Lang,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>, source: Lang, target: Lang) -> Self {
        Self {
            text: text.into(),
            source,
            target,
        }
    }
}

/// Trait for translation backends
#[async_trait]
pub trait Translator: Send + Sync {
    /// Get information about this translator
    fn info(&self) -> TranslatorInfo;

    /// Get the translator name (convenience method)
    fn name(&self) -> &'static str {
        self.info().name
    }

    /// Translate the whole request in one call.
    ///
    /// Implementations return text that is already valid UTF-8 with any
    /// undecodable bytes from the service dropped.
    async fn translate(&self, request: &TranslationRequest) -> Result<String>;
}
