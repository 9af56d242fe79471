use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A language, named the way it should appear in prompts and on the
/// certificate (e.g. "English", "Spanish").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lang(pub String);

impl Lang {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Lang {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Lang {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Default OpenAI endpoint
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
/// Default chat model used for translation
pub const DEFAULT_MODEL: &str = "gpt-4-turbo-preview";

/// Default sidecar file for the raw extracted text
pub const DEFAULT_EXTRACTED_TEXT_PATH: &str = "extracted_text.txt";
/// Default sidecar file for the translated text
pub const DEFAULT_TRANSLATED_TEXT_PATH: &str = "translated_extracted_text.txt";
/// Default path of the rendered translation PDF
pub const DEFAULT_TRANSLATED_PDF_PATH: &str = "translated_extracted_text.pdf";

/// Translator backend configuration for OpenAI-compatible APIs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatorConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature; the service default is used when unset
    #[serde(default)]
    pub temperature: Option<f32>,
}

impl TranslatorConfig {
    /// Create a new translator config
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            api_base: api_base.into(),
            api_key,
            model: model.into(),
            temperature: None,
        }
    }

    /// Fail early when no usable API key is configured.
    pub fn validate(&self) -> Result<(), crate::error::Error> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => Ok(()),
            _ => Err(crate::error::Error::MissingArgument("--api_key")),
        }
    }
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self::new(default_api_base(), None, default_model())
    }
}

/// The person signing the certificate of translation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignerConfig {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// Source and target languages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguagesConfig {
    pub source: Option<Lang>,
    pub target: Option<Lang>,
}

/// Locations of the intermediate artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputsConfig {
    #[serde(default = "default_extracted_text")]
    pub extracted_text: PathBuf,
    #[serde(default = "default_translated_text")]
    pub translated_text: PathBuf,
    #[serde(default = "default_translated_pdf")]
    pub translated_pdf: PathBuf,
}

fn default_extracted_text() -> PathBuf {
    PathBuf::from(DEFAULT_EXTRACTED_TEXT_PATH)
}

fn default_translated_text() -> PathBuf {
    PathBuf::from(DEFAULT_TRANSLATED_TEXT_PATH)
}

fn default_translated_pdf() -> PathBuf {
    PathBuf::from(DEFAULT_TRANSLATED_PDF_PATH)
}

impl Default for OutputsConfig {
    fn default() -> Self {
        Self {
            extracted_text: default_extracted_text(),
            translated_text: default_translated_text(),
            translated_pdf: default_translated_pdf(),
        }
    }
}

impl OutputsConfig {
    /// Place all intermediate artifacts under `dir`, keeping their default names.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            extracted_text: dir.join(DEFAULT_EXTRACTED_TEXT_PATH),
            translated_text: dir.join(DEFAULT_TRANSLATED_TEXT_PATH),
            translated_pdf: dir.join(DEFAULT_TRANSLATED_PDF_PATH),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Translator backend configuration
    #[serde(default)]
    pub translator: TranslatorConfig,

    /// Certificate signer
    #[serde(default)]
    pub signer: SignerConfig,

    /// Language pair
    #[serde(default)]
    pub languages: LanguagesConfig,

    /// Intermediate artifact paths
    #[serde(default)]
    pub outputs: OutputsConfig,
}

impl AppConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, crate::error::Error> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::error::Error::ConfigLoad(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, crate::error::Error> {
        toml::from_str(content).map_err(|e| {
            crate::error::Error::ConfigLoad(format!("Failed to parse config: {e}"))
        })
    }

    /// Load from default locations (~/.config/pdf-certify/config.toml, ./config.toml)
    pub fn load() -> Self {
        if let Some(config_dir) = crate::util::config_dir() {
            let user_config = config_dir.join("pdf-certify").join("config.toml");
            if user_config.exists() {
                match Self::from_file(&user_config) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {}", user_config.display());
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        let local_config = std::path::PathBuf::from("config.toml");
        if local_config.exists() {
            match Self::from_file(&local_config) {
                Ok(config) => {
                    tracing::debug!("Loaded config from ./config.toml");
                    return config;
                }
                Err(e) => {
                    tracing::warn!("Failed to load ./config.toml: {}", e);
                }
            }
        }

        tracing::debug!("No config file found, using defaults");
        Self::default()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.translator.api_base, DEFAULT_API_BASE);
        assert_eq!(config.translator.model, DEFAULT_MODEL);
        assert_eq!(
            config.outputs.translated_pdf,
            PathBuf::from("translated_extracted_text.pdf")
        );
        assert!(config.signer.name.is_none());
    }

    #[test]
    fn test_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
            [signer]
            name = "Jane Doe"

            [languages]
            source = "English"
            target = "Spanish"

            [outputs]
            extracted_text = "work/extracted.txt"
            "#,
        )
        .unwrap();

        assert_eq!(config.signer.name.as_deref(), Some("Jane Doe"));
        assert!(config.signer.address.is_none());
        assert_eq!(config.languages.target, Some(Lang::new("Spanish")));
        assert_eq!(config.outputs.extracted_text, PathBuf::from("work/extracted.txt"));
        assert_eq!(
            config.outputs.translated_text,
            PathBuf::from(DEFAULT_TRANSLATED_TEXT_PATH)
        );
        assert_eq!(config.translator.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_invalid_toml() {
        let result = AppConfig::from_toml("[signer\nname = 1");
        assert!(matches!(result, Err(crate::error::Error::ConfigLoad(_))));
    }

    #[test]
    fn test_translator_requires_api_key() {
        let mut config = TranslatorConfig::default();
        assert!(matches!(
            config.validate(),
            Err(crate::error::Error::MissingArgument("--api_key"))
        ));

        config.api_key = Some("  ".to_string());
        assert!(config.validate().is_err());

        config.api_key = Some("sk-test".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_outputs_in_dir() {
        let outputs = OutputsConfig::in_dir("/tmp/run");
        assert_eq!(
            outputs.extracted_text,
            PathBuf::from("/tmp/run/extracted_text.txt")
        );
    }
}
