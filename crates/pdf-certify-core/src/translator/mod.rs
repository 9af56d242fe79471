mod traits;
mod openai;
mod sanitize;

pub use traits::{Translator, TranslatorInfo, TranslationRequest};
pub use openai::{OpenAiTranslator, system_prompt};
pub use sanitize::{sanitize_text, strip_unpaired_surrogates};

use crate::config::TranslatorConfig;
use crate::error::Result;
use std::sync::Arc;

/// Create a translator from configuration
pub fn create_translator(config: &TranslatorConfig) -> Result<Arc<dyn Translator>> {
    let translator = OpenAiTranslator::new(
        config.api_base.clone(),
        config.api_key.clone(),
        config.model.clone(),
    )?
    .with_temperature(config.temperature);

    Ok(Arc::new(translator))
}
