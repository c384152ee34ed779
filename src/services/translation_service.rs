// services/translation_service.rs

use log::error;

use super::llm_service::ChatModel;

/// System turn directing the model to translate into `to_lang`
pub fn translation_prompt(to_lang: &str) -> String {
    format!(
        "Translate the following text to {}. Only return the translated text.",
        to_lang
    )
}

/// Result of a translation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub translated_text: String,
    /// Set when the model call failed and the input was passed through
    pub degraded: bool,
}

/// Translates `text` into `to_lang`.
///
/// Never fails: a model error passes the original text through with
/// `degraded` set, and an empty model answer also yields the original text.
pub async fn translate(model: &dyn ChatModel, text: &str, to_lang: &str) -> Translation {
    match model.complete(&translation_prompt(to_lang), text).await {
        Ok(output) => {
            let trimmed = output.trim();
            let translated_text = if trimmed.is_empty() { text } else { trimmed };
            Translation {
                translated_text: translated_text.to_string(),
                degraded: false,
            }
        }
        Err(e) => {
            error!("Translation to {} failed: {}", to_lang, e);
            Translation {
                translated_text: text.to_string(),
                degraded: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_service::testing::StubModel;

    #[tokio::test]
    async fn trims_model_output() {
        let model = StubModel::replying("  Tengo dolor de cabeza \n");
        let result = translate(&model, "I have a headache", "es").await;

        assert_eq!(result.translated_text, "Tengo dolor de cabeza");
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn sends_two_turn_prompt() {
        let model = StubModel::replying("hola");
        translate(&model, "hello", "es").await;

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].0,
            "Translate the following text to es. Only return the translated text."
        );
        assert_eq!(calls[0].1, "hello");
    }

    #[tokio::test]
    async fn empty_output_falls_back_to_input() {
        let model = StubModel::replying("   ");
        let result = translate(&model, "I have a headache", "es").await;

        assert_eq!(result.translated_text, "I have a headache");
        assert!(!result.degraded);
    }

    #[tokio::test]
    async fn model_failure_passes_text_through() {
        let model = StubModel::failing();
        let result = translate(&model, "Me duele el estómago", "en").await;

        assert_eq!(result.translated_text, "Me duele el estómago");
        assert!(result.degraded);
    }
}
