// services/summary_service.rs

use log::error;

use super::llm_service::ChatModel;

pub const SUMMARY_PROMPT: &str = "Summarize the following healthcare conversation. \
Highlight medically important points such as symptoms, diagnoses, medications, and follow-up actions. \
Keep it concise.";

pub const NO_SUMMARY: &str = "No summary available.";
pub const SUMMARY_ERROR: &str = "Error generating summary.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub summary: String,
    pub failed: bool,
}

/// Summarizes a newline-joined `"<role>: <text>"` transcript
pub async fn summarize(model: &dyn ChatModel, transcript: &str) -> Summary {
    match model.complete(SUMMARY_PROMPT, transcript).await {
        Ok(output) => {
            let trimmed = output.trim();
            let summary = if trimmed.is_empty() { NO_SUMMARY } else { trimmed };
            Summary {
                summary: summary.to_string(),
                failed: false,
            }
        }
        Err(e) => {
            error!("Summary generation failed: {}", e);
            Summary {
                summary: SUMMARY_ERROR.to_string(),
                failed: true,
            }
        }
    }
}
