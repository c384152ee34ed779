use crate::models::message::Message;

/// Renders the log as `"<role>: <text>"` lines in the order given
pub fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|message| format!("{}: {}", message.role, message.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages whose original or translated text contains `query`, ignoring case
pub fn filter_messages(messages: &[Message], query: &str) -> Vec<Message> {
    let needle = query.to_lowercase();
    messages
        .iter()
        .filter(|message| {
            message.text.to_lowercase().contains(&needle)
                || message.translated_text.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}
