pub mod audio_handlers;
pub mod chat_handlers;
pub mod translation_handlers;
