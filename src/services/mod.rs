pub mod llm_service;
pub mod message_log;
pub mod summary_service;
pub mod translation_service;
