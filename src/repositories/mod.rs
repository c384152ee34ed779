pub mod audio_repository;
pub mod message_repository;
