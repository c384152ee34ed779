pub mod audio;
pub mod message;
pub mod translation;
