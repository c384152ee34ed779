pub mod app_state;
pub mod client;
pub mod config;
pub mod database;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod websocket;
