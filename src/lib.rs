pub mod app;
pub mod auth;
pub mod client;
pub mod config;
pub mod dataset;
pub mod engine;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod models;
pub mod remote;
pub mod resource;
pub mod service;
pub mod state;
pub mod stats;
pub mod storage;
pub mod store;
pub mod validation;

pub use app::router;
pub use client::LedgerClient;
pub use config::{ClientConfig, ServerConfig};
pub use errors::{AppError, StoreError};
pub use state::AppState;
pub use storage::KeyValueStore;
