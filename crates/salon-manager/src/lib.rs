//! Salon manager application library: configuration, SQLite persistence,
//! and CSV report export. The CLI binary lives in `main.rs`.

pub mod config;
pub mod export;
pub mod store;
