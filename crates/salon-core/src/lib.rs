//! Domain model and calculation core for the salon manager.
//!
//! Everything here is synchronous and side-effect free: revenue splits,
//! ledger totals, report windows, inventory valuation, and the in-memory
//! application state with its versioned JSON snapshot format. Persistence
//! backends (SQLite, snapshot files) live in the application crate.

pub mod admin;
pub mod collaborator;
pub mod error;
pub mod inventory;
pub mod ledger;
pub mod reports;
pub mod service;
pub mod split;
pub mod state;
pub mod worklog;

pub use error::{Error, Result};
