//! Shared types for the studyhall tracker
//!
//! This crate defines the records the other crates exchange:
//! - Ledger records and session entries (stopwatch time log)
//! - Group records and listing rows (group directory)
//! - Auth-facing account types
//! - User feedback messages

mod auth;
mod feedback;
mod types;

pub use auth::*;
pub use feedback::*;
pub use types::*;
