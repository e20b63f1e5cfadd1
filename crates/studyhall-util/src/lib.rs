//! Shared utilities for studyhall
//!
//! This crate provides:
//! - ID types (UserId, GroupId)
//! - Time utilities (monotonic time, elapsed formatting, day stamps)
//! - Sliding-window rate limiting
//! - Default paths for data and log directories

mod ids;
mod paths;
mod rate_limit;
mod time;

pub use ids::*;
pub use paths::*;
pub use rate_limit::*;
pub use time::*;
