//! Core logic for the studyhall tracker
//!
//! Three pieces, each owned by the hosting session and driven by
//! explicit calls rather than ambient state:
//! - `Stopwatch`: elapsed-time tracking, session commits, daily rollover
//! - `GroupDirectory`: create/join/leave against the remote collection
//! - `IdentityGateway`: validated, rate-limited access to the identity
//!   provider

mod directory;
mod gateway;
mod stopwatch;

pub use directory::*;
pub use gateway::*;
pub use stopwatch::*;
