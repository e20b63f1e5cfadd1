//! Backend boundary for studyhall
//!
//! The group collection and the identity service are external managed
//! systems; this crate defines the traits the core consumes and an
//! in-memory implementation used by tests and the dev CLI.

mod memory;
mod traits;

pub use memory::*;
pub use traits::*;

use thiserror::Error;

/// Errors from the document-collection backend
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Document not found")]
    NotFound,

    #[error("Backend unavailable: {0}")]
    Backend(String),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Coded errors from the identity provider. The gateway translates these
/// to user-facing text; raw codes never reach the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    EmailAlreadyInUse,
    InvalidEmail,
    WeakPassword,
    UserNotFound,
    WrongPassword,
    TooManyRequests,
    OperationNotAllowed,
    InvalidCredential,
    Unavailable,
}
