//! Transient status messages shown to the user

use std::time::Duration;

/// How long a status message stays visible before auto-dismissing
pub const MESSAGE_DISMISS_AFTER: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// A transient message for the status region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl UserMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::Error
    }
}
