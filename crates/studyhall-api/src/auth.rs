//! Auth-facing account types

use serde::{Deserialize, Serialize};
use studyhall_util::UserId;

/// A signed-in account as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: String,
    pub email_verified: bool,
}

impl AuthUser {
    pub fn new(uid: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: email.into(),
            email_verified: false,
        }
    }
}

/// Mask an email for display: keep the first two characters of the
/// local part, hide the rest (`ab****@host`).
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let shown: String = local.chars().take(2).collect();
            let hidden = "*".repeat(local.chars().count().saturating_sub(2));
            format!("{}{}@{}", shown, hidden, domain)
        }
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_email_keeps_two_chars() {
        assert_eq!(mask_email("alice@example.com"), "al***@example.com");
        assert_eq!(mask_email("ab@example.com"), "ab@example.com");
        assert_eq!(mask_email("a@example.com"), "a@example.com");
    }

    #[test]
    fn mask_email_without_at_is_unchanged() {
        assert_eq!(mask_email("not-an-email"), "not-an-email");
    }

    #[test]
    fn auth_user_round_trip() {
        let user = AuthUser::new("uid-1", "alice@example.com");
        let json = serde_json::to_string(&user).unwrap();
        let parsed: AuthUser = serde_json::from_str(&json).unwrap();
        assert_eq!(user, parsed);
    }
}
