//! Identity gateway
//!
//! Wraps the external identity provider with input validation, per-key
//! rate limiting, and error translation. Token handling, verification
//! mail, and password resets belong to the provider.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use studyhall_api::{AuthUser, UserMessage};
use studyhall_provider::{AuthErrorCode, AuthProvider};
use studyhall_util::RateLimiter;

/// Sliding window for credential attempts
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);
/// Attempts allowed per key inside the window
pub const RATE_LIMIT_MAX_ATTEMPTS: usize = 5;

/// Longest acceptable email address
pub const MAX_EMAIL_LEN: usize = 254;
/// Shortest acceptable password
pub const MIN_PASSWORD_LEN: usize = 8;

/// Errors from gateway operations
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter both email and password")]
    MissingCredentials,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("Too many attempts. Please try again later.")]
    RateLimited,

    #[error("{}", translate_code(.0))]
    Provider(AuthErrorCode),
}

impl AuthError {
    pub fn user_message(&self) -> UserMessage {
        UserMessage::error(self.to_string())
    }
}

/// Translate provider error codes to the fixed user-facing strings.
/// Unknown or transport-level failures collapse to a generic message.
fn translate_code(code: &AuthErrorCode) -> &'static str {
    match code {
        AuthErrorCode::EmailAlreadyInUse => "Email already in use. Try logging in instead.",
        AuthErrorCode::InvalidEmail => "Invalid email address.",
        AuthErrorCode::WeakPassword => "Password is too weak.",
        AuthErrorCode::UserNotFound => "No account found with this email.",
        AuthErrorCode::WrongPassword => "Incorrect password.",
        AuthErrorCode::TooManyRequests => "Too many attempts. Please try again later.",
        AuthErrorCode::OperationNotAllowed => "This operation is not allowed.",
        AuthErrorCode::InvalidCredential => "Invalid email or password.",
        AuthErrorCode::Unavailable => "An error occurred. Please try again.",
    }
}

/// Shape check for an email address: one `@`, a dot in the domain, no
/// whitespace, bounded length
pub fn validate_email(email: &str) -> bool {
    if email.len() > MAX_EMAIL_LEN {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() {
        return false;
    }
    if email.chars().any(char::is_whitespace) || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

pub fn validate_password(password: &str) -> bool {
    password.len() >= MIN_PASSWORD_LEN
}

/// Validated, rate-limited front door to the identity provider
pub struct IdentityGateway {
    auth: Arc<dyn AuthProvider>,
    limiter: Mutex<RateLimiter>,
}

impl IdentityGateway {
    pub fn new(auth: Arc<dyn AuthProvider>) -> Self {
        Self::with_limits(auth, RATE_LIMIT_MAX_ATTEMPTS, RATE_LIMIT_WINDOW)
    }

    pub fn with_limits(
        auth: Arc<dyn AuthProvider>,
        max_attempts: usize,
        window: Duration,
    ) -> Self {
        Self {
            auth,
            limiter: Mutex::new(RateLimiter::new(max_attempts, window)),
        }
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.auth.current_user()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.auth.subscribe()
    }

    fn check_credentials(email: &str, password: &str) -> Result<(), AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        if !validate_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        Ok(())
    }

    fn check_rate(&self, key: String) -> Result<(), AuthError> {
        if self.limiter.lock().unwrap().check(&key) {
            Ok(())
        } else {
            warn!(key = %key, "Attempt rate limited");
            Err(AuthError::RateLimited)
        }
    }

    /// Create an account; on success a verification email is sent
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = email.trim();
        Self::check_credentials(email, password)?;
        if !validate_password(password) {
            return Err(AuthError::WeakPassword);
        }
        self.check_rate(format!("signup_{email}"))?;

        let user = self
            .auth
            .sign_up(email, password)
            .await
            .map_err(AuthError::Provider)?;

        if let Err(code) = self.auth.send_verification(&user).await {
            warn!(?code, "Verification email failed to send");
        }

        info!(uid = %user.uid, "Account created");
        Ok(user)
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        let email = email.trim();
        Self::check_credentials(email, password)?;
        self.check_rate(format!("signin_{email}"))?;

        let user = self
            .auth
            .sign_in(email, password)
            .await
            .map_err(AuthError::Provider)?;

        info!(uid = %user.uid, "Signed in");
        Ok(user)
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.auth.sign_out().await.map_err(AuthError::Provider)?;
        info!("Signed out");
        Ok(())
    }

    pub async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() || !validate_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        self.check_rate(format!("reset_{email}"))?;

        self.auth
            .reset_password(email)
            .await
            .map_err(AuthError::Provider)?;

        info!("Password reset email sent");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use studyhall_provider::MemoryAuth;

    fn gateway() -> (Arc<MemoryAuth>, IdentityGateway) {
        let auth = Arc::new(MemoryAuth::new());
        let gateway = IdentityGateway::new(auth.clone());
        (auth, gateway)
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com"));
        assert!(validate_email("a.b+c@sub.example.org"));

        assert!(!validate_email(""));
        assert!(!validate_email("alice"));
        assert!(!validate_email("alice@example"));
        assert!(!validate_email("alice@@example.com"));
        assert!(!validate_email("al ice@example.com"));
        assert!(!validate_email("@example.com"));
        assert!(!validate_email("alice@.com"));
        assert!(!validate_email(&format!("{}@example.com", "x".repeat(250))));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123"));
        assert!(validate_password("12345678"));
        assert!(!validate_password("1234567"));
        assert!(!validate_password(""));
    }

    #[tokio::test]
    async fn sign_up_validates_before_calling_provider() {
        let (_, gateway) = gateway();

        assert!(matches!(
            gateway.sign_up("", "password123").await,
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            gateway.sign_up("not-an-email", "password123").await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            gateway.sign_up("alice@example.com", "short").await,
            Err(AuthError::WeakPassword)
        ));
    }

    #[tokio::test]
    async fn sign_up_sends_verification() {
        let (auth, gateway) = gateway();

        let user = gateway
            .sign_up("alice@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(
            auth.verifications_sent(),
            vec!["alice@example.com".to_string()]
        );
        assert!(gateway.current_user().is_some());
    }

    #[tokio::test]
    async fn sign_in_trims_email() {
        let (auth, gateway) = gateway();
        auth.seed_account("alice@example.com", "password123");

        let user = gateway
            .sign_in("  alice@example.com  ", "password123")
            .await
            .unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[tokio::test]
    async fn rate_limit_kicks_in_after_five_attempts() {
        let (_, gateway) = gateway();

        for _ in 0..5 {
            let result = gateway.sign_in("alice@example.com", "password123").await;
            assert!(matches!(
                result,
                Err(AuthError::Provider(AuthErrorCode::UserNotFound))
            ));
        }

        assert!(matches!(
            gateway.sign_in("alice@example.com", "password123").await,
            Err(AuthError::RateLimited)
        ));

        // A different email is unaffected
        assert!(matches!(
            gateway.sign_in("bob@example.com", "password123").await,
            Err(AuthError::Provider(AuthErrorCode::UserNotFound))
        ));
    }

    #[tokio::test]
    async fn rate_limit_keys_are_per_operation() {
        let (auth, gateway) = gateway();
        auth.seed_account("alice@example.com", "password123");

        for _ in 0..5 {
            let _ = gateway.sign_in("alice@example.com", "wrong-password").await;
        }
        assert!(matches!(
            gateway.sign_in("alice@example.com", "password123").await,
            Err(AuthError::RateLimited)
        ));

        // Reset uses its own window
        gateway.reset_password("alice@example.com").await.unwrap();
    }

    #[tokio::test]
    async fn provider_errors_translate_to_fixed_strings() {
        let (auth, gateway) = gateway();
        auth.seed_account("alice@example.com", "password123");

        let err = gateway
            .sign_up("alice@example.com", "password123")
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Email already in use. Try logging in instead."
        );

        let err = gateway
            .sign_in("alice@example.com", "wrong-password")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Incorrect password.");

        let err = gateway
            .sign_in("bob@example.com", "password123")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No account found with this email.");
        assert!(err.user_message().is_error());
    }

    #[tokio::test]
    async fn outage_collapses_to_generic_message() {
        let (auth, gateway) = gateway();
        auth.set_fail_requests(true);

        let err = gateway
            .sign_in("alice@example.com", "password123")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "An error occurred. Please try again.");
    }

    #[tokio::test]
    async fn sign_out_clears_current_user() {
        let (_, gateway) = gateway();

        gateway
            .sign_up("alice@example.com", "password123")
            .await
            .unwrap();
        assert!(gateway.current_user().is_some());

        gateway.sign_out().await.unwrap();
        assert!(gateway.current_user().is_none());
    }

    #[tokio::test]
    async fn reset_password_requires_valid_email() {
        let (_, gateway) = gateway();

        assert!(matches!(
            gateway.reset_password("").await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            gateway.reset_password("nope").await,
            Err(AuthError::InvalidEmail)
        ));
    }
}
