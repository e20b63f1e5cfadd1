//! Backend provider traits

use async_trait::async_trait;
use studyhall_api::{AuthUser, GroupRecord, NewGroup};
use studyhall_util::{GroupId, UserId};
use tokio::sync::watch;

use crate::{AuthErrorCode, ProviderResult};

/// Remote group-collection operations.
///
/// Every call crosses a network boundary in a real deployment; all
/// mutations are field-level updates or whole-document inserts/deletes.
#[async_trait]
pub trait DirectoryProvider: Send + Sync {
    /// Insert a new group document. The backend assigns the id and the
    /// creation timestamp.
    async fn insert_group(&self, new: NewGroup) -> ProviderResult<GroupRecord>;

    /// Fetch one group, `None` if it does not exist
    async fn get_group(&self, id: &GroupId) -> ProviderResult<Option<GroupRecord>>;

    /// Add a member via a set-union update: a user already present is
    /// not duplicated. Fails `NotFound` if the group is missing.
    async fn add_member(&self, id: &GroupId, user: &UserId) -> ProviderResult<()>;

    /// Remove a member. Fails `NotFound` if the group is missing;
    /// removing a non-member is a no-op.
    async fn remove_member(&self, id: &GroupId, user: &UserId) -> ProviderResult<()>;

    /// Delete a group document. Deleting an already-deleted document is
    /// a benign no-op (concurrent leaves race on this).
    async fn delete_group(&self, id: &GroupId) -> ProviderResult<()>;

    /// Subscribe to the live group listing, ordered by creation time
    /// descending. The subscription ends when the receiver is dropped.
    fn subscribe(&self) -> watch::Receiver<Vec<GroupRecord>>;
}

/// External identity provider operations.
///
/// The core validates inputs and rate-limits before calling these; the
/// provider owns credentials, verification mail, and password resets.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Currently signed-in account, if any. Synchronously available.
    fn current_user(&self) -> Option<AuthUser>;

    /// Create an account and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthErrorCode>;

    /// Sign in with existing credentials
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthErrorCode>;

    /// Sign out the current account
    async fn sign_out(&self) -> Result<(), AuthErrorCode>;

    /// Send a verification email to the given account
    async fn send_verification(&self, user: &AuthUser) -> Result<(), AuthErrorCode>;

    /// Send a password-reset email
    async fn reset_password(&self, email: &str) -> Result<(), AuthErrorCode>;

    /// Subscribe to auth-state changes
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;
}
