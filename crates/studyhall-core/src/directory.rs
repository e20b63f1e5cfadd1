//! Group directory client
//!
//! Create/join/leave operations against the remote group collection,
//! with capacity and duplicate-membership checks done client-side and
//! empty-group cleanup on leave.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{info, warn};

use studyhall_api::{
    GroupRecord, GroupRow, NewGroup, UserMessage, sanitize_group_name, validate_group_name,
};
use studyhall_provider::{AuthProvider, DirectoryProvider, ProviderError};
use studyhall_util::{GroupId, UserId};

/// Errors from group directory operations
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("You must be logged in to do that")]
    NotSignedIn,

    #[error("Group name must be between 2 and 100 characters")]
    InvalidName,

    #[error("Group not found")]
    NotFound,

    #[error("You're already in this group!")]
    AlreadyMember,

    #[error("Group is full!")]
    GroupFull,

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl DirectoryError {
    /// Map to the text shown in the status region. Provider failures
    /// collapse to a generic retry message; raw backend errors never
    /// reach the user.
    pub fn user_message(&self) -> UserMessage {
        match self {
            DirectoryError::Provider(_) => {
                UserMessage::error("Something went wrong. Please try again.")
            }
            other => UserMessage::error(other.to_string()),
        }
    }
}

/// Client for the remote group collection.
///
/// All operations require a signed-in user; the absence of one is an
/// error, never a panic.
pub struct GroupDirectory {
    provider: Arc<dyn DirectoryProvider>,
    auth: Arc<dyn AuthProvider>,
    default_max_size: u32,
}

impl GroupDirectory {
    pub fn new(
        provider: Arc<dyn DirectoryProvider>,
        auth: Arc<dyn AuthProvider>,
        default_max_size: u32,
    ) -> Self {
        Self {
            provider,
            auth,
            default_max_size,
        }
    }

    fn require_user(&self) -> Result<UserId, DirectoryError> {
        self.auth
            .current_user()
            .map(|u| u.uid)
            .ok_or(DirectoryError::NotSignedIn)
    }

    /// Create a group with the current user as its first member
    pub async fn create_group(&self, name: &str) -> Result<GroupRecord, DirectoryError> {
        let user = self.require_user()?;

        if !validate_group_name(name) {
            return Err(DirectoryError::InvalidName);
        }

        let record = self
            .provider
            .insert_group(NewGroup {
                name: sanitize_group_name(name),
                created_by: user,
                max_size: self.default_max_size,
            })
            .await?;

        info!(group_id = %record.id, name = %record.name, "Group created");
        Ok(record)
    }

    /// Join a group, refusing duplicates and full groups
    pub async fn join_group(&self, id: &GroupId) -> Result<(), DirectoryError> {
        let user = self.require_user()?;

        let group = self
            .provider
            .get_group(id)
            .await?
            .ok_or(DirectoryError::NotFound)?;

        if group.is_member(&user) {
            return Err(DirectoryError::AlreadyMember);
        }
        if group.is_full() {
            return Err(DirectoryError::GroupFull);
        }

        self.provider.add_member(id, &user).await?;
        info!(group_id = %id, "Joined group");
        Ok(())
    }

    /// Leave a group, deleting it if it just became empty.
    ///
    /// Two sequential remote calls; the empty-but-not-yet-deleted state
    /// is observable in between. A concurrent leave may delete the group
    /// first, which the provider treats as a no-op delete.
    pub async fn leave_group(&self, id: &GroupId) -> Result<(), DirectoryError> {
        let user = self.require_user()?;

        self.provider
            .get_group(id)
            .await?
            .ok_or(DirectoryError::NotFound)?;

        self.provider.remove_member(id, &user).await?;

        match self.provider.get_group(id).await? {
            Some(updated) if updated.members.is_empty() => {
                self.provider.delete_group(id).await?;
                info!(group_id = %id, "Left group, empty group deleted");
            }
            Some(_) => {
                info!(group_id = %id, "Left group");
            }
            None => {
                warn!(group_id = %id, "Group vanished between leave and re-read");
            }
        }

        Ok(())
    }

    /// Subscribe to the live listing (creation time descending)
    pub fn subscribe(&self) -> watch::Receiver<Vec<GroupRecord>> {
        self.provider.subscribe()
    }

    /// Evaluate a snapshot into listing rows for the current user
    pub fn rows(&self, snapshot: &[GroupRecord]) -> Vec<GroupRow> {
        let viewer = self.auth.current_user().map(|u| u.uid);

        snapshot
            .iter()
            .map(|g| GroupRow {
                id: g.id.clone(),
                name: sanitize_group_name(&g.name),
                member_count: g.member_count(),
                max_size: g.max_size,
                joined: viewer.as_ref().is_some_and(|u| g.is_member(u)),
            })
            .collect()
    }
}
