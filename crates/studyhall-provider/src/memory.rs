//! In-memory provider implementations for tests and the dev CLI

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use uuid::Uuid;

use studyhall_api::{AuthUser, GroupRecord, NewGroup};
use studyhall_util::{GroupId, UserId};

use crate::{
    AuthErrorCode, AuthProvider, DirectoryProvider, ProviderError, ProviderResult,
};

/// In-memory group collection with live snapshot publication
pub struct MemoryDirectory {
    groups: Mutex<HashMap<GroupId, GroupRecord>>,
    snapshot_tx: watch::Sender<Vec<GroupRecord>>,

    /// Keeps the snapshot channel open so `send` retains the latest value
    /// even when no external subscriber is currently attached.
    _snapshot_keepalive: watch::Receiver<Vec<GroupRecord>>,

    /// When set, every request fails (simulates backend outage)
    fail_requests: AtomicBool,
}

impl MemoryDirectory {
    pub fn new() -> Self {
        let (snapshot_tx, snapshot_keepalive) = watch::channel(Vec::new());
        Self {
            groups: Mutex::new(HashMap::new()),
            snapshot_tx,
            _snapshot_keepalive: snapshot_keepalive,
            fail_requests: AtomicBool::new(false),
        }
    }

    /// Make subsequent requests fail
    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    pub fn group_count(&self) -> usize {
        self.groups.lock().unwrap().len()
    }

    fn check_available(&self) -> ProviderResult<()> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(ProviderError::Backend("request failure injected".into()));
        }
        Ok(())
    }

    /// Publish the current listing, creation time descending
    fn publish(&self) {
        let mut snapshot: Vec<GroupRecord> =
            self.groups.lock().unwrap().values().cloned().collect();
        snapshot.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        let _ = self.snapshot_tx.send(snapshot);
    }
}

impl Default for MemoryDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DirectoryProvider for MemoryDirectory {
    async fn insert_group(&self, new: NewGroup) -> ProviderResult<GroupRecord> {
        self.check_available()?;

        let record = GroupRecord {
            id: GroupId::generate(),
            name: new.name,
            members: vec![new.created_by.clone()],
            created_by: new.created_by,
            created_at: Utc::now(),
            max_size: new.max_size,
        };

        self.groups
            .lock()
            .unwrap()
            .insert(record.id.clone(), record.clone());
        self.publish();

        Ok(record)
    }

    async fn get_group(&self, id: &GroupId) -> ProviderResult<Option<GroupRecord>> {
        self.check_available()?;
        Ok(self.groups.lock().unwrap().get(id).cloned())
    }

    async fn add_member(&self, id: &GroupId, user: &UserId) -> ProviderResult<()> {
        self.check_available()?;

        {
            let mut groups = self.groups.lock().unwrap();
            let group = groups.get_mut(id).ok_or(ProviderError::NotFound)?;
            if !group.members.contains(user) {
                group.members.push(user.clone());
            }
        }
        self.publish();
        Ok(())
    }

    async fn remove_member(&self, id: &GroupId, user: &UserId) -> ProviderResult<()> {
        self.check_available()?;

        {
            let mut groups = self.groups.lock().unwrap();
            let group = groups.get_mut(id).ok_or(ProviderError::NotFound)?;
            group.members.retain(|m| m != user);
        }
        self.publish();
        Ok(())
    }

    async fn delete_group(&self, id: &GroupId) -> ProviderResult<()> {
        self.check_available()?;

        // Missing documents are fine: a concurrent leave may have
        // deleted the group already
        self.groups.lock().unwrap().remove(id);
        self.publish();
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Vec<GroupRecord>> {
        self.snapshot_tx.subscribe()
    }
}

struct Account {
    password: String,
    user: AuthUser,
}

/// In-memory identity provider
pub struct MemoryAuth {
    accounts: Mutex<HashMap<String, Account>>,
    state_tx: watch::Sender<Option<AuthUser>>,

    /// Keeps the auth-state channel open so `send` retains the latest value
    /// even when no external subscriber is currently attached.
    _state_keepalive: watch::Receiver<Option<AuthUser>>,

    /// When set, every request fails
    fail_requests: AtomicBool,

    /// Emails a verification mail was "sent" to
    verifications_sent: Mutex<Vec<String>>,

    /// Emails a reset mail was "sent" to
    resets_sent: Mutex<Vec<String>>,
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (state_tx, state_keepalive) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            state_tx,
            _state_keepalive: state_keepalive,
            fail_requests: AtomicBool::new(false),
            verifications_sent: Mutex::new(Vec::new()),
            resets_sent: Mutex::new(Vec::new()),
        }
    }

    /// Make subsequent requests fail
    pub fn set_fail_requests(&self, fail: bool) {
        self.fail_requests.store(fail, Ordering::SeqCst);
    }

    /// Create an account without signing it in (test seeding)
    pub fn seed_account(&self, email: &str, password: &str) -> AuthUser {
        let user = AuthUser::new(Uuid::new_v4().to_string(), email);
        self.accounts.lock().unwrap().insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }

    pub fn verifications_sent(&self) -> Vec<String> {
        self.verifications_sent.lock().unwrap().clone()
    }

    pub fn resets_sent(&self) -> Vec<String> {
        self.resets_sent.lock().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), AuthErrorCode> {
        if self.fail_requests.load(Ordering::SeqCst) {
            return Err(AuthErrorCode::Unavailable);
        }
        Ok(())
    }
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    fn current_user(&self) -> Option<AuthUser> {
        self.state_tx.borrow().clone()
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthErrorCode> {
        self.check_available()?;

        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(email) {
            return Err(AuthErrorCode::EmailAlreadyInUse);
        }

        let user = AuthUser::new(Uuid::new_v4().to_string(), email);
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        drop(accounts);

        let _ = self.state_tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthErrorCode> {
        self.check_available()?;

        let accounts = self.accounts.lock().unwrap();
        let account = accounts.get(email).ok_or(AuthErrorCode::UserNotFound)?;
        if account.password != password {
            return Err(AuthErrorCode::WrongPassword);
        }

        let user = account.user.clone();
        drop(accounts);

        let _ = self.state_tx.send(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), AuthErrorCode> {
        self.check_available()?;
        let _ = self.state_tx.send(None);
        Ok(())
    }

    async fn send_verification(&self, user: &AuthUser) -> Result<(), AuthErrorCode> {
        self.check_available()?;
        self.verifications_sent
            .lock()
            .unwrap()
            .push(user.email.clone());
        Ok(())
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthErrorCode> {
        self.check_available()?;

        if !self.accounts.lock().unwrap().contains_key(email) {
            return Err(AuthErrorCode::UserNotFound);
        }
        self.resets_sent.lock().unwrap().push(email.to_string());
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.state_tx.subscribe()
    }
}
