#![forbid(unsafe_code)]

//! Contracts for the hosted services the app consumes.
//!
//! The real backend is a third-party auth provider and document store; this
//! crate only fixes the call shapes. [`MockAuthService`] and
//! [`MemoryProfileStore`] are in-process stand-ins so flows can run and be
//! tested without the network — they live here rather than behind
//! `#[cfg(test)]` because the app's demo wiring uses them too.

use crate::error::{AuthError, ProfileError};
use crate::profile::UserProfile;
use crate::session::IdentityId;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Passwords shorter than this are rejected at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Observer invoked with the current identity-or-absence, immediately on
/// subscription and then on every change, until the watch is released.
pub type SessionCallback = Box<dyn FnMut(Option<IdentityId>) + Send>;

/// Scoped handle for a session observation.
///
/// Dropping the watch unsubscribes the callback; this is the only way to
/// stop observation, so every exit path that drops the watch releases it.
pub struct SessionWatch {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl SessionWatch {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Explicit early release; equivalent to dropping the watch.
    pub fn unsubscribe(mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for SessionWatch {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for SessionWatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionWatch")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Hosted authentication service.
pub trait AuthService: Send + Sync {
    fn sign_in(&self, email: &str, password: &str) -> Result<IdentityId, AuthError>;

    fn register_identity(&self, email: &str, password: &str) -> Result<IdentityId, AuthError>;

    /// Subscribe to session changes. The callback is invoked once with the
    /// current state before this returns, then on every subsequent change.
    fn observe_session(&self, callback: SessionCallback) -> SessionWatch;
}

/// Hosted profile document store.
pub trait ProfileStore: Send + Sync {
    fn profile(&self, identity: &IdentityId) -> Result<Option<UserProfile>, ProfileError>;

    fn put_profile(&self, identity: &IdentityId, profile: UserProfile)
    -> Result<(), ProfileError>;
}

// ── In-memory auth fake ─────────────────────────────────────────────────

struct Account {
    password: String,
    identity: IdentityId,
}

#[derive(Default)]
struct AuthState {
    accounts: HashMap<String, Account>,
    current: Option<IdentityId>,
    next_uid: u32,
    offline: bool,
    sign_in_calls: u32,
    register_calls: u32,
}

#[derive(Default)]
struct Observers {
    entries: HashMap<u64, SessionCallback>,
    next_id: u64,
}

/// In-memory [`AuthService`] with an injectable outage.
///
/// Lock order is state before observers; callbacks are invoked while the
/// observer table is locked, so a callback must not subscribe or
/// unsubscribe from within itself.
#[derive(Default)]
pub struct MockAuthService {
    state: Mutex<AuthState>,
    observers: Arc<Mutex<Observers>>,
}

impl MockAuthService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed an account without going through registration.
    pub fn seed_account(&self, email: &str, password: &str) -> IdentityId {
        let mut state = self.lock_state();
        Self::insert_account(&mut state, email, password)
    }

    /// Simulate loss of connectivity for subsequent calls.
    pub fn set_offline(&self, offline: bool) {
        self.lock_state().offline = offline;
    }

    /// Drop the current identity and notify observers.
    pub fn sign_out(&self) {
        {
            let mut state = self.lock_state();
            state.current = None;
        }
        self.notify(None);
        tracing::debug!(target: "freshlink.auth", "signed out");
    }

    pub fn sign_in_calls(&self) -> u32 {
        self.lock_state().sign_in_calls
    }

    pub fn register_calls(&self) -> u32 {
        self.lock_state().register_calls
    }

    pub fn account_count(&self) -> usize {
        self.lock_state().accounts.len()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, AuthState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn insert_account(state: &mut AuthState, email: &str, password: &str) -> IdentityId {
        state.next_uid += 1;
        let identity = IdentityId(format!("uid-{}", state.next_uid));
        state.accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                identity: identity.clone(),
            },
        );
        identity
    }

    fn notify(&self, current: Option<IdentityId>) {
        let mut observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
        for callback in observers.entries.values_mut() {
            callback(current.clone());
        }
    }
}

impl AuthService for MockAuthService {
    fn sign_in(&self, email: &str, password: &str) -> Result<IdentityId, AuthError> {
        let identity = {
            let mut state = self.lock_state();
            state.sign_in_calls += 1;
            if state.offline {
                return Err(AuthError::Network("simulated outage".into()));
            }
            match state.accounts.get(email) {
                Some(account) if account.password == password => {
                    let identity = account.identity.clone();
                    state.current = Some(identity.clone());
                    identity
                }
                _ => return Err(AuthError::InvalidCredentials),
            }
        };
        self.notify(Some(identity.clone()));
        tracing::debug!(target: "freshlink.auth", identity = %identity, "signed in");
        Ok(identity)
    }

    fn register_identity(&self, email: &str, password: &str) -> Result<IdentityId, AuthError> {
        let identity = {
            let mut state = self.lock_state();
            state.register_calls += 1;
            if state.offline {
                return Err(AuthError::Network("simulated outage".into()));
            }
            if state.accounts.contains_key(email) {
                return Err(AuthError::EmailInUse);
            }
            if password.len() < MIN_PASSWORD_LEN {
                return Err(AuthError::WeakPassword);
            }
            let identity = Self::insert_account(&mut state, email, password);
            // The hosted provider signs the new identity in on creation.
            state.current = Some(identity.clone());
            identity
        };
        self.notify(Some(identity.clone()));
        tracing::debug!(target: "freshlink.auth", identity = %identity, "registered");
        Ok(identity)
    }

    fn observe_session(&self, callback: SessionCallback) -> SessionWatch {
        let current = self.lock_state().current.clone();
        let id = {
            let mut observers = self.observers.lock().unwrap_or_else(|e| e.into_inner());
            let id = observers.next_id;
            observers.next_id += 1;
            let mut callback = callback;
            callback(current);
            observers.entries.insert(id, callback);
            id
        };
        let table = Arc::clone(&self.observers);
        SessionWatch::new(move || {
            let mut observers = table.lock().unwrap_or_else(|e| e.into_inner());
            observers.entries.remove(&id);
        })
    }
}

// ── In-memory profile fake ──────────────────────────────────────────────

#[derive(Default)]
struct ProfileState {
    documents: HashMap<IdentityId, UserProfile>,
    offline: bool,
    deny_writes: bool,
    reads: u32,
}

/// In-memory [`ProfileStore`] with injectable outage and denied writes.
#[derive(Default)]
pub struct MemoryProfileStore {
    state: Mutex<ProfileState>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    pub fn set_deny_writes(&self, deny: bool) {
        self.lock().deny_writes = deny;
    }

    /// Write a document directly, bypassing the failure injection.
    pub fn seed_profile(&self, identity: &IdentityId, profile: UserProfile) {
        self.lock().documents.insert(identity.clone(), profile);
    }

    pub fn document_count(&self) -> usize {
        self.lock().documents.len()
    }

    pub fn profile_reads(&self) -> u32 {
        self.lock().reads
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ProfileState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl ProfileStore for MemoryProfileStore {
    fn profile(&self, identity: &IdentityId) -> Result<Option<UserProfile>, ProfileError> {
        let mut state = self.lock();
        state.reads += 1;
        if state.offline {
            return Err(ProfileError::Network("simulated outage".into()));
        }
        Ok(state.documents.get(identity).cloned())
    }

    fn put_profile(
        &self,
        identity: &IdentityId,
        profile: UserProfile,
    ) -> Result<(), ProfileError> {
        let mut state = self.lock();
        if state.offline {
            return Err(ProfileError::Network("simulated outage".into()));
        }
        if state.deny_writes {
            return Err(ProfileError::PermissionDenied);
        }
        state.documents.insert(identity.clone(), profile);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Role;
    use std::sync::mpsc;

    #[test]
    fn register_then_sign_in() {
        let auth = MockAuthService::new();
        let id = auth.register_identity("amal@example.com", "secret1").unwrap();
        let again = auth.sign_in("amal@example.com", "secret1").unwrap();
        assert_eq!(id, again);
    }

    #[test]
    fn wrong_password_is_invalid_credentials() {
        let auth = MockAuthService::new();
        auth.register_identity("amal@example.com", "secret1").unwrap();
        let err = auth.sign_in("amal@example.com", "nope-nope").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[test]
    fn unknown_account_is_invalid_credentials() {
        let auth = MockAuthService::new();
        let err = auth.sign_in("ghost@example.com", "whatever").unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[test]
    fn duplicate_email_rejected() {
        let auth = MockAuthService::new();
        auth.register_identity("amal@example.com", "secret1").unwrap();
        let err = auth
            .register_identity("amal@example.com", "different1")
            .unwrap_err();
        assert_eq!(err, AuthError::EmailInUse);
    }

    #[test]
    fn short_password_rejected() {
        let auth = MockAuthService::new();
        let err = auth.register_identity("amal@example.com", "12345").unwrap_err();
        assert_eq!(err, AuthError::WeakPassword);
        assert_eq!(auth.account_count(), 0);
    }

    #[test]
    fn offline_surfaces_network_error() {
        let auth = MockAuthService::new();
        auth.set_offline(true);
        assert!(matches!(
            auth.sign_in("a@example.com", "secret1"),
            Err(AuthError::Network(_))
        ));
        assert!(matches!(
            auth.register_identity("a@example.com", "secret1"),
            Err(AuthError::Network(_))
        ));
    }

    #[test]
    fn observer_sees_current_state_immediately() {
        let auth = MockAuthService::new();
        let (tx, rx) = mpsc::channel();
        let _watch = auth.observe_session(Box::new(move |identity| {
            tx.send(identity).unwrap();
        }));
        assert_eq!(rx.try_recv().unwrap(), None);
    }

    #[test]
    fn observer_sees_sign_in_and_sign_out() {
        let auth = MockAuthService::new();
        let (tx, rx) = mpsc::channel();
        let _watch = auth.observe_session(Box::new(move |identity| {
            tx.send(identity).unwrap();
        }));
        let id = auth.register_identity("amal@example.com", "secret1").unwrap();
        auth.sign_out();

        let seen: Vec<Option<IdentityId>> = rx.try_iter().collect();
        assert_eq!(seen, vec![None, Some(id), None]);
    }

    #[test]
    fn dropped_watch_stops_observation() {
        let auth = MockAuthService::new();
        let (tx, rx) = mpsc::channel();
        let watch = auth.observe_session(Box::new(move |identity| {
            tx.send(identity).unwrap();
        }));
        drop(watch);
        auth.register_identity("amal@example.com", "secret1").unwrap();
        let seen: Vec<Option<IdentityId>> = rx.try_iter().collect();
        assert_eq!(seen, vec![None], "only the immediate observation arrives");
    }

    #[test]
    fn explicit_unsubscribe_stops_observation() {
        let auth = MockAuthService::new();
        let (tx, rx) = mpsc::channel();
        let watch = auth.observe_session(Box::new(move |identity| {
            tx.send(identity).unwrap();
        }));
        watch.unsubscribe();
        auth.sign_out();
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn call_counters_track_attempts() {
        let auth = MockAuthService::new();
        let _ = auth.sign_in("a@example.com", "x");
        let _ = auth.sign_in("a@example.com", "x");
        let _ = auth.register_identity("a@example.com", "secret1");
        assert_eq!(auth.sign_in_calls(), 2);
        assert_eq!(auth.register_calls(), 1);
    }

    #[test]
    fn profile_store_round_trip() {
        let store = MemoryProfileStore::new();
        let id = IdentityId::from("uid-1");
        store
            .put_profile(&id, UserProfile::buyer("Amal Perera", "amal@example.com"))
            .unwrap();
        let profile = store.profile(&id).unwrap().unwrap();
        assert_eq!(profile.role, Role::Buyer);
    }

    #[test]
    fn missing_profile_is_none_not_error() {
        let store = MemoryProfileStore::new();
        assert_eq!(store.profile(&IdentityId::from("nobody")).unwrap(), None);
    }

    #[test]
    fn denied_write_is_permission_error() {
        let store = MemoryProfileStore::new();
        store.set_deny_writes(true);
        let err = store
            .put_profile(
                &IdentityId::from("uid-1"),
                UserProfile::buyer("Amal Perera", "amal@example.com"),
            )
            .unwrap_err();
        assert_eq!(err, ProfileError::PermissionDenied);
        assert_eq!(store.document_count(), 0);
    }

    #[test]
    fn offline_store_is_network_error() {
        let store = MemoryProfileStore::new();
        store.set_offline(true);
        assert!(matches!(
            store.profile(&IdentityId::from("uid-1")),
            Err(ProfileError::Network(_))
        ));
    }
}
