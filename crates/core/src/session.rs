//! Session store: current identity plus per-identity favorites
//!
//! Authentication is a mock. The [`AuthenticationPolicy`] seam exists so a
//! real policy can replace [`AcceptAnyCredentials`] without touching the
//! store.
//!
//! Every mutating operation writes storage first and only then updates the
//! in-memory state, so a failed write leaves memory and storage in agreement.

use crate::favorites::{FavoriteCodes, FavoritesIndex};
use crate::storage::{read_json, write_json, KeyValueStore, StorageError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Storage key holding the serialized [`Identity`]
pub const USER_KEY: &str = "countryAppUser";

/// Storage key holding the serialized [`FavoritesIndex`]
pub const FAVORITES_KEY: &str = "countryAppFavorites";

pub const DEMO_DISPLAY_NAME: &str = "Demo User";
pub const MOCK_SESSION_TOKEN: &str = "mock-jwt-token";

/// The logged-in principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub email: String,
    pub name: String,
    pub token: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub session_start: DateTime<Utc>,
}

/// Error type for session operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Email and password are required")]
    EmptyCredentials,

    #[error("Credentials rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Decides whether a credential pair yields an identity
pub trait AuthenticationPolicy {
    fn authenticate(&self, email: &str, password: &str) -> Result<Identity, SessionError>;
}

/// Accepts any non-empty email/password pair
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAnyCredentials;

impl AuthenticationPolicy for AcceptAnyCredentials {
    fn authenticate(&self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::EmptyCredentials);
        }

        Ok(Identity {
            email: email.to_string(),
            name: DEMO_DISPLAY_NAME.to_string(),
            token: MOCK_SESSION_TOKEN.to_string(),
            session_start: Utc::now(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Authenticated(Identity),
    Anonymous,
}

/// Result of a favorite toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// No identity is active; nothing changed
    Ignored,
}

pub struct SessionStore<S, P = AcceptAnyCredentials> {
    storage: S,
    policy: P,
    state: SessionState,
    favorites: FavoritesIndex,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(storage: S) -> Self {
        Self::with_policy(storage, AcceptAnyCredentials)
    }
}

impl<S: KeyValueStore, P: AuthenticationPolicy> SessionStore<S, P> {
    pub fn with_policy(storage: S, policy: P) -> Self {
        Self {
            storage,
            policy,
            state: SessionState::Uninitialized,
            favorites: FavoritesIndex::new(),
        }
    }

    /// Load identity and favorites from storage
    ///
    /// Missing or malformed data means "no identity"; it is logged and never
    /// returned as an error. Calling this again once the state is known is a
    /// no-op.
    pub fn initialize(&mut self) -> Option<&Identity> {
        if matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Initializing
        ) {
            self.state = SessionState::Initializing;

            let identity = load_recovering::<Identity, S>(&self.storage, USER_KEY);
            self.favorites =
                load_recovering::<FavoritesIndex, S>(&self.storage, FAVORITES_KEY).unwrap_or_default();

            self.state = match identity {
                Some(identity) => {
                    log::debug!("Restored session for {}", identity.email);
                    SessionState::Authenticated(identity)
                }
                None => SessionState::Anonymous,
            };
        }

        self.identity()
    }

    /// `true` until [`initialize`](Self::initialize) has decided the state
    pub fn is_initializing(&self) -> bool {
        matches!(
            self.state,
            SessionState::Uninitialized | SessionState::Initializing
        )
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            SessionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<Identity, SessionError> {
        let identity = self.policy.authenticate(email, password)?;
        self.ensure_initialized();

        let mut favorites = self.favorites.clone();
        favorites.ensure_entry(&identity.email);

        let previous_favorites = self.storage.get(FAVORITES_KEY)?;
        write_json(&mut self.storage, FAVORITES_KEY, &favorites)?;
        if let Err(err) = write_json(&mut self.storage, USER_KEY, &identity) {
            self.restore(FAVORITES_KEY, previous_favorites);
            return Err(err.into());
        }

        log::debug!("Logged in as {}", identity.email);
        self.favorites = favorites;
        self.state = SessionState::Authenticated(identity.clone());
        Ok(identity)
    }

    /// Forget the current identity; favorites stay on record
    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.ensure_initialized();
        self.storage.remove(USER_KEY)?;

        if let Some(identity) = self.identity() {
            log::debug!("Logged out {}", identity.email);
        }
        self.state = SessionState::Anonymous;
        Ok(())
    }

    pub fn current_favorites(&self) -> FavoriteCodes {
        self.identity()
            .map(|identity| self.favorites.codes_for(&identity.email))
            .unwrap_or_default()
    }

    pub fn is_favorite(&self, code: &str) -> bool {
        self.identity()
            .is_some_and(|identity| self.favorites.is_favorite(&identity.email, code))
    }

    /// Flip `code` in the current identity's favorites and persist the index
    pub fn toggle_favorite(&mut self, code: &str) -> Result<ToggleOutcome, SessionError> {
        let Some(email) = self.identity().map(|identity| identity.email.clone()) else {
            return Ok(ToggleOutcome::Ignored);
        };

        let mut favorites = self.favorites.clone();
        let added = favorites.toggle(&email, code);
        write_json(&mut self.storage, FAVORITES_KEY, &favorites)?;
        self.favorites = favorites;

        Ok(if added {
            ToggleOutcome::Added
        } else {
            ToggleOutcome::Removed
        })
    }

    pub fn favorites_index(&self) -> &FavoritesIndex {
        &self.favorites
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// The persisted index must be loaded before anything is written over it
    fn ensure_initialized(&mut self) {
        if self.is_initializing() {
            self.initialize();
        }
    }

    fn restore(&mut self, key: &str, previous: Option<String>) {
        let restored = match previous {
            Some(raw) => self.storage.set(key, &raw),
            None => self.storage.remove(key),
        };
        if let Err(err) = restored {
            log::error!("Failed to roll back {key}: {err}");
        }
    }
}

fn load_recovering<T, S>(storage: &S, key: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
    S: KeyValueStore,
{
    match read_json(storage, key) {
        Ok(value) => value,
        Err(err) => {
            log::warn!("Ignoring stored {key}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use tempfile::TempDir;

    fn logged_in(email: &str) -> SessionStore<MemoryStore> {
        let mut session = SessionStore::new(MemoryStore::new());
        session.initialize();
        session.login(email, "secret").unwrap();
        session
    }

    fn codes(session: &SessionStore<impl KeyValueStore>) -> Vec<String> {
        session.current_favorites().into_iter().collect()
    }

    /// Store whose writes to one key always fail
    struct FailingStore {
        inner: MemoryStore,
        failing_key: &'static str,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            if key == self.failing_key {
                return Err(StorageError::Io {
                    key: key.to_string(),
                    message: "disk full".to_string(),
                });
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            self.inner.remove(key)
        }
    }

    // ============================================================================
    // initialize tests
    // ============================================================================

    #[test]
    fn test_new_store_is_initializing() {
        let session = SessionStore::new(MemoryStore::new());
        assert!(session.is_initializing());
        assert_eq!(session.state(), &SessionState::Uninitialized);
    }

    #[test]
    fn test_initialize_first_run_is_anonymous() {
        let mut session = SessionStore::new(MemoryStore::new());
        assert!(session.initialize().is_none());
        assert!(!session.is_initializing());
        assert_eq!(session.state(), &SessionState::Anonymous);
    }

    #[test]
    fn test_initialize_with_corrupt_storage_is_anonymous() {
        let mut storage = MemoryStore::new();
        storage.set(USER_KEY, "{broken").unwrap();
        storage.set(FAVORITES_KEY, "[1, 2").unwrap();

        let mut session = SessionStore::new(storage);
        assert!(session.initialize().is_none());
        assert!(session.current_favorites().is_empty());
        assert!(session.favorites_index().emails().next().is_none());
    }

    #[test]
    fn test_initialize_restores_camel_case_storage_format() {
        let mut storage = MemoryStore::new();
        storage
            .set(
                USER_KEY,
                r#"{"email":"a@x.com","name":"Demo User","token":"mock-jwt-token","sessionStart":1700000000000}"#,
            )
            .unwrap();
        storage
            .set(FAVORITES_KEY, r#"{"a@x.com":["USA","FRA"]}"#)
            .unwrap();

        let mut session = SessionStore::new(storage);
        let identity = session.initialize().cloned().unwrap();

        assert_eq!(identity.email, "a@x.com");
        assert_eq!(identity.session_start.timestamp_millis(), 1_700_000_000_000);
        assert_eq!(codes(&session), vec!["FRA", "USA"]);
    }

    #[test]
    fn test_initialize_twice_does_not_reload() {
        let mut session = logged_in("a@x.com");
        assert_eq!(
            session.initialize().map(|i| i.email.clone()),
            Some("a@x.com".to_string())
        );
    }

    // ============================================================================
    // login / logout tests
    // ============================================================================

    #[test]
    fn test_login_creates_identity_and_persists() {
        let session = logged_in("a@x.com");
        let identity = session.identity().unwrap();

        assert_eq!(identity.name, DEMO_DISPLAY_NAME);
        assert_eq!(identity.token, MOCK_SESSION_TOKEN);
        assert!(session.storage().get(USER_KEY).unwrap().is_some());
        assert_eq!(
            session.storage().get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"{"a@x.com":[]}"#)
        );
    }

    #[test]
    fn test_login_rejects_empty_credentials() {
        let mut session = SessionStore::new(MemoryStore::new());
        session.initialize();

        assert!(matches!(
            session.login("", "secret"),
            Err(SessionError::EmptyCredentials)
        ));
        assert!(matches!(
            session.login("a@x.com", ""),
            Err(SessionError::EmptyCredentials)
        ));
        assert!(!session.is_authenticated());
        assert_eq!(session.storage().write_count(), 0);
    }

    #[test]
    fn test_login_before_initialize_keeps_stored_favorites() {
        let mut storage = MemoryStore::new();
        storage
            .set(FAVORITES_KEY, r#"{"a@x.com":["USA"],"b@x.com":["FRA"]}"#)
            .unwrap();

        let mut session = SessionStore::new(storage);
        session.login("a@x.com", "secret").unwrap();

        assert_eq!(codes(&session), vec!["USA"]);
        assert!(session.favorites_index().is_favorite("b@x.com", "FRA"));
        assert_eq!(
            session.storage().get(FAVORITES_KEY).unwrap().as_deref(),
            Some(r#"{"a@x.com":["USA"],"b@x.com":["FRA"]}"#)
        );
    }

    #[test]
    fn test_logout_before_initialize_keeps_stored_favorites() {
        let mut storage = MemoryStore::new();
        storage.set(FAVORITES_KEY, r#"{"a@x.com":["USA"]}"#).unwrap();

        let mut session = SessionStore::new(storage);
        session.logout().unwrap();

        assert!(!session.is_initializing());
        assert!(session.favorites_index().is_favorite("a@x.com", "USA"));
    }

    #[test]
    fn test_logout_keeps_favorites() {
        let mut session = logged_in("a@x.com");
        session.toggle_favorite("USA").unwrap();
        session.logout().unwrap();

        assert!(!session.is_authenticated());
        assert!(session.storage().get(USER_KEY).unwrap().is_none());
        assert!(session.current_favorites().is_empty());
        assert!(session.favorites_index().is_favorite("a@x.com", "USA"));
    }

    #[test]
    fn test_failed_login_write_rolls_back() {
        let storage = FailingStore {
            inner: MemoryStore::new(),
            failing_key: USER_KEY,
        };
        let mut session = SessionStore::new(storage);
        session.initialize();

        assert!(matches!(
            session.login("a@x.com", "secret"),
            Err(SessionError::Storage(_))
        ));
        assert!(!session.is_authenticated());
        assert!(session.storage().get(FAVORITES_KEY).unwrap().is_none());
        assert!(session.favorites_index().emails().next().is_none());
    }

    // ============================================================================
    // toggle tests
    // ============================================================================

    #[test]
    fn test_toggle_twice_restores_favorites() {
        let mut session = logged_in("a@x.com");
        session.toggle_favorite("FRA").unwrap();
        let before = session.current_favorites();

        assert_eq!(session.toggle_favorite("USA").unwrap(), ToggleOutcome::Added);
        assert_eq!(
            session.toggle_favorite("USA").unwrap(),
            ToggleOutcome::Removed
        );
        assert_eq!(session.current_favorites(), before);
    }

    #[test]
    fn test_toggle_when_anonymous_is_noop_without_writes() {
        let mut session = SessionStore::new(MemoryStore::new());
        session.initialize();

        assert_eq!(
            session.toggle_favorite("USA").unwrap(),
            ToggleOutcome::Ignored
        );
        assert!(session.current_favorites().is_empty());
        assert_eq!(session.storage().write_count(), 0);
    }

    #[test]
    fn test_toggle_before_initialize_is_noop() {
        let mut session = SessionStore::new(MemoryStore::new());
        assert_eq!(
            session.toggle_favorite("USA").unwrap(),
            ToggleOutcome::Ignored
        );
        assert_eq!(session.storage().write_count(), 0);
    }

    #[test]
    fn test_failed_toggle_write_leaves_memory_unchanged() {
        let mut session = SessionStore::new(FailingStore {
            inner: MemoryStore::new(),
            failing_key: "none",
        });
        session.initialize();
        session.login("a@x.com", "secret").unwrap();

        session.storage.failing_key = FAVORITES_KEY;
        assert!(session.toggle_favorite("USA").is_err());
        assert!(session.current_favorites().is_empty());
    }

    // ============================================================================
    // end-to-end scenarios
    // ============================================================================

    #[test]
    fn test_favorites_are_isolated_per_identity_and_persisted() {
        let mut session = logged_in("a@x.com");
        session.toggle_favorite("USA").unwrap();
        assert_eq!(codes(&session), vec!["USA"]);

        session.logout().unwrap();
        session.login("b@x.com", "secret").unwrap();
        assert!(codes(&session).is_empty());

        session.logout().unwrap();
        session.login("a@x.com", "secret").unwrap();
        assert_eq!(codes(&session), vec!["USA"]);
    }

    #[test]
    fn test_session_survives_process_restart() {
        let temp_dir = TempDir::new().unwrap();

        {
            let mut session = SessionStore::new(FileStore::new(temp_dir.path()));
            session.initialize();
            session.login("a@x.com", "secret").unwrap();
            session.toggle_favorite("JPN").unwrap();
        }

        let mut session = SessionStore::new(FileStore::new(temp_dir.path()));
        assert!(session.is_initializing());
        let identity = session.initialize().cloned().unwrap();

        assert_eq!(identity.email, "a@x.com");
        assert!(session.is_favorite("JPN"));
        assert!(!session.is_favorite("USA"));
    }
}
