use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("failed to read `{0}` from storage")]
    Read(String),
    #[error("failed to write `{0}` to storage")]
    Write(String),
    #[error("failed to remove `{0}` from storage")]
    Remove(String),
}

/// Persistent string key-value store backing the session.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Page navigation, used for the login redirect.
pub trait Navigator {
    fn navigate(&self, path: &str);
    fn current_path(&self) -> Option<String>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub username: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl UserProfile {
    pub fn named(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            extra: serde_json::Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GateOutcome {
    /// The login page itself is never gated.
    LoginPage,
    RedirectedToLogin,
    Authenticated(Option<UserProfile>),
}

/// Session context shared by everything that needs the bearer token.
/// The store stays the source of truth, so nothing is cached here.
pub struct Session {
    store: Box<dyn KeyValueStore>,
    navigator: Box<dyn Navigator>,
    token_key: String,
    user_key: String,
    login_route: String,
}

impl Session {
    pub fn new(
        store: impl KeyValueStore + 'static,
        navigator: impl Navigator + 'static,
        config: &AppConfig,
    ) -> Self {
        Self {
            store: Box::new(store),
            navigator: Box::new(navigator),
            token_key: config.token_key.clone(),
            user_key: config.user_key.clone(),
            login_route: config.login_route.clone(),
        }
    }

    /// Page-load initialization.
    pub fn restore(
        store: impl KeyValueStore + 'static,
        navigator: impl Navigator + 'static,
        config: &AppConfig,
    ) -> Rc<Self> {
        let session = Self::new(store, navigator, config);
        if session.is_authenticated() {
            log::debug!("restored stored session");
        } else {
            log::debug!("no stored session");
        }
        Rc::new(session)
    }

    pub fn token(&self) -> Option<String> {
        self.read(&self.token_key).filter(|token| !token.is_empty())
    }

    pub fn set_token(&self, token: &str) {
        self.write(&self.token_key, token);
    }

    pub fn remove_token(&self) {
        self.delete(&self.token_key);
    }

    pub fn user(&self) -> Option<UserProfile> {
        let raw = self.read(&self.user_key)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(error) => {
                log::warn!("ignoring unreadable user profile: {error}");
                None
            }
        }
    }

    pub fn set_user(&self, user: &UserProfile) {
        match serde_json::to_string(user) {
            Ok(raw) => self.write(&self.user_key, &raw),
            Err(error) => log::warn!("failed to serialize user profile: {error}"),
        }
    }

    pub fn remove_user(&self) {
        self.delete(&self.user_key);
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Clears the token and profile, then sends the page to the login route.
    pub fn logout(&self) {
        self.remove_token();
        self.remove_user();
        log::info!("session cleared, redirecting to {}", self.login_route);
        self.navigator.navigate(&self.login_route);
    }

    /// Page-load auth check. Anything but the login route needs a token.
    pub fn gate(&self) -> GateOutcome {
        if self.navigator.current_path().as_deref() == Some(self.login_route.as_str()) {
            return GateOutcome::LoginPage;
        }
        if !self.is_authenticated() {
            log::info!("no session token, redirecting to {}", self.login_route);
            self.navigator.navigate(&self.login_route);
            return GateOutcome::RedirectedToLogin;
        }
        GateOutcome::Authenticated(self.user())
    }

    fn read(&self, key: &str) -> Option<String> {
        self.store.get(key).unwrap_or_else(|error| {
            log::warn!("{error}");
            None
        })
    }

    fn write(&self, key: &str, value: &str) {
        if let Err(error) = self.store.set(key, value) {
            log::warn!("{error}");
        }
    }

    fn delete(&self, key: &str) {
        if let Err(error) = self.store.remove(key) {
            log::warn!("{error}");
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, Default)]
    pub struct RecordingNavigator {
        pub visited: Rc<RefCell<Vec<String>>>,
        pub path: Rc<RefCell<Option<String>>>,
    }

    impl RecordingNavigator {
        pub fn at(path: &str) -> Self {
            let navigator = Self::default();
            *navigator.path.borrow_mut() = Some(path.to_string());
            navigator
        }

        pub fn visits(&self) -> Vec<String> {
            self.visited.borrow().clone()
        }
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visited.borrow_mut().push(path.to_string());
        }

        fn current_path(&self) -> Option<String> {
            self.path.borrow().clone()
        }
    }

    pub fn session_with(store: &MemoryStore, navigator: &RecordingNavigator) -> Rc<Session> {
        Rc::new(Session::new(
            store.clone(),
            navigator.clone(),
            &AppConfig::default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Read(key.to_string()))
        }

        fn set(&self, key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Write(key.to_string()))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn token_round_trips_through_the_store_key() {
        let store = MemoryStore::default();
        let session = session_with(&store, &RecordingNavigator::default());

        session.set_token("abc.def");
        assert_eq!(session.token().as_deref(), Some("abc.def"));
        assert_eq!(
            store.get("paisatrack_token").unwrap().as_deref(),
            Some("abc.def")
        );

        session.remove_token();
        assert_eq!(session.token(), None);
    }

    #[test]
    fn authenticated_exactly_when_a_token_is_stored() {
        let store = MemoryStore::default();
        let session = session_with(&store, &RecordingNavigator::default());
        assert!(!session.is_authenticated());

        store.set("paisatrack_token", "t").unwrap();
        assert!(session.is_authenticated());

        store.set("paisatrack_token", "").unwrap();
        assert!(!session.is_authenticated());

        store.remove("paisatrack_token").unwrap();
        assert!(!session.is_authenticated());
    }

    #[test]
    fn user_profile_keeps_unknown_fields() {
        let store = MemoryStore::default();
        let session = session_with(&store, &RecordingNavigator::default());
        store
            .set(
                "paisatrack_user",
                r#"{"username":"asha","email":"asha@example.com"}"#,
            )
            .unwrap();

        let user = session.user().unwrap();
        assert_eq!(user.username, "asha");
        assert_eq!(user.extra["email"], "asha@example.com");

        session.set_user(&user);
        let raw = store.get("paisatrack_user").unwrap().unwrap();
        assert!(raw.contains("asha@example.com"));
    }

    #[test]
    fn unreadable_profile_reads_as_absent() {
        let store = MemoryStore::default();
        let session = session_with(&store, &RecordingNavigator::default());
        store.set("paisatrack_user", "null").unwrap();
        assert_eq!(session.user(), None);

        session.remove_user();
        assert_eq!(session.user(), None);
    }

    #[test]
    fn logout_clears_both_entries_and_redirects() {
        let store = MemoryStore::default();
        let navigator = RecordingNavigator::default();
        let session = session_with(&store, &navigator);
        session.set_token("t");
        session.set_user(&UserProfile::named("ravi"));

        session.logout();

        assert!(!session.is_authenticated());
        assert_eq!(session.user(), None);
        assert_eq!(navigator.visits(), vec!["/auth/login".to_string()]);
    }

    #[test]
    fn storage_failures_degrade_to_signed_out() {
        let navigator = RecordingNavigator::default();
        let session = Session::new(BrokenStore, navigator.clone(), &AppConfig::default());

        session.set_token("t");
        assert!(!session.is_authenticated());
        session.logout();
        assert_eq!(navigator.visits().len(), 1);
    }

    #[test]
    fn gate_skips_the_login_page() {
        let navigator = RecordingNavigator::at("/auth/login");
        let session = session_with(&MemoryStore::default(), &navigator);

        assert_eq!(session.gate(), GateOutcome::LoginPage);
        assert!(navigator.visits().is_empty());
    }

    #[test]
    fn gate_redirects_without_a_token() {
        let navigator = RecordingNavigator::at("/transactions");
        let session = session_with(&MemoryStore::default(), &navigator);

        assert_eq!(session.gate(), GateOutcome::RedirectedToLogin);
        assert_eq!(navigator.visits(), vec!["/auth/login".to_string()]);
    }

    #[test]
    fn gate_hands_back_the_stored_profile() {
        let store = MemoryStore::default();
        let navigator = RecordingNavigator::at("/");
        let session = session_with(&store, &navigator);
        session.set_token("t");
        session.set_user(&UserProfile::named("meera"));

        assert_eq!(
            session.gate(),
            GateOutcome::Authenticated(Some(UserProfile::named("meera")))
        );
        assert!(navigator.visits().is_empty());
    }
}
