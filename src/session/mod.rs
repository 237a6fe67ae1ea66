//! Persisted login state.
//!
//! A single storage slot holds the serialized credential pair. `Session`
//! wraps the store together with the in-memory pair and is handed to each
//! screen controller explicitly.

pub mod file;
pub mod keychain;

use anyhow::Result;
use log::{info, warn};
use std::cell::RefCell;
use std::rc::Rc;

use crate::config::{Config, SessionBackend};
use crate::domain::credentials::Credentials;

pub const SESSION_KEY: &str = "rs_webmail_auth";

/// One string slot of client-local storage.
pub trait SessionStorage {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, value: &str) -> Result<()>;
    fn remove(&self) -> Result<()>;
}

/// Process-local slot; clones share the same value.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn peek(&self) -> Option<String> {
        self.slot.borrow().clone()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self) -> Result<Option<String>> {
        Ok(self.slot.borrow().clone())
    }
    fn write(&self, value: &str) -> Result<()> {
        *self.slot.borrow_mut() = Some(value.to_string());
        Ok(())
    }
    fn remove(&self) -> Result<()> {
        self.slot.borrow_mut().take();
        Ok(())
    }
}

pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
}

impl SessionStore {
    pub fn new(storage: impl SessionStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(match cfg.session_backend {
            SessionBackend::File => Self::new(file::FileStorage::default_location(SESSION_KEY)?),
            SessionBackend::Keyring => Self::new(keychain::KeyringStorage::new(SESSION_KEY)),
        })
    }

    /// Overwrites whatever pair was stored before.
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        let s = serde_json::to_string(credentials)?;
        self.storage.write(&s)
    }

    /// Unreadable or malformed content is treated as no session; a malformed slot is cleared.
    pub fn load(&self) -> Option<Credentials> {
        let raw = match self.storage.read() {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("could not read stored session: {e}");
                return None;
            }
        };
        match serde_json::from_str::<Credentials>(&raw) {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("discarding malformed stored session: {e}");
                if let Err(e) = self.storage.remove() {
                    warn!("could not clear stored session: {e}");
                }
                None
            }
        }
    }

    pub fn clear(&self) -> Result<()> {
        self.storage.remove()
    }
}

pub type SharedSession = Rc<RefCell<Session>>;

/// The logged-in state shared by every screen.
pub struct Session {
    store: SessionStore,
    current: Option<Credentials>,
}

impl Session {
    pub fn new(store: SessionStore) -> Self {
        Self {
            store,
            current: None,
        }
    }

    /// Starts from whatever pair the store holds.
    pub fn restore(store: SessionStore) -> Self {
        let current = store.load();
        if let Some(c) = &current {
            info!("restored session for {}", c.email);
        }
        Self { store, current }
    }

    pub fn shared(self) -> SharedSession {
        Rc::new(RefCell::new(self))
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.current.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.current.is_some()
    }

    /// Persisting is best-effort; a store failure is only logged.
    pub fn sign_in(&mut self, credentials: Credentials) {
        if let Err(e) = self.store.save(&credentials) {
            warn!("couldn't persist session for {}: {e}", credentials.email);
        }
        info!("signed in as {}", credentials.email);
        self.current = Some(credentials);
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = self.store.clear() {
            warn!("couldn't clear stored session: {e}");
        }
        if let Some(c) = self.current.take() {
            info!("signed out {}", c.email);
        }
    }
}
