use anyhow::{Result, anyhow};
use keyring::{Entry, Error as KeyringError};

use crate::config::APP_DIR;
use crate::session::SessionStorage;

/// Session slot kept in the OS keyring under service `rs_webmail`.
pub struct KeyringStorage {
    key: String,
}

impl KeyringStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(APP_DIR, &self.key).map_err(|e| anyhow!(e.to_string()))
    }
}

impl SessionStorage for KeyringStorage {
    fn read(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(v) => Ok(Some(v)),
            Err(KeyringError::NoEntry) => Ok(None),
            Err(e) => Err(anyhow!(e.to_string())),
        }
    }

    fn write(&self, value: &str) -> Result<()> {
        self.entry()?
            .set_password(value)
            .map_err(|e| anyhow!(e.to_string()))
    }

    fn remove(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(KeyringError::NoEntry) => Ok(()),
            Err(e) => Err(anyhow!(e.to_string())),
        }
    }
}
