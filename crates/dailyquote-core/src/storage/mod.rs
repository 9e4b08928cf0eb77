//! Persistence layer.
//!
//! Persisted state is a small string key-value map. [`KvBackend`] is the
//! storage seam; [`QuoteStore`] layers the quote/date encoding on top of it.

mod config;
pub mod database;
mod quote_store;

pub use config::{Config, DatasetConfig, DisplayConfig, UnlockConfig};
pub use database::Database;
pub use quote_store::{QuoteStore, LAST_UNLOCK_DATE_KEY, QUOTES_KEY, WELCOME_VIEWED_KEY};

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::PersistenceError;

/// Returns the data directory, creating it if needed.
///
/// `DAILYQUOTE_HOME` wins when set. Otherwise `~/.config/dailyquote/`, or
/// `~/.config/dailyquote-dev/` when `DAILYQUOTE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, PersistenceError> {
    let dir = match std::env::var_os("DAILYQUOTE_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DAILYQUOTE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("dailyquote-dev")
            } else {
                base_dir.join("dailyquote")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// String key-value storage.
pub trait KvBackend {
    /// Read the value under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Write several entries so that either all or none are stored.
    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), PersistenceError>;

    /// Delete `key`. Deleting an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

/// In-memory backend.
///
/// A backend built with [`MemoryBackend::unavailable`] rejects every write,
/// the way a disabled or full browser store would.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self {
            entries: HashMap::new(),
            unavailable: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn check_writable(&self) -> Result<(), PersistenceError> {
        if self.unavailable {
            return Err(PersistenceError::Unavailable("storage is disabled".into()));
        }
        Ok(())
    }
}

impl KvBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn set_many(&mut self, entries: &[(&str, &str)]) -> Result<(), PersistenceError> {
        self.check_writable()?;
        for (key, value) in entries {
            self.entries.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.check_writable()?;
        self.entries.remove(key);
        Ok(())
    }
}
