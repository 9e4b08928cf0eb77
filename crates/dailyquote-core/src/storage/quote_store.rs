//! Quote store: the persisted unlock state on top of a [`KvBackend`].
//!
//! Two keys make up the unlock state. `QUOTES` holds the JSON-encoded
//! collection and `LAST_UNLOCK_DATE` an RFC 3339 timestamp. A third key
//! remembers when the welcome message was shown.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::KvBackend;
use crate::error::{CoreError, PersistenceError, Result};
use crate::quote::{QuoteCollection, QuoteSeed};

pub const QUOTES_KEY: &str = "QUOTES";
pub const LAST_UNLOCK_DATE_KEY: &str = "LAST_UNLOCK_DATE";
pub const WELCOME_VIEWED_KEY: &str = "WELCOME_VIEWED_DATE";

/// Read/write access to the persisted quotes and unlock date.
pub struct QuoteStore<B> {
    backend: B,
}

impl<B: KvBackend> QuoteStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_inner(self) -> B {
        self.backend
    }

    /// Persisted collection, or `None` if the store was never initialized.
    ///
    /// # Errors
    /// Returns an error if the stored blob cannot be decoded or breaks the
    /// ordering invariants.
    pub fn load(&self) -> Result<Option<QuoteCollection>> {
        let Some(raw) = self.backend.get(QUOTES_KEY)? else {
            return Ok(None);
        };
        let quotes: QuoteCollection =
            serde_json::from_str(&raw).map_err(|e| PersistenceError::Corrupt {
                key: QUOTES_KEY.to_string(),
                message: e.to_string(),
            })?;
        quotes.validate()?;
        Ok(Some(quotes))
    }

    /// Build a fully locked collection from `seeds`, persist and return it.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] if the store refuses the write.
    pub fn initialize(&mut self, seeds: Vec<QuoteSeed>) -> Result<QuoteCollection> {
        let quotes = QuoteCollection::from_seeds(seeds);
        self.save(&quotes)?;
        debug!(count = quotes.len(), "initialized quote store");
        Ok(quotes)
    }

    /// Overwrite the persisted collection.
    ///
    /// # Errors
    /// Returns [`CoreError::Invariant`] for a collection whose locked quotes
    /// are not a suffix, or a persistence error if the write fails.
    pub fn save(&mut self, quotes: &QuoteCollection) -> Result<()> {
        quotes.validate()?;
        let blob = encode_quotes(quotes)?;
        self.backend.set(QUOTES_KEY, &blob)?;
        Ok(())
    }

    /// Set the lock state of one persisted quote.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if no persisted quote has that id.
    pub fn set_locked(&mut self, id: i64, locked: bool) -> Result<()> {
        let mut quotes = self.load()?.ok_or(CoreError::NotFound { id })?;
        quotes.set_locked(id, locked)?;
        self.save(&quotes)?;
        debug!(id, locked, "updated quote lock state");
        Ok(())
    }

    /// Date of the most recent unlock, if any.
    pub fn last_unlock_date(&self) -> Result<Option<DateTime<Utc>>> {
        self.read_timestamp(LAST_UNLOCK_DATE_KEY)
    }

    pub fn set_last_unlock_date(&mut self, ts: DateTime<Utc>) -> Result<()> {
        self.backend.set(LAST_UNLOCK_DATE_KEY, &ts.to_rfc3339())?;
        Ok(())
    }

    /// Persist an unlocked collection and its unlock date in one write.
    ///
    /// # Errors
    /// Neither key changes when this fails.
    pub fn record_unlock(&mut self, quotes: &QuoteCollection, ts: DateTime<Utc>) -> Result<()> {
        quotes.validate()?;
        let blob = encode_quotes(quotes)?;
        let date = ts.to_rfc3339();
        self.backend
            .set_many(&[(QUOTES_KEY, blob.as_str()), (LAST_UNLOCK_DATE_KEY, date.as_str())])?;
        debug!(unlocked = quotes.unlocked_count(), at = %date, "recorded unlock");
        Ok(())
    }

    /// Forget all progress, returning the store to its uninitialized state.
    pub fn reset(&mut self) -> Result<()> {
        self.backend.remove(QUOTES_KEY)?;
        self.backend.remove(LAST_UNLOCK_DATE_KEY)?;
        self.backend.remove(WELCOME_VIEWED_KEY)?;
        debug!("reset quote store");
        Ok(())
    }

    pub fn welcome_shown_at(&self) -> Result<Option<DateTime<Utc>>> {
        self.read_timestamp(WELCOME_VIEWED_KEY)
    }

    pub fn mark_welcome_shown(&mut self, ts: DateTime<Utc>) -> Result<()> {
        self.backend.set(WELCOME_VIEWED_KEY, &ts.to_rfc3339())?;
        Ok(())
    }

    fn read_timestamp(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(None);
        };
        let ts = DateTime::parse_from_rfc3339(&raw).map_err(|e| PersistenceError::Corrupt {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(ts.with_timezone(&Utc)))
    }
}

fn encode_quotes(quotes: &QuoteCollection) -> Result<String, PersistenceError> {
    serde_json::to_string(quotes).map_err(|e| PersistenceError::Encode {
        key: QUOTES_KEY.to_string(),
        message: e.to_string(),
    })
}
