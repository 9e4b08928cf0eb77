//! Quote and quote collection types.
//!
//! A [`QuoteCollection`] is kept in dataset order, which is also unlock
//! order. Locked quotes always form a suffix of the collection: once a quote
//! is unlocked, every quote before it is unlocked too.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A dataset record, before any lock state is attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteSeed {
    pub id: i64,
    pub message: String,
}

/// A quote together with its lock state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: i64,
    pub message: String,
    pub is_locked: bool,
}

impl Quote {
    pub fn locked(seed: QuoteSeed) -> Self {
        Self {
            id: seed.id,
            message: seed.message,
            is_locked: true,
        }
    }
}

/// Ordered quote list, serialized as a plain JSON array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuoteCollection {
    quotes: Vec<Quote>,
}

impl QuoteCollection {
    pub fn new(quotes: Vec<Quote>) -> Self {
        Self { quotes }
    }

    /// Build a collection with every quote locked.
    pub fn from_seeds(seeds: impl IntoIterator<Item = QuoteSeed>) -> Self {
        Self {
            quotes: seeds.into_iter().map(Quote::locked).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Quote> {
        self.quotes.iter()
    }

    pub fn get(&self, id: i64) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.id == id)
    }

    /// First locked quote in collection order.
    pub fn find_next_locked(&self) -> Option<&Quote> {
        self.quotes.iter().find(|q| q.is_locked)
    }

    /// Last unlocked quote, scanning from the end.
    pub fn find_last_unlocked(&self) -> Option<&Quote> {
        self.quotes.iter().rev().find(|q| !q.is_locked)
    }

    /// Unlocked quotes in collection order.
    pub fn unlocked(&self) -> Vec<Quote> {
        self.quotes.iter().filter(|q| !q.is_locked).cloned().collect()
    }

    /// Number of unlocked quotes. Under the suffix invariant this is also
    /// the index of the next locked quote.
    pub fn unlocked_count(&self) -> usize {
        self.quotes.iter().filter(|q| !q.is_locked).count()
    }

    pub fn all_unlocked(&self) -> bool {
        self.quotes.iter().all(|q| !q.is_locked)
    }

    /// Set the lock state of the quote with the given id.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if no quote has that id.
    pub fn set_locked(&mut self, id: i64, locked: bool) -> Result<()> {
        let quote = self
            .quotes
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(CoreError::NotFound { id })?;
        quote.is_locked = locked;
        Ok(())
    }

    /// Check id ordering and the locked-suffix invariant.
    ///
    /// # Errors
    /// Returns [`CoreError::Invariant`] describing the first violation found.
    pub fn validate(&self) -> Result<()> {
        for pair in self.quotes.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.id <= prev.id {
                return Err(CoreError::Invariant(format!(
                    "quote ids must be strictly ascending, found {} after {}",
                    next.id, prev.id
                )));
            }
            if prev.is_locked && !next.is_locked {
                return Err(CoreError::Invariant(format!(
                    "quote {} is unlocked but earlier quote {} is still locked",
                    next.id, prev.id
                )));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a QuoteCollection {
    type Item = &'a Quote;
    type IntoIter = std::slice::Iter<'a, Quote>;

    fn into_iter(self) -> Self::IntoIter {
        self.quotes.iter()
    }
}
