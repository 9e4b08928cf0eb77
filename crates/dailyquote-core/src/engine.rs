//! Daily unlock engine.
//!
//! The engine keeps no state between activations. Each call to
//! [`UnlockEngine::decide`] derives an [`ActivationState`] from what the
//! store holds and the caller-supplied `now`, then acts on it.
//!
//! ## State Transitions
//!
//! ```text
//! Uninitialized --fetch + initialize--> FreshDay
//! FreshDay  -> unlock next quote   -> RevealNew   (or AllUnlocked when none remain)
//! SameDay   -> re-show last quote  -> Replay
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let store = QuoteStore::new(Database::open()?);
//! let mut engine = UnlockEngine::new(store, BuiltinDataset, EngineOptions::default());
//! let decision = engine.on_activate(Utc::now()).await?;
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::clock::{is_at_least_one_calendar_day_apart, CalendarZone};
use crate::dataset::DatasetSource;
use crate::error::{CoreError, Result};
use crate::quote::{Quote, QuoteCollection};
use crate::storage::{KvBackend, QuoteStore};

/// Engine configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Treat every activation as a new calendar day.
    pub force_fresh_day: bool,
    /// Zone used to decide calendar dates.
    pub zone: CalendarZone,
}

/// Where an activation starts, derived from persisted state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationState {
    /// No quotes persisted yet.
    Uninitialized,
    /// A new quote may be unlocked.
    FreshDay,
    /// Today's quote was already unlocked.
    SameDay,
}

/// Outcome of one activation.
///
/// Every variant carries the unlocked quotes in collection order and the
/// total number of quotes, for the "previously unlocked" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Decision {
    /// A quote was unlocked by this activation.
    RevealNew {
        quote: Quote,
        unlocked: Vec<Quote>,
        total: usize,
    },
    /// The most recent quote again, with the "come back tomorrow" notice.
    Replay {
        quote: Quote,
        come_back_tomorrow: bool,
        unlocked: Vec<Quote>,
        total: usize,
    },
    /// Nothing left to unlock.
    AllUnlocked { unlocked: Vec<Quote>, total: usize },
}

impl Decision {
    /// The quote to feature, if any.
    pub fn quote(&self) -> Option<&Quote> {
        match self {
            Self::RevealNew { quote, .. } | Self::Replay { quote, .. } => Some(quote),
            Self::AllUnlocked { .. } => None,
        }
    }

    pub fn unlocked(&self) -> &[Quote] {
        match self {
            Self::RevealNew { unlocked, .. }
            | Self::Replay { unlocked, .. }
            | Self::AllUnlocked { unlocked, .. } => unlocked,
        }
    }

    pub fn total(&self) -> usize {
        match self {
            Self::RevealNew { total, .. }
            | Self::Replay { total, .. }
            | Self::AllUnlocked { total, .. } => *total,
        }
    }

    pub fn come_back_tomorrow(&self) -> bool {
        matches!(
            self,
            Self::Replay {
                come_back_tomorrow: true,
                ..
            }
        )
    }
}

/// The daily unlock state machine.
pub struct UnlockEngine<B, D> {
    store: QuoteStore<B>,
    dataset: D,
    options: EngineOptions,
}

impl<B: KvBackend, D: DatasetSource> UnlockEngine<B, D> {
    pub fn new(store: QuoteStore<B>, dataset: D, options: EngineOptions) -> Self {
        Self {
            store,
            dataset,
            options,
        }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn store(&self) -> &QuoteStore<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut QuoteStore<B> {
        &mut self.store
    }

    pub fn into_store(self) -> QuoteStore<B> {
        self.store
    }

    /// Derive the activation state for `now` without changing anything.
    ///
    /// # Errors
    /// Returns an error if persisted state cannot be read.
    pub fn state(&self, now: DateTime<Utc>) -> Result<ActivationState> {
        if self.store.load()?.is_none() {
            return Ok(ActivationState::Uninitialized);
        }
        if self.is_fresh_day(now)? {
            Ok(ActivationState::FreshDay)
        } else {
            Ok(ActivationState::SameDay)
        }
    }

    /// Entry point for one activation.
    pub async fn on_activate(&mut self, now: DateTime<Utc>) -> Result<Decision> {
        self.decide(now).await
    }

    /// Decide what this activation shows and apply any unlock.
    ///
    /// # Errors
    /// - [`CoreError::Load`] if the dataset is needed and cannot be fetched;
    ///   nothing is persisted and the next activation retries.
    /// - [`CoreError::Persistence`] if the store fails; no partial state is
    ///   written.
    /// - [`CoreError::Invariant`] if persisted state is inconsistent.
    pub async fn decide(&mut self, now: DateTime<Utc>) -> Result<Decision> {
        let quotes = match self.store.load()? {
            Some(quotes) => quotes,
            None => {
                info!("no quotes persisted, loading dataset");
                let seeds = self.dataset.fetch().await.map_err(|e| {
                    warn!(error = %e, "dataset load failed, staying uninitialized");
                    e
                })?;
                let quotes = self.store.initialize(seeds)?;
                info!(count = quotes.len(), "quotes initialized");
                return self.reveal_next(quotes, now);
            }
        };

        if self.is_fresh_day(now)? {
            self.reveal_next(quotes, now)
        } else {
            self.replay_last(&quotes)
        }
    }

    fn is_fresh_day(&self, now: DateTime<Utc>) -> Result<bool> {
        if self.options.force_fresh_day {
            return Ok(true);
        }
        Ok(match self.store.last_unlock_date()? {
            None => true,
            Some(last) => is_at_least_one_calendar_day_apart(self.options.zone, last, now),
        })
    }

    fn reveal_next(&mut self, mut quotes: QuoteCollection, now: DateTime<Utc>) -> Result<Decision> {
        let Some(target) = quotes.find_next_locked().cloned() else {
            info!(total = quotes.len(), "all quotes already unlocked");
            return Ok(Decision::AllUnlocked {
                unlocked: quotes.unlocked(),
                total: quotes.len(),
            });
        };

        quotes.set_locked(target.id, false).map_err(|e| match e {
            CoreError::NotFound { id } => {
                CoreError::Invariant(format!("quote {id} disappeared while unlocking"))
            }
            other => other,
        })?;
        self.store.record_unlock(&quotes, now)?;

        let quote = Quote {
            is_locked: false,
            ..target
        };
        info!(id = quote.id, unlocked = quotes.unlocked_count(), "revealed new quote");
        Ok(Decision::RevealNew {
            quote,
            unlocked: quotes.unlocked(),
            total: quotes.len(),
        })
    }

    fn replay_last(&self, quotes: &QuoteCollection) -> Result<Decision> {
        let quote = quotes.find_last_unlocked().cloned().ok_or_else(|| {
            CoreError::Invariant(
                "an unlock date is recorded but no quote is unlocked".to_string(),
            )
        })?;
        info!(id = quote.id, "same day, replaying last quote");
        Ok(Decision::Replay {
            quote,
            come_back_tomorrow: true,
            unlocked: quotes.unlocked(),
            total: quotes.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::StaticDataset;
    use crate::error::{LoadError, PersistenceError};
    use crate::quote::QuoteSeed;
    use crate::storage::{MemoryBackend, QUOTES_KEY};
    use chrono::FixedOffset;

    struct FailingDataset;

    impl DatasetSource for FailingDataset {
        async fn fetch(&self) -> std::result::Result<Vec<QuoteSeed>, LoadError> {
            Err(LoadError::Status {
                url: "http://localhost/quotes.json".into(),
                status: 503,
            })
        }
    }

    fn at(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn utc_options() -> EngineOptions {
        EngineOptions {
            force_fresh_day: false,
            zone: CalendarZone::Fixed(FixedOffset::east_opt(0).unwrap()),
        }
    }

    fn dataset(n: i64) -> StaticDataset {
        StaticDataset::new(
            (1..=n)
                .map(|id| QuoteSeed {
                    id,
                    message: format!("quote {id}"),
                })
                .collect(),
        )
    }

    fn quote(id: i64, is_locked: bool) -> Quote {
        Quote {
            id,
            message: format!("quote {id}"),
            is_locked,
        }
    }

    /// Engine over a store that already holds `quotes` and an unlock date.
    fn seeded_engine(
        quotes: Vec<Quote>,
        last_unlock: DateTime<Utc>,
    ) -> UnlockEngine<MemoryBackend, StaticDataset> {
        let mut store = QuoteStore::new(MemoryBackend::new());
        store
            .record_unlock(&QuoteCollection::new(quotes), last_unlock)
            .unwrap();
        UnlockEngine::new(store, dataset(0), utc_options())
    }

    #[tokio::test]
    async fn first_activation_initializes_and_reveals_first_quote() {
        let mut engine = UnlockEngine::new(QuoteStore::new(MemoryBackend::new()), dataset(3), utc_options());
        let now = at("2024-01-01T09:00:00Z");
        assert_eq!(engine.state(now).unwrap(), ActivationState::Uninitialized);

        let decision = engine.decide(now).await.unwrap();
        assert_eq!(decision.quote().map(|q| q.id), Some(1));
        assert!(matches!(decision, Decision::RevealNew { total: 3, .. }));
        assert_eq!(engine.store().last_unlock_date().unwrap(), Some(now));
        assert_eq!(engine.state(now).unwrap(), ActivationState::SameDay);
    }

    #[tokio::test]
    async fn same_day_replays_last_unlocked() {
        let last = at("2024-01-02T08:00:00Z");
        let mut engine = seeded_engine(vec![quote(1, false), quote(2, false), quote(3, true)], last);

        let decision = engine.decide(at("2024-01-02T21:00:00Z")).await.unwrap();
        match decision {
            Decision::Replay {
                ref quote,
                come_back_tomorrow,
                ref unlocked,
                ..
            } => {
                assert_eq!(quote.id, 2);
                assert!(come_back_tomorrow);
                assert_eq!(unlocked.len(), 2);
            }
            other => panic!("expected replay, got {other:?}"),
        }
        assert_eq!(engine.store().last_unlock_date().unwrap(), Some(last));
    }

    #[tokio::test]
    async fn same_day_replay_is_idempotent() {
        let mut engine = seeded_engine(
            vec![quote(1, false), quote(2, false), quote(3, true)],
            at("2024-01-02T08:00:00Z"),
        );
        let now = at("2024-01-02T12:00:00Z");
        let first = engine.decide(now).await.unwrap();
        let second = engine.decide(now).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn fresh_day_unlocks_next_quote() {
        let mut engine = seeded_engine(
            vec![quote(1, false), quote(2, true), quote(3, true)],
            at("2024-01-01T23:59:00Z"),
        );
        let now = at("2024-01-02T00:01:00Z");
        assert_eq!(engine.state(now).unwrap(), ActivationState::FreshDay);

        let decision = engine.decide(now).await.unwrap();
        assert_eq!(decision, Decision::RevealNew {
            quote: quote(2, false),
            unlocked: vec![quote(1, false), quote(2, false)],
            total: 3,
        });

        let stored = engine.store().load().unwrap().unwrap();
        assert_eq!(stored.find_next_locked().map(|q| q.id), Some(3));
        assert_eq!(engine.store().last_unlock_date().unwrap(), Some(now));
    }

    #[tokio::test]
    async fn all_unlocked_is_terminal_and_mutates_nothing() {
        let last = at("2024-01-01T10:00:00Z");
        let mut engine = seeded_engine(vec![quote(1, false), quote(2, false)], last);

        for day in ["2024-01-05T10:00:00Z", "2024-01-06T10:00:00Z"] {
            let decision = engine.decide(at(day)).await.unwrap();
            assert!(matches!(decision, Decision::AllUnlocked { total: 2, .. }));
            assert_eq!(decision.unlocked().len(), 2);
        }
        assert_eq!(engine.store().last_unlock_date().unwrap(), Some(last));
    }

    #[tokio::test]
    async fn force_fresh_day_unlocks_on_every_activation() {
        let options = EngineOptions {
            force_fresh_day: true,
            ..utc_options()
        };
        let mut engine = UnlockEngine::new(QuoteStore::new(MemoryBackend::new()), dataset(3), options);
        let now = at("2024-01-01T09:00:00Z");
        for expected in 1..=3 {
            let decision = engine.decide(now).await.unwrap();
            assert_eq!(decision.quote().map(|q| q.id), Some(expected));
        }
        assert!(matches!(
            engine.decide(now).await.unwrap(),
            Decision::AllUnlocked { .. }
        ));
    }

    #[tokio::test]
    async fn dataset_failure_leaves_store_uninitialized() {
        let mut engine =
            UnlockEngine::new(QuoteStore::new(MemoryBackend::new()), FailingDataset, utc_options());
        let now = at("2024-01-01T09:00:00Z");
        let err = engine.decide(now).await.unwrap_err();
        assert!(matches!(err, CoreError::Load(LoadError::Status { status: 503, .. })));
        assert!(engine.store().load().unwrap().is_none());
        assert!(engine.store().last_unlock_date().unwrap().is_none());
        assert_eq!(engine.state(now).unwrap(), ActivationState::Uninitialized);
    }

    #[tokio::test]
    async fn unavailable_store_surfaces_persistence_error() {
        let mut engine = UnlockEngine::new(
            QuoteStore::new(MemoryBackend::unavailable()),
            dataset(3),
            utc_options(),
        );
        let err = engine.decide(at("2024-01-01T09:00:00Z")).await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::Persistence(PersistenceError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn same_day_with_nothing_unlocked_is_an_invariant_violation() {
        let mut backend = MemoryBackend::new();
        backend
            .set(QUOTES_KEY, &serde_json::to_string(&vec![quote(1, true)]).unwrap())
            .unwrap();
        let mut store = QuoteStore::new(backend);
        store.set_last_unlock_date(at("2024-01-02T08:00:00Z")).unwrap();
        let mut engine = UnlockEngine::new(store, dataset(0), utc_options());

        let err = engine.decide(at("2024-01-02T09:00:00Z")).await.unwrap_err();
        assert!(matches!(err, CoreError::Invariant(_)));
    }

    #[tokio::test]
    async fn clock_moving_backwards_counts_as_same_day() {
        let mut engine = seeded_engine(
            vec![quote(1, false), quote(2, true)],
            at("2024-01-05T08:00:00Z"),
        );
        let decision = engine.decide(at("2024-01-03T08:00:00Z")).await.unwrap();
        assert!(decision.come_back_tomorrow());
        assert_eq!(decision.quote().map(|q| q.id), Some(1));
    }

    #[test]
    fn decision_serializes_with_type_tag() {
        let decision = Decision::AllUnlocked {
            unlocked: vec![],
            total: 0,
        };
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["type"], "all_unlocked");
        assert_eq!(json["total"], 0);
    }
}
