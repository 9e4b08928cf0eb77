//! # dailyquote Core Library
//!
//! Core logic for dailyquote, a tool that unlocks one quote per calendar day
//! from a fixed pool and keeps track of the quotes already seen. All
//! operations are available through the `dailyquote` CLI, a thin layer over
//! this crate.
//!
//! ## Architecture
//!
//! - **Unlock Engine**: a stateless state machine; each activation decides
//!   whether to reveal a new quote, replay the last one, or report that
//!   everything is unlocked
//! - **Storage**: SQLite key-value persistence and TOML configuration
//! - **Clock**: calendar-day comparison in a configurable zone
//! - **Datasets**: built-in, file and HTTP quote sources
//!
//! ## Key Components
//!
//! - [`UnlockEngine`]: the daily unlock state machine
//! - [`QuoteStore`]: persisted quotes and unlock date
//! - [`Config`]: application configuration management
//! - [`DatasetSource`]: trait for quote datasets

pub mod clock;
pub mod dataset;
pub mod engine;
pub mod error;
pub mod presentation;
pub mod quote;
pub mod storage;

pub use clock::{
    calendar_days_between, is_at_least_one_calendar_day_apart, CalendarZone, Clock, FixedClock,
    SystemClock,
};
pub use dataset::{BuiltinDataset, Dataset, DatasetSource, FileDataset, HttpDataset, StaticDataset};
pub use engine::{ActivationState, Decision, EngineOptions, UnlockEngine};
pub use error::{ConfigError, CoreError, LoadError, PersistenceError};
pub use presentation::{JsonPresenter, ListFormat, Presenter, TextPresenter};
pub use quote::{Quote, QuoteCollection, QuoteSeed};
pub use storage::{Config, Database, KvBackend, MemoryBackend, QuoteStore};
