pub mod config;
pub mod quotes;
pub mod reset;
pub mod today;

use chrono::{DateTime, Utc};
use dailyquote_core::{Clock, Database, QuoteStore};

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open the quote store in the data directory.
pub fn open_store() -> CliResult<QuoteStore<Database>> {
    Ok(QuoteStore::new(Database::open()?))
}

/// The instant given with `--now`, or the current time from `clock`.
pub fn resolve_now(now: Option<&str>, clock: &impl Clock) -> CliResult<DateTime<Utc>> {
    match now {
        Some(raw) => {
            let ts = DateTime::parse_from_rfc3339(raw)
                .map_err(|e| format!("invalid --now '{raw}': {e}"))?;
            Ok(ts.with_timezone(&Utc))
        }
        None => Ok(clock.now()),
    }
}
