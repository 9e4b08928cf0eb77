use clap::Args;
use dailyquote_core::presentation::WELCOME_MESSAGE;
use chrono::{DateTime, Utc};
use dailyquote_core::{
    Config, Dataset, EngineOptions, JsonPresenter, KvBackend, Presenter, QuoteStore, SystemClock,
    TextPresenter, UnlockEngine,
};
use tracing::{debug, warn};

use super::{open_store, resolve_now, CliResult};

#[derive(Args)]
pub struct TodayArgs {
    /// Print the decision as JSON
    #[arg(long)]
    json: bool,
    /// Activation time (RFC 3339), defaults to the current time
    #[arg(long, value_name = "RFC3339")]
    now: Option<String>,
    /// Dataset source overriding `dataset.source`
    #[arg(long, value_name = "SOURCE")]
    dataset: Option<String>,
    /// Unlock a new quote even if one was unlocked today
    #[arg(long)]
    force_fresh_day: bool,
}

pub async fn run(args: TodayArgs) -> CliResult {
    let config = Config::load()?;
    let now = resolve_now(args.now.as_deref(), &SystemClock)?;

    let source = args.dataset.as_deref().unwrap_or(config.dataset.source.as_str());
    let options = EngineOptions {
        force_fresh_day: args.force_fresh_day || config.unlock.force_fresh_day,
        zone: config.calendar_zone()?,
    };
    debug!(source, now = %now, "activating");
    let mut engine = UnlockEngine::new(open_store()?, Dataset::from_source(source)?, options);

    let show_welcome = !args.json
        && config.display.show_welcome
        && engine.store().welcome_shown_at()?.is_none();

    let decision = engine.on_activate(now).await?;

    if args.json {
        println!("{}", JsonPresenter { pretty: true }.present(&decision)?);
        return Ok(());
    }

    if show_welcome {
        println!("{WELCOME_MESSAGE}\n");
        record_welcome(engine.store_mut(), now);
    }
    let presenter = TextPresenter {
        show_unlocked: config.display.show_unlocked,
    };
    print!("{}", presenter.present(&decision));
    Ok(())
}

/// Remember that the welcome message was shown. The quote is already
/// unlocked at this point, so a failed write only means the welcome
/// repeats next time.
fn record_welcome<B: KvBackend>(store: &mut QuoteStore<B>, now: DateTime<Utc>) -> bool {
    match store.mark_welcome_shown(now) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "could not record welcome message");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dailyquote_core::MemoryBackend;

    #[test]
    fn welcome_is_recorded() {
        let mut store = QuoteStore::new(MemoryBackend::new());
        let now = Utc::now();
        assert!(record_welcome(&mut store, now));
        assert!(store.welcome_shown_at().unwrap().is_some());
    }

    #[test]
    fn welcome_write_failure_is_not_fatal() {
        let mut store = QuoteStore::new(MemoryBackend::unavailable());
        assert!(!record_welcome(&mut store, Utc::now()));
        assert!(store.welcome_shown_at().unwrap().is_none());
    }
}
