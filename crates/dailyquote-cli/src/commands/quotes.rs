use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use dailyquote_core::presentation::render_unlocked;
use dailyquote_core::{
    ActivationState, BuiltinDataset, Config, EngineOptions, ListFormat, SystemClock, UnlockEngine,
};
use serde::Serialize;

use super::{open_store, resolve_now, CliResult};

pub fn list(json: bool) -> CliResult {
    let store = open_store()?;
    let unlocked = store.load()?.map(|q| q.unlocked()).unwrap_or_default();

    if json {
        println!("{}", serde_json::to_string_pretty(&unlocked)?);
    } else if unlocked.is_empty() {
        println!("No quotes unlocked yet. Run `dailyquote today` to unlock one.");
    } else {
        print!("{}", render_unlocked(&unlocked, ListFormat::Text));
    }
    Ok(())
}

#[derive(Args)]
pub struct StatusArgs {
    /// Print as JSON
    #[arg(long)]
    json: bool,
    /// Evaluate as of this time (RFC 3339)
    #[arg(long, value_name = "RFC3339")]
    now: Option<String>,
}

#[derive(Serialize)]
struct StatusReport {
    state: ActivationState,
    total: usize,
    unlocked: usize,
    last_unlock_date: Option<DateTime<Utc>>,
    next_unlock_at: Option<DateTime<Utc>>,
}

pub fn status(args: StatusArgs) -> CliResult {
    let config = Config::load()?;
    let now = resolve_now(args.now.as_deref(), &SystemClock)?;
    let options = EngineOptions {
        force_fresh_day: config.unlock.force_fresh_day,
        zone: config.calendar_zone()?,
    };
    // State queries never fetch, so the configured source is irrelevant here.
    let engine = UnlockEngine::new(open_store()?, BuiltinDataset, options);

    let quotes = engine.store().load()?;
    let last_unlock_date = engine.store().last_unlock_date()?;
    let state = engine.state(now)?;
    let all_unlocked = quotes.as_ref().is_some_and(|q| q.all_unlocked());
    let report = StatusReport {
        state,
        total: quotes.as_ref().map_or(0, |q| q.len()),
        unlocked: quotes.as_ref().map_or(0, |q| q.unlocked_count()),
        last_unlock_date,
        next_unlock_at: match (state, last_unlock_date) {
            (ActivationState::SameDay, Some(last)) if !all_unlocked => {
                options.zone.start_of_next_day(last)
            }
            _ => None,
        },
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    match report.state {
        ActivationState::Uninitialized => println!("No quotes loaded yet."),
        _ => {
            println!("Unlocked {} of {} quotes", report.unlocked, report.total);
            if let Some(last) = report.last_unlock_date {
                println!("Last unlock: {}", last.to_rfc3339());
            }
            if all_unlocked {
                println!("Every quote is unlocked.");
            } else if let Some(next) = report.next_unlock_at {
                println!("Next quote unlocks at {}", next.to_rfc3339());
            } else {
                println!("A new quote is ready.");
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportFormat {
    Text,
    Markdown,
}

impl From<ExportFormat> for ListFormat {
    fn from(format: ExportFormat) -> Self {
        match format {
            ExportFormat::Text => ListFormat::Text,
            ExportFormat::Markdown => ListFormat::Markdown,
        }
    }
}

#[derive(Args)]
pub struct ExportArgs {
    /// Output file
    path: PathBuf,
    /// Output layout
    #[arg(long, value_enum, default_value = "text")]
    format: ExportFormat,
}

pub fn export(args: ExportArgs) -> CliResult {
    let store = open_store()?;
    let unlocked = store.load()?.map(|q| q.unlocked()).unwrap_or_default();
    if unlocked.is_empty() {
        return Err("no unlocked quotes to export".into());
    }

    std::fs::write(&args.path, render_unlocked(&unlocked, args.format.into()))?;
    println!("exported {} quotes to {}", unlocked.len(), args.path.display());
    Ok(())
}
