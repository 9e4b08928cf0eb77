//! Rendering of unlock decisions.
//!
//! The engine never formats anything itself. A [`Presenter`] turns a
//! [`Decision`] into whatever the front end needs; [`TextPresenter`] and
//! [`JsonPresenter`] cover the CLI.

use std::fmt::Write as _;

use crate::engine::Decision;
use crate::quote::Quote;

pub const COME_BACK_TOMORROW: &str =
    "You have already unlocked today's quote, come back tomorrow to unlock the next one!";

pub const WELCOME_MESSAGE: &str = "Welcome! A new quote unlocks every day. \
Come back tomorrow for the next one, and use `dailyquote list` to revisit the ones you have seen.";

/// Message shown once every quote is unlocked.
pub fn completion_message(total: usize) -> String {
    format!(
        "Congratulations... You have viewed all {total} quotes!\n\
         Be sure to export or save them for future reference."
    )
}

/// Layout for a standalone list of unlocked quotes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListFormat {
    #[default]
    Text,
    Markdown,
}

/// Render unlocked quotes as a standalone document.
pub fn render_unlocked(quotes: &[Quote], format: ListFormat) -> String {
    let mut out = String::new();
    match format {
        ListFormat::Text => {
            out.push_str("Unlocked Quotes...\n");
            for q in quotes {
                let _ = writeln!(out, "  #{:<3} {}", q.id, q.message);
            }
        }
        ListFormat::Markdown => {
            out.push_str("# Unlocked Quotes\n\n");
            for (n, q) in quotes.iter().enumerate() {
                let _ = writeln!(out, "{}. {}", n + 1, q.message);
            }
        }
    }
    out
}

/// Turns a decision into output for some front end.
pub trait Presenter {
    type Output;

    fn present(&self, decision: &Decision) -> Self::Output;
}

/// Plain-text rendering for terminals.
#[derive(Debug, Clone, Copy)]
pub struct TextPresenter {
    pub show_unlocked: bool,
}

impl Default for TextPresenter {
    fn default() -> Self {
        Self {
            show_unlocked: true,
        }
    }
}

impl Presenter for TextPresenter {
    type Output = String;

    fn present(&self, decision: &Decision) -> String {
        let mut out = String::new();
        if decision.come_back_tomorrow() {
            let _ = writeln!(out, "{COME_BACK_TOMORROW}\n");
        }

        match decision.quote() {
            Some(quote) => {
                let _ = writeln!(out, "Today's Quote... (#{})", quote.id);
                let _ = writeln!(out, "{}", quote.message);
            }
            None => {
                let _ = writeln!(out, "{}", completion_message(decision.total()));
            }
        }

        if self.show_unlocked && !decision.unlocked().is_empty() {
            out.push('\n');
            out.push_str(&render_unlocked(decision.unlocked(), ListFormat::Text));
        }
        out
    }
}

/// JSON rendering of the full decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPresenter {
    pub pretty: bool,
}

impl Presenter for JsonPresenter {
    type Output = Result<String, serde_json::Error>;

    fn present(&self, decision: &Decision) -> Self::Output {
        if self.pretty {
            serde_json::to_string_pretty(decision)
        } else {
            serde_json::to_string(decision)
        }
    }
}
