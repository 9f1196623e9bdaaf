//! Terminal output for CLI handlers.
//!
//! Human-readable lines with colored markers, or one JSON event per line
//! under `--json`. Under `--quiet` only warnings, errors and command results
//! are printed.

use std::fmt::Display;
use std::sync::OnceLock;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Output flags taken from the global CLI options.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputConfig {
    pub json: bool,
    pub quiet: bool,
}

impl OutputConfig {
    #[must_use]
    pub const fn new(json: bool, quiet: bool) -> Self {
        Self { json, quiet }
    }
}

static CONFIG: OnceLock<OutputConfig> = OnceLock::new();

/// Set the output flags. Only the first call of a process takes effect.
pub fn configure(config: OutputConfig) {
    let _ = CONFIG.set(config);
}

fn config() -> OutputConfig {
    CONFIG.get().copied().unwrap_or_default()
}

#[must_use]
pub fn is_json() -> bool {
    config().json
}

/// One line of `--json` progress output.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Event<'a> {
    Session {
        version: &'a str,
        network: &'a str,
        chain_id: u64,
    },
    Stage {
        title: &'a str,
    },
    Value {
        label: &'a str,
        value: String,
    },
    Done {
        message: &'a str,
    },
    Warning {
        message: &'a str,
    },
    Error {
        message: &'a str,
    },
    Note {
        message: &'a str,
    },
    Hint {
        message: &'a str,
    },
    Table {
        rows: Vec<&'a str>,
    },
}

impl Event<'_> {
    fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Print `event` as JSON, or run `render` for humans unless quiet.
fn emit(event: &Event<'_>, essential: bool, render: impl FnOnce()) {
    let config = config();
    if config.json {
        println!("{}", event.encode());
    } else if essential || !config.quiet {
        render();
    }
}

/// Print the session header: tool version and target network.
pub fn header(version: &str, network: &str, chain_id: u64) {
    let event = Event::Session {
        version,
        network,
        chain_id,
    };
    emit(&event, false, || {
        println!(
            "{} {} {}",
            "lpforge".bold(),
            version.dimmed(),
            format!("({network}, chain {chain_id})").dimmed()
        );
        println!();
    });
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    let value = value.to_string();
    emit(
        &Event::Value {
            label,
            value: value.clone(),
        },
        false,
        || println!("  {:<14} {}", label.dimmed(), value),
    );
}

pub fn success(message: &str) {
    emit(&Event::Done { message }, false, || {
        println!("  {} {}", "✓".green(), message);
    });
}

pub fn warning(message: &str) {
    emit(&Event::Warning { message }, true, || {
        println!("  {} {}", "⚠".yellow(), message);
    });
}

/// Print an error to stderr, in either mode.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", Event::Error { message }.encode());
    } else {
        eprintln!("  {} {}", "×".red(), message);
    }
}

/// Start a new stage of a command.
pub fn section(title: &str) {
    emit(&Event::Stage { title }, false, || {
        println!();
        println!("{}", title.bold());
    });
}

pub fn note(message: &str) {
    emit(&Event::Note { message }, false, || {
        println!("  {}", message.dimmed());
    });
}

/// Suggest a follow-up command.
pub fn hint(message: &str) {
    emit(&Event::Hint { message }, false, || {
        println!("  {}: {}", "hint".cyan().dimmed(), message.dimmed());
    });
}

/// Print a rendered table, indented.
pub fn table(rendered: &str) {
    let event = Event::Table {
        rows: rendered.lines().collect(),
    };
    emit(&event, false, || {
        for line in rendered.lines() {
            println!("  {line}");
        }
    });
}

/// Print the result object of a command in `--json` mode.
pub fn result(value: serde_json::Value) {
    println!("{value}");
}

const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Spinner shown while a chain round-trip is in flight.
pub struct Progress {
    bar: ProgressBar,
}

/// Start a spinner, hidden under `--json` and `--quiet`.
pub fn progress(message: &str) -> Progress {
    let config = config();
    let bar = if config.json || config.quiet {
        ProgressBar::hidden()
    } else {
        let style = ProgressStyle::default_spinner()
            .tick_strings(SPINNER_TICKS)
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let bar = ProgressBar::new_spinner().with_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    };
    bar.set_message(message.to_string());
    Progress { bar }
}

impl Progress {
    pub fn succeed(&self, message: &str) {
        if self.bar.is_hidden() {
            self.bar.finish_and_clear();
        } else {
            self.bar
                .finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    pub fn fail(&self, message: &str) {
        if self.bar.is_hidden() {
            self.bar.finish_and_clear();
        } else {
            self.bar
                .finish_with_message(format!("{} {}", "×".red(), message));
        }
    }
}

/// Color of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Good,
    Bad,
    Faint,
}

/// Color `value` for a table cell. Plain under `--json`.
pub fn tint(value: impl Display, tone: Tone) -> String {
    let value = value.to_string();
    if is_json() {
        return value;
    }
    match tone {
        Tone::Good => value.green().to_string(),
        Tone::Bad => value.red().to_string(),
        Tone::Faint => value.dimmed().to_string(),
    }
}
