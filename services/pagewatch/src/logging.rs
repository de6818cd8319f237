//! Console logging setup
//!
//! Every line starts with a `DD/MM/YYYY HH:MM:SS` local timestamp; log
//! scrapers depend on that prefix.

use std::io::IsTerminal;

use chrono::{Local, NaiveDateTime};
use tracing::Level;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;

pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Timer that renders local wall-clock time in [`TIMESTAMP_FORMAT`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleTimestamp;

impl FormatTime for ConsoleTimestamp {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", format_timestamp(&Local::now().naive_local()))
    }
}

pub fn format_timestamp(at: &NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Install the global console subscriber
///
/// Colors are only used on a terminal so piped output starts with the bare
/// timestamp.
pub fn init(level: Level) {
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_timer(ConsoleTimestamp)
        .with_target(false)
        .with_ansi(std::io::stdout().is_terminal())
        .init();
}
