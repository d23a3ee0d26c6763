//! Rate-limited diagnostics for best-effort scoring.
//!
//! Alignment never aborts because a residue is missing from the score
//! model; the pair simply scores 0. Each such event is reported through a
//! [`Diagnostics`] channel owned by the caller. The first
//! [`DEFAULT_WARNING_LIMIT`] events are forwarded in detail, the next one
//! produces a single [`Diagnostic::UnknownSymbolsSuppressed`] notice, and
//! everything after that is counted but not forwarded.
//!
//! The default sink is [`LogSink`], which writes through the `log` facade.
//! Any `Fn(&Diagnostic) + Send + Sync` closure is also a sink.

use core::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Number of unknown-symbol events reported in detail before suppression.
pub const DEFAULT_WARNING_LIMIT: usize = 10;

/// A single diagnostic event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A symbol was not found in the score model's alphabet.
    UnknownSymbol {
        /// Printable form of the symbol (`'Q'`, `token 27`, ...).
        symbol: String,
    },
    /// The detailed-warning budget is exhausted; further events are silent.
    UnknownSymbolsSuppressed,
    /// A predecessor pointer did not describe a legal step.
    TracebackInconsistency {
        /// Cell `(i, j)` holding the bad pointer.
        cell: (usize, usize),
        /// What was wrong with it.
        detail: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::UnknownSymbol { symbol } => {
                write!(f, "residue {symbol} not found in matrix")
            }
            Diagnostic::UnknownSymbolsSuppressed => {
                write!(f, "more residues not found in matrix...")
            }
            Diagnostic::TracebackInconsistency { cell, detail } => {
                write!(f, "internal traceback error at ({}, {}): {detail}", cell.0, cell.1)
            }
        }
    }
}

/// Receiver for diagnostic events.
pub trait DiagnosticSink: Send + Sync {
    /// Handle one event.
    fn report(&self, diagnostic: &Diagnostic);
}

impl<F> DiagnosticSink for F
where
    F: Fn(&Diagnostic) + Send + Sync,
{
    fn report(&self, diagnostic: &Diagnostic) {
        self(diagnostic)
    }
}

/// Sink that forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic {
            Diagnostic::TracebackInconsistency { .. } => log::error!("{diagnostic}"),
            _ => log::warn!("{diagnostic}"),
        }
    }
}

/// Rate-limited diagnostic channel.
///
/// Counters are atomic, so one `Diagnostics` can be shared by concurrent
/// alignments; the limit then applies to their combined events.
pub struct Diagnostics {
    sink: Box<dyn DiagnosticSink>,
    limit: usize,
    unknown_events: AtomicUsize,
}

impl Diagnostics {
    /// Diagnostics forwarding to [`LogSink`] with the default limit.
    pub fn new() -> Self {
        Self::with_sink(LogSink)
    }

    /// Diagnostics forwarding to a custom sink.
    pub fn with_sink(sink: impl DiagnosticSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            limit: DEFAULT_WARNING_LIMIT,
            unknown_events: AtomicUsize::new(0),
        }
    }

    /// Change the number of events reported in detail.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Record one lookup that failed for the given symbols.
    ///
    /// A single lookup counts as one event even when both symbols are
    /// missing; each missing symbol is named while under the limit.
    pub fn unknown_symbols<I>(&self, symbols: I)
    where
        I: IntoIterator<Item = String>,
    {
        let seen = self.unknown_events.fetch_add(1, Ordering::Relaxed);
        if seen < self.limit {
            for symbol in symbols {
                self.sink.report(&Diagnostic::UnknownSymbol { symbol });
            }
        } else if seen == self.limit {
            self.sink.report(&Diagnostic::UnknownSymbolsSuppressed);
        }
    }

    /// Report a broken predecessor pointer. Never rate-limited.
    pub fn traceback_inconsistency(&self, cell: (usize, usize), detail: impl Into<String>) {
        self.sink.report(&Diagnostic::TracebackInconsistency {
            cell,
            detail: detail.into(),
        });
    }

    /// Total unknown-symbol events recorded, including suppressed ones.
    pub fn unknown_events(&self) -> usize {
        self.unknown_events.load(Ordering::Relaxed)
    }

    /// Restart the detailed-warning budget.
    pub fn reset(&self) {
        self.unknown_events.store(0, Ordering::Relaxed);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("limit", &self.limit)
            .field("unknown_events", &self.unknown_events())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording() -> (Diagnostics, Arc<Mutex<Vec<Diagnostic>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink_events = Arc::clone(&events);
        let diagnostics = Diagnostics::with_sink(move |d: &Diagnostic| {
            sink_events.lock().unwrap().push(d.clone());
        });
        (diagnostics, events)
    }

    #[test]
    fn first_ten_events_are_detailed() {
        let (diagnostics, events) = recording();
        for i in 0..10 {
            diagnostics.unknown_symbols([format!("token {i}")]);
        }
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 10);
        assert_eq!(
            events[3],
            Diagnostic::UnknownSymbol {
                symbol: "token 3".into()
            }
        );
    }

    #[test]
    fn eleventh_event_is_a_single_notice_then_silence() {
        let (diagnostics, events) = recording();
        for _ in 0..25 {
            diagnostics.unknown_symbols(["'J'".to_string()]);
        }
        let events = events.lock().unwrap();
        assert_eq!(events.len(), 11);
        assert_eq!(events[10], Diagnostic::UnknownSymbolsSuppressed);
        assert_eq!(diagnostics.unknown_events(), 25);
    }

    #[test]
    fn both_symbols_missing_is_one_event() {
        let (diagnostics, events) = recording();
        diagnostics.unknown_symbols(["'J'".to_string(), "'O'".to_string()]);
        assert_eq!(diagnostics.unknown_events(), 1);
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn custom_limit_and_reset() {
        let (diagnostics, events) = recording();
        let diagnostics = diagnostics.with_limit(2);
        for _ in 0..4 {
            diagnostics.unknown_symbols(["'U'".to_string()]);
        }
        assert_eq!(events.lock().unwrap().len(), 3);
        diagnostics.reset();
        diagnostics.unknown_symbols(["'U'".to_string()]);
        assert_eq!(events.lock().unwrap().len(), 4);
        assert_eq!(diagnostics.unknown_events(), 1);
    }

    #[test]
    fn traceback_reports_bypass_the_limit() {
        let (diagnostics, events) = recording();
        let diagnostics = diagnostics.with_limit(0);
        diagnostics.traceback_inconsistency((2, 3), "pointer unset");
        diagnostics.traceback_inconsistency((2, 3), "pointer unset");
        assert_eq!(events.lock().unwrap().len(), 2);
    }

    #[test]
    fn log_sink_accepts_every_variant() {
        let _ = env_logger::builder().is_test(true).try_init();
        let diagnostics = Diagnostics::new();
        diagnostics.unknown_symbols(["'B'".to_string()]);
        diagnostics.traceback_inconsistency((0, 0), "pointer unset");
        assert_eq!(diagnostics.unknown_events(), 1);
    }

    #[test]
    fn display_messages() {
        let d = Diagnostic::UnknownSymbol {
            symbol: "'J'".into(),
        };
        assert_eq!(d.to_string(), "residue 'J' not found in matrix");
        let d = Diagnostic::TracebackInconsistency {
            cell: (1, 2),
            detail: "pointer unset".into(),
        };
        assert_eq!(d.to_string(), "internal traceback error at (1, 2): pointer unset");
    }
}
