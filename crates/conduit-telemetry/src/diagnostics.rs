//! Diagnostic escalation.
//!
//! A component must never finish "successfully" after something downstream
//! complained about its data. [`Diagnostics`] is the policy object that turns
//! such complaints into hard failures:
//!
//! - Code that detects a recoverable problem builds a [`Diagnostic`] (usually
//!   via the [`diagnostic!`](crate::diagnostic) macro) and passes it to
//!   [`Diagnostics::raise`]. Severities excluded by the [`ReportingMask`] are
//!   swallowed; everything else comes back as [`DiagnosticEscalated`].
//! - Libraries that only know how to log are covered by [`EscalationLayer`]:
//!   a `tracing` layer that records the first `WARN`/`ERROR` event. The
//!   application shell calls [`Diagnostics::check`] between steps and aborts
//!   if anything was recorded.
//!
//! The policy is a plain value owned by the shell; nothing here mutates
//! process-wide state.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber, trace};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;

/// Event field that exempts a `tracing` event from escalation when set to
/// `false` (e.g. `tracing::error!(escalate = false, "...")`).
pub const ESCALATE_FIELD: &str = "escalate";

/// Severity of a runtime diagnostic, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational notice about questionable input.
    Notice,
    /// Use of a deprecated feature.
    Deprecated,
    /// Recoverable problem that may hide data corruption.
    Warning,
    /// Non-fatal error reported by a library.
    Error,
}

impl Severity {
    const fn bit(self) -> u8 {
        match self {
            Self::Notice => 0b0001,
            Self::Deprecated => 0b0010,
            Self::Warning => 0b0100,
            Self::Error => 0b1000,
        }
    }

    /// Map a `tracing` level to a severity. Levels below `WARN` are not
    /// diagnostics.
    #[must_use]
    pub fn from_level(level: &Level) -> Option<Self> {
        if *level == Level::ERROR {
            Some(Self::Error)
        } else if *level == Level::WARN {
            Some(Self::Warning)
        } else {
            None
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Notice => write!(f, "notice"),
            Self::Deprecated => write!(f, "deprecated"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// The set of severities that escalate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReportingMask(u8);

impl ReportingMask {
    /// Every severity escalates.
    pub const ALL: Self = Self(0b1111);
    /// Nothing escalates.
    pub const NONE: Self = Self(0);

    /// Include `severity` in the mask.
    #[must_use]
    pub const fn with(self, severity: Severity) -> Self {
        Self(self.0 | severity.bit())
    }

    /// Exclude `severity` from the mask.
    #[must_use]
    pub const fn without(self, severity: Severity) -> Self {
        Self(self.0 & !severity.bit())
    }

    /// Whether `severity` escalates under this mask.
    #[must_use]
    pub const fn includes(self, severity: Severity) -> bool {
        self.0 & severity.bit() != 0
    }
}

impl Default for ReportingMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// A runtime diagnostic with its source location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Human-readable description.
    pub message: String,
    /// Source file that raised it.
    pub file: String,
    /// Line within `file`.
    pub line: u32,
}

impl Diagnostic {
    /// Create a diagnostic. Prefer the [`diagnostic!`](crate::diagnostic)
    /// macro, which fills in the location.
    #[must_use]
    pub fn new(
        severity: Severity,
        message: impl Into<String>,
        file: impl Into<String>,
        line: u32,
    ) -> Self {
        Self {
            severity,
            message: message.into(),
            file: file.into(),
            line,
        }
    }
}

/// Build a [`Diagnostic`] at the call site.
///
/// ```
/// use conduit_telemetry::{Severity, diagnostic};
///
/// let d = diagnostic!(Severity::Warning, "column {} truncated", "amount");
/// assert_eq!(d.message, "column amount truncated");
/// assert!(d.line > 0);
/// ```
#[macro_export]
macro_rules! diagnostic {
    ($severity:expr, $($arg:tt)+) => {
        $crate::Diagnostic::new($severity, format!($($arg)+), file!(), line!())
    };
}

/// A diagnostic that was not suppressed and now aborts the current
/// operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{severity}: {message} in {file}:{line}")]
pub struct DiagnosticEscalated {
    /// Severity of the original diagnostic.
    pub severity: Severity,
    /// Original message.
    pub message: String,
    /// Originating source file.
    pub file: String,
    /// Originating line.
    pub line: u32,
}

impl From<Diagnostic> for DiagnosticEscalated {
    fn from(d: Diagnostic) -> Self {
        Self {
            severity: d.severity,
            message: d.message,
            file: d.file,
            line: d.line,
        }
    }
}

type Slot = Arc<Mutex<Option<Diagnostic>>>;

/// Escalation policy held by the application shell for the whole run.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    mask: ReportingMask,
    escalated: Slot,
}

impl Diagnostics {
    /// Create the policy that escalates every severity.
    #[must_use]
    pub fn install() -> Self {
        Self::with_mask(ReportingMask::ALL)
    }

    /// Create a policy with an explicit reporting mask.
    #[must_use]
    pub fn with_mask(mask: ReportingMask) -> Self {
        Self {
            mask,
            escalated: Arc::new(Mutex::new(None)),
        }
    }

    /// The active reporting mask.
    #[must_use]
    pub fn mask(&self) -> ReportingMask {
        self.mask
    }

    /// Apply the policy to a diagnostic.
    ///
    /// # Errors
    ///
    /// Returns [`DiagnosticEscalated`] unless the diagnostic's severity is
    /// excluded by the mask.
    pub fn raise(&self, diagnostic: Diagnostic) -> Result<(), DiagnosticEscalated> {
        if !self.mask.includes(diagnostic.severity) {
            trace!(
                severity = %diagnostic.severity,
                file = %diagnostic.file,
                line = diagnostic.line,
                "diagnostic suppressed by reporting mask"
            );
            return Ok(());
        }
        Err(diagnostic.into())
    }

    /// A `tracing` layer feeding this policy. Install it alongside the
    /// regular fmt layer.
    #[must_use]
    pub fn layer(&self) -> EscalationLayer {
        EscalationLayer {
            mask: self.mask,
            slot: Arc::clone(&self.escalated),
        }
    }

    /// Surface the first diagnostic recorded by the layer, if any.
    ///
    /// The record is sticky: once something escalated, every later check
    /// fails too.
    ///
    /// # Errors
    ///
    /// Returns the recorded diagnostic as [`DiagnosticEscalated`].
    pub fn check(&self) -> Result<(), DiagnosticEscalated> {
        let recorded = self
            .escalated
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match recorded {
            Some(d) => Err(d.into()),
            None => Ok(()),
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::install()
    }
}

/// `tracing` layer that records the first escalating event.
///
/// Never panics and never blocks the event; the failure is surfaced by
/// [`Diagnostics::check`].
#[derive(Debug, Clone)]
pub struct EscalationLayer {
    mask: ReportingMask,
    slot: Slot,
}

impl<S: Subscriber> Layer<S> for EscalationLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let Some(severity) = Severity::from_level(meta.level()) else {
            return;
        };
        if !self.mask.includes(severity) {
            return;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        if visitor.exempt {
            return;
        }

        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(Diagnostic::new(
                severity,
                visitor.message,
                meta.file().unwrap_or(meta.target()),
                meta.line().unwrap_or(0),
            ));
        }
    }
}

#[derive(Default)]
struct EventVisitor {
    message: String,
    exempt: bool,
}

impl Visit for EventVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            value.clone_into(&mut self.message);
        }
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == ESCALATE_FIELD && !value {
            self.exempt = true;
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}
