//! Single-slot toast presenter.
//!
//! At most one [`Notification`] is visible. Raising a new one replaces the
//! current one; each expires [`TOAST_DURATION`] after it was raised unless
//! dismissed earlier. Time is read from [`tokio::time::Instant`] so tests
//! can drive expiry with a paused clock.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// How long a toast stays visible.
pub const TOAST_DURATION: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Success => f.write_str("success"),
            Severity::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
    pub expires_at: Instant,
}

impl Notification {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct Toaster {
    current: Option<Notification>,
    raised: u64,
}

impl Toaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise a toast, superseding whatever is showing.
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.show_at(Instant::now(), message, severity);
    }

    pub fn show_at(&mut self, now: Instant, message: impl Into<String>, severity: Severity) {
        self.raised += 1;
        self.current = Some(Notification {
            message: message.into(),
            severity,
            expires_at: now + TOAST_DURATION,
        });
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Success);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.show(message, Severity::Error);
    }

    /// The visible toast at `now`, if any.
    pub fn current(&self, now: Instant) -> Option<&Notification> {
        self.current.as_ref().filter(|n| !n.is_expired(now))
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }

    /// Drop an expired toast. Returns `true` if one was removed.
    pub fn prune(&mut self, now: Instant) -> bool {
        if self.current.as_ref().is_some_and(|n| n.is_expired(now)) {
            self.current = None;
            return true;
        }
        false
    }

    /// Number of toasts raised since creation.
    pub fn raised_count(&self) -> u64 {
        self.raised
    }
}
