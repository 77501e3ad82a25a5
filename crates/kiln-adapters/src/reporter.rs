//! Reporter adapters.

use std::sync::{Arc, Mutex};

use tracing::{error, info, warn};

use kiln_core::application::ports::{Reporter, Severity};

/// Forwards every message to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, message: &str, severity: Severity) {
        match severity {
            Severity::Info | Severity::Success => info!(%severity, "{message}"),
            Severity::Warning => warn!("{message}"),
            Severity::Error => error!("{message}"),
        }
    }
}

/// Keeps every message in memory, for tests and JSON output.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    messages: Arc<Mutex<Vec<(String, Severity)>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.messages()
            .iter()
            .filter(|(_, s)| *s == severity)
            .count()
    }
}

impl Reporter for CollectingReporter {
    fn report(&self, message: &str, severity: Severity) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((message.to_string(), severity));
        }
    }
}
