//! Reporter port implementation that streams stage results to the terminal.

use tracing::debug;

use kiln_core::application::ports::{Reporter, Severity};

use crate::output::OutputManager;

pub struct ConsoleReporter {
    output: OutputManager,
}

impl ConsoleReporter {
    pub fn new(output: OutputManager) -> Self {
        Self { output }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, message: &str, severity: Severity) {
        let written = match severity {
            Severity::Info => self.output.info(message),
            Severity::Success => self.output.success(message),
            Severity::Warning => self.output.warning(message),
            Severity::Error => self.output.error(message),
        };
        if let Err(e) = written {
            debug!(error = %e, "Could not write report line");
        }
    }
}
