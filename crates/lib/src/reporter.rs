//! Diagnostic sinks.
//!
//! Composition never reads from a reporter; it only hands it messages about
//! problems it recovered from, so callers can surface every problem in one pass.

use tracing::{info, warn};

/// Write-only sink for diagnostics produced while composing environments.
pub trait Reporter: Send + Sync {
  /// A recoverable problem, e.g. an exported variable that failed to resolve.
  fn warn(&self, message: &str);

  /// Informational progress message.
  fn info(&self, message: &str) {
    let _ = message;
  }
}

/// Forwards diagnostics to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
  fn warn(&self, message: &str) {
    warn!("{message}");
  }

  fn info(&self, message: &str) {
    info!("{message}");
  }
}

/// Discards all diagnostics.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
  fn warn(&self, _message: &str) {}
}
