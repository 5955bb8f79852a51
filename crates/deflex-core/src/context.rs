//! Per-conversion state threaded through every pass.
//!
//! One `BuildContext` is created per `convert` call, so independent
//! conversions can run concurrently without sharing anything mutable.

use crate::config::BuildConfig;
use crate::id::DesignId;
use crate::model::Bounds;

// ─── Diagnostic types ────────────────────────────────────────────────────

/// Severity of a non-fatal finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Output differs from the design (best-effort substitution).
    Warning,
    /// Informational, output is faithful.
    Info,
}

/// A degradation or notable decision made during conversion.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// The design node concerned, if it is an original node.
    pub node: Option<DesignId>,
    /// Human-readable message.
    pub message: String,
    pub severity: Severity,
    /// Short rule identifier (e.g. "gradient-angle", "multi-fill").
    pub rule: &'static str,
}

// ─── Context ─────────────────────────────────────────────────────────────

pub struct BuildContext<'a> {
    pub config: &'a BuildConfig,
    /// Bounds of the page root; every node is clipped against it.
    pub page: Bounds,
    counter: u32,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> BuildContext<'a> {
    pub fn new(config: &'a BuildConfig) -> Self {
        Self {
            config,
            page: Bounds::default(),
            counter: 0,
            diagnostics: Vec::new(),
        }
    }

    /// Next value of the monotonically increasing node-creation counter.
    pub fn next_index(&mut self) -> u32 {
        let n = self.counter;
        self.counter += 1;
        n
    }

    pub fn warn(&mut self, node: Option<&DesignId>, rule: &'static str, message: String) {
        log::warn!("[{rule}] {}: {message}", describe(node));
        self.diagnostics.push(Diagnostic {
            node: node.cloned(),
            message,
            severity: Severity::Warning,
            rule,
        });
    }

    pub fn info(&mut self, node: Option<&DesignId>, rule: &'static str, message: String) {
        log::debug!("[{rule}] {}: {message}", describe(node));
        self.diagnostics.push(Diagnostic {
            node: node.cloned(),
            message,
            severity: Severity::Info,
            rule,
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

fn describe(node: Option<&DesignId>) -> String {
    match node {
        Some(id) => format!("#{id}"),
        None => "<generated>".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_is_monotonic_per_context() {
        let config = BuildConfig::default();
        let mut a = BuildContext::new(&config);
        let mut b = BuildContext::new(&config);
        assert_eq!(a.next_index(), 0);
        assert_eq!(a.next_index(), 1);
        // A fresh context starts over; nothing leaks between conversions.
        assert_eq!(b.next_index(), 0);
    }

    #[test]
    fn warnings_are_collected() {
        let config = BuildConfig::default();
        let mut ctx = BuildContext::new(&config);
        ctx.warn(Some(&DesignId::new("n1")), "multi-fill", "extra fills dropped".into());
        ctx.info(None, "flex-flip", "row chosen".into());
        assert_eq!(ctx.diagnostics().len(), 2);
        assert_eq!(ctx.diagnostics()[0].severity, Severity::Warning);
        assert_eq!(ctx.diagnostics()[0].rule, "multi-fill");
    }
}
