// gabarit-core/src/domain/report.rs

// Explicit result accumulator threaded through a run and returned, instead
// of counters mutated on a long-lived instance. Configuration errors abort
// before any mutation; everything else lands here and is printed at the end.

use crate::domain::reconcile::Finding;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningKind {
    /// Constraint parameters did not match the shape its type expects.
    ShapeMismatch,
    /// An individual domain/value/binding failed to apply; the run went on.
    PartialApplication,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunWarning {
    pub kind: WarningKind,
    pub scope: String,
    pub message: String,
}

/// An attribute no classifier entry matched. Data for triage, not an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnvalidatedAttribute {
    pub class: String,
    pub attribute: String,
}

#[derive(Debug, Default, Serialize)]
pub struct RunReport {
    pub generated_at: Option<String>,

    // Geodatabase-mutation target
    pub domains_created: usize,
    pub domains_reused: usize,
    pub values_added: usize,
    pub bindings_applied: usize,
    pub domains_destroyed: usize,

    // SQL-registry target
    pub statements: Vec<String>,

    // Accumulated conditions
    pub warnings: Vec<RunWarning>,
    pub unvalidated: Vec<UnvalidatedAttribute>,
    pub findings: Vec<Finding>,
}

impl RunReport {
    pub fn new() -> Self {
        Self { generated_at: Some(chrono::Utc::now().to_rfc3339()), ..Self::default() }
    }

    pub fn warn(&mut self, kind: WarningKind, scope: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(RunWarning { kind, scope: scope.into(), message: message.into() });
    }

    pub fn notice_unvalidated(&mut self, class: impl Into<String>, attribute: impl Into<String>) {
        let notice = UnvalidatedAttribute { class: class.into(), attribute: attribute.into() };
        if !self.unvalidated.contains(&notice) {
            self.unvalidated.push(notice);
        }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// One-paragraph operator summary printed at end of run.
    pub fn summary(&self) -> String {
        format!(
            "{} domain(s) created, {} reused, {} coded value(s), {} binding(s), {} statement(s) emitted, {} finding(s), {} warning(s), {} unvalidated attribute(s)",
            self.domains_created,
            self.domains_reused,
            self.values_added,
            self.bindings_applied,
            self.statements.len(),
            self.findings.len(),
            self.warnings.len(),
            self.unvalidated.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unvalidated_notices_are_deduplicated() {
        let mut report = RunReport::default();
        report.notice_unvalidated("LAKES", "SHORELINE_WATER_LEVEL");
        report.notice_unvalidated("LAKES", "SHORELINE_WATER_LEVEL");
        assert_eq!(report.unvalidated.len(), 1);
    }

    #[test]
    fn test_summary_counts() {
        let mut report = RunReport::default();
        report.domains_created = 3;
        report.values_added = 12;
        report.warn(WarningKind::PartialApplication, "LAKES.DEPTH", "field missing");
        let summary = report.summary();
        assert!(summary.contains("3 domain(s) created"));
        assert!(summary.contains("12 coded value(s)"));
        assert!(summary.contains("1 warning(s)"));
        assert!(report.has_warnings());
    }
}
