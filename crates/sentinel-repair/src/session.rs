//! Repair session: the explicit state holder behind the orchestrator.
//!
//! Holds the code buffer, the latest analysis snapshot, the applied-fix set
//! and the repair history. Every mutation goes through a method here; the
//! orchestrator only adds the async edges (delays, the performance suite).

use crate::metrics::{
    self, derive_metrics, filter_findings, improvement_line, AnalysisTab, DerivedMetrics,
    OptimizationSummary, SummaryMetrics,
};
use crate::test_runner::TestRunSummary;
use chrono::{DateTime, Utc};
use sentinel_analyzers::{
    detect_language, ComplexityProfile, CoverageReport, GeneratedTest, Language, MemoryProfile,
    PerformanceReport, QualityMetrics, SecurityIssue,
};
use sentinel_core::{Finding, SentinelError, StageReport};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Analyzing,
    Analyzed,
    Repairing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub issues_fixed: usize,
}

/// Everything one analysis run produced
#[derive(Debug, Clone, Default)]
pub struct AnalysisSnapshot {
    pub findings: Vec<Finding>,
    pub security_issues: Vec<SecurityIssue>,
    pub quality: QualityMetrics,
    pub memory: MemoryProfile,
    pub coverage: CoverageReport,
    pub test_cases: Vec<GeneratedTest>,
    pub complexity: ComplexityProfile,
    pub language_notes: Vec<String>,
    pub stages: Vec<StageReport>,
    /// Set when the run fell back to synthetic results
    pub notice: Option<String>,
}

/// Proof that an analysis was started; only the newest ticket commits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTicket {
    pub generation: u64,
    pub code: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    /// The snippet was found and replaced
    Applied,
    /// Marked applied, but the snippet was not in the buffer
    SnippetMissing,
    AlreadyApplied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SmartRepairOutcome {
    pub fixed: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
pub struct RepairSession {
    original_code: String,
    current_code: String,
    state: SessionState,
    language: Language,
    generation: u64,
    analysis: Option<AnalysisSnapshot>,
    applied: Vec<String>,
    history: Vec<RepairEntry>,
    summary: Option<OptimizationSummary>,
    performance: Option<PerformanceReport>,
    test_run: Option<TestRunSummary>,
    notice: Option<String>,
}

impl RepairSession {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn original_code(&self) -> &str {
        &self.original_code
    }

    pub fn current_code(&self) -> &str {
        &self.current_code
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn analysis(&self) -> Option<&AnalysisSnapshot> {
        self.analysis.as_ref()
    }

    pub fn findings(&self) -> &[Finding] {
        self.analysis.as_ref().map(|a| a.findings.as_slice()).unwrap_or(&[])
    }

    pub fn applied(&self) -> &[String] {
        &self.applied
    }

    pub fn is_applied(&self, id: &str) -> bool {
        self.applied.iter().any(|a| a == id)
    }

    pub fn history(&self) -> &[RepairEntry] {
        &self.history
    }

    pub fn summary(&self) -> Option<&OptimizationSummary> {
        self.summary.as_ref()
    }

    pub fn performance(&self) -> Option<&PerformanceReport> {
        self.performance.as_ref()
    }

    pub fn test_run(&self) -> Option<&TestRunSummary> {
        self.test_run.as_ref()
    }

    /// Latest user-facing status message
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    // ------------------------------------------------------------------------
    // Buffer
    // ------------------------------------------------------------------------

    /// Replace the buffer. The first non-empty edit becomes the original.
    pub fn edit_code(&mut self, code: impl Into<String>) {
        let code = code.into();
        if self.original_code.is_empty() {
            self.original_code = code.clone();
        }
        self.language = detect_language(&code);
        self.current_code = code;
    }

    // ------------------------------------------------------------------------
    // Analysis lifecycle
    // ------------------------------------------------------------------------

    /// Start a run over the current buffer. A newer run supersedes any
    /// run still in flight.
    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket, SentinelError> {
        if self.current_code.trim().is_empty() {
            return Err(SentinelError::InvalidInput("no code to analyze".to_string()));
        }

        self.generation += 1;
        self.state = SessionState::Analyzing;
        self.analysis = None;
        self.applied.clear();
        self.performance = None;
        self.notice = None;

        debug!(generation = self.generation, "analysis started");
        Ok(AnalysisTicket {
            generation: self.generation,
            code: self.current_code.clone(),
        })
    }

    /// Store a finished run. Returns false when a newer run has started.
    pub fn commit_analysis(&mut self, ticket: AnalysisTicket, snapshot: AnalysisSnapshot) -> bool {
        if ticket.generation != self.generation {
            warn!(
                stale = ticket.generation,
                latest = self.generation,
                "discarding superseded analysis"
            );
            return false;
        }

        self.applied
            .retain(|id| snapshot.findings.iter().any(|f| &f.id == id));
        self.notice = snapshot.notice.clone();
        self.state = SessionState::Analyzed;

        info!(
            generation = ticket.generation,
            findings = snapshot.findings.len(),
            security = snapshot.security_issues.len(),
            "analysis committed"
        );
        self.analysis = Some(snapshot);
        true
    }

    pub fn set_performance(&mut self, report: PerformanceReport) {
        self.notice = Some(if report.is_fallback() {
            "Performance tests completed with demo data".to_string()
        } else {
            format!("Performance testing completed! Analyzed {} metrics.", report.results.len())
        });
        self.performance = Some(report);
    }

    pub fn set_test_run(&mut self, summary: TestRunSummary) {
        self.test_run = Some(summary);
    }

    // ------------------------------------------------------------------------
    // Repairs
    // ------------------------------------------------------------------------

    fn analyzed(&self) -> Result<&AnalysisSnapshot, SentinelError> {
        match (&self.analysis, self.state) {
            (Some(analysis), SessionState::Analyzed) => Ok(analysis),
            _ => Err(SentinelError::State(format!(
                "no committed analysis (state: {:?})",
                self.state
            ))),
        }
    }

    /// Literal single-occurrence replacement; false when the snippet is
    /// empty or absent
    fn substitute(&mut self, snippet: &str, fix: &str) -> bool {
        if snippet.is_empty() || !self.current_code.contains(snippet) {
            return false;
        }
        self.current_code = self.current_code.replacen(snippet, fix, 1);
        true
    }

    fn mark_applied(&mut self, id: &str) {
        if !self.is_applied(id) {
            self.applied.push(id.to_string());
        }
    }

    fn record(&mut self, action: impl Into<String>, issues_fixed: usize) {
        self.history.push(RepairEntry {
            timestamp: Utc::now(),
            action: action.into(),
            issues_fixed,
        });
    }

    pub fn apply_fix(&mut self, id: &str) -> Result<FixOutcome, SentinelError> {
        let finding = self
            .analyzed()?
            .findings
            .iter()
            .find(|f| f.id == id)
            .cloned()
            .ok_or_else(|| SentinelError::NotFound(format!("finding {}", id)))?;

        if self.is_applied(id) {
            return Ok(FixOutcome::AlreadyApplied);
        }

        self.state = SessionState::Repairing;
        let replaced = self.substitute(&finding.code_snippet, &finding.suggested_fix);
        if !replaced {
            warn!(finding = id, "snippet not found, fix left the buffer unchanged");
        }
        self.mark_applied(id);
        self.record(format!("Fixed {} issue", finding.kind), 1);
        self.refresh_summary();
        self.state = SessionState::Analyzed;

        Ok(if replaced {
            FixOutcome::Applied
        } else {
            FixOutcome::SnippetMissing
        })
    }

    /// Apply every remaining fix in list order. Returns how many were attempted.
    pub fn apply_all(&mut self) -> Result<usize, SentinelError> {
        let pending: Vec<Finding> = self
            .analyzed()?
            .findings
            .iter()
            .filter(|f| !self.is_applied(&f.id))
            .cloned()
            .collect();

        self.state = SessionState::Repairing;
        for finding in &pending {
            if !self.substitute(&finding.code_snippet, &finding.suggested_fix) {
                debug!(finding = %finding.id, "snippet not found during apply-all");
            }
            self.mark_applied(&finding.id);
        }
        self.record("Applied all fixes", pending.len());
        self.refresh_summary();
        self.state = SessionState::Analyzed;

        Ok(pending.len())
    }

    /// Apply remaining fixes by severity, then by descending confidence.
    /// Findings whose snippet is gone are skipped, not fatal.
    pub fn smart_repair(&mut self) -> Result<SmartRepairOutcome, SentinelError> {
        let analysis = self.analyzed()?;
        let mut pending: Vec<Finding> = analysis
            .findings
            .iter()
            .filter(|f| !self.is_applied(&f.id))
            .cloned()
            .collect();
        let security_found = !analysis.security_issues.is_empty();
        let maintainability = analysis.quality.maintainability_index;

        if pending.is_empty() {
            self.notice = Some("No issues left to repair!".to_string());
            return Ok(SmartRepairOutcome::default());
        }

        pending.sort_by(|a, b| {
            a.severity
                .rank()
                .cmp(&b.severity.rank())
                .then(b.confidence.cmp(&a.confidence))
        });

        self.state = SessionState::Repairing;
        let mut outcome = SmartRepairOutcome::default();
        let mut improvements = Vec::new();

        for finding in &pending {
            if self.substitute(&finding.code_snippet, &finding.suggested_fix) {
                outcome.fixed += 1;
                improvements.push(improvement_line(finding));
            } else {
                outcome.skipped += 1;
                warn!(finding = %finding.id, "smart repair skipped a fix");
            }
            self.mark_applied(&finding.id);
        }

        self.record("Smart repair completed", outcome.fixed);
        self.summary = Some(OptimizationSummary {
            improvements,
            metrics: SummaryMetrics {
                issues_fixed: outcome.fixed,
                performance_improvement: metrics::performance_improvement(self.findings(), outcome.fixed),
                security_improvement: if security_found {
                    "Security vulnerabilities patched"
                } else {
                    "No security issues found"
                }
                .to_string(),
                quality_improvement: format!(
                    "Maintainability improved to {}/100",
                    (maintainability + 10).min(100)
                ),
            },
        });
        self.notice = Some(if outcome.fixed > 0 {
            format!("Smart repair completed! Fixed {} issues.", outcome.fixed)
        } else {
            "No issues could be automatically fixed.".to_string()
        });
        self.state = SessionState::Analyzed;

        info!(fixed = outcome.fixed, skipped = outcome.skipped, "smart repair finished");
        Ok(outcome)
    }

    fn refresh_summary(&mut self) {
        let Some(analysis) = self.analysis.as_ref() else {
            return;
        };

        let improvements = analysis
            .findings
            .iter()
            .filter(|f| self.is_applied(&f.id))
            .map(improvement_line)
            .collect();

        self.summary = Some(OptimizationSummary {
            improvements,
            metrics: SummaryMetrics {
                issues_fixed: self.applied.len(),
                performance_improvement: metrics::performance_improvement(&analysis.findings, self.applied.len()),
                security_improvement: if analysis.security_issues.is_empty() {
                    "No security issues"
                } else {
                    "Security vulnerabilities addressed"
                }
                .to_string(),
                quality_improvement: "Code quality enhanced".to_string(),
            },
        });
    }

    /// Restore the original buffer and drop everything derived from it
    pub fn reset(&mut self) {
        self.current_code = self.original_code.clone();
        self.language = detect_language(&self.current_code);
        self.applied.clear();
        self.history.clear();
        self.analysis = None;
        self.summary = None;
        self.performance = None;
        self.state = SessionState::Idle;
        self.notice = Some("Reset to original code".to_string());
    }

    // ------------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------------

    pub fn metrics(&self) -> Option<DerivedMetrics> {
        self.analysis.as_ref().map(|a| {
            derive_metrics(
                &a.findings,
                a.security_issues.len(),
                Some(&a.coverage),
                Some(&a.quality),
                self.applied.len(),
            )
        })
    }

    pub fn filtered(&self, tab: AnalysisTab) -> Vec<&Finding> {
        filter_findings(self.findings(), tab)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{FindingKind, Severity};

    fn finding(id: &str, severity: Severity, confidence: u8, snippet: &str, fix: &str) -> Finding {
        Finding {
            id: id.to_string(),
            kind: FindingKind::Performance,
            severity,
            message: format!("issue {}", id),
            line: 1,
            fix: String::new(),
            code_snippet: snippet.to_string(),
            suggested_fix: fix.to_string(),
            confidence,
            explanation: String::new(),
            time_complexity: None,
            space_complexity: None,
            recommendation: None,
        }
    }

    fn analyzed_session(code: &str, findings: Vec<Finding>) -> RepairSession {
        let mut session = RepairSession::new();
        session.edit_code(code);
        let ticket = session.begin_analysis().unwrap();
        assert!(session.commit_analysis(
            ticket,
            AnalysisSnapshot {
                findings,
                ..Default::default()
            }
        ));
        session
    }

    #[test]
    fn test_original_captured_on_first_edit() {
        let mut session = RepairSession::new();
        session.edit_code("first");
        session.edit_code("second");
        assert_eq!(session.original_code(), "first");
        assert_eq!(session.current_code(), "second");
    }

    #[test]
    fn test_blank_buffer_cannot_be_analyzed() {
        let mut session = RepairSession::new();
        session.edit_code("   ");
        assert!(matches!(session.begin_analysis(), Err(SentinelError::InvalidInput(_))));
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_stale_analysis_is_discarded() {
        let mut session = RepairSession::new();
        session.edit_code("let a = 1;");
        let first = session.begin_analysis().unwrap();
        let second = session.begin_analysis().unwrap();

        let newest = AnalysisSnapshot {
            findings: vec![finding("new", Severity::Low, 50, "a", "b")],
            ..Default::default()
        };
        assert!(session.commit_analysis(second, newest));
        assert!(!session.commit_analysis(first, AnalysisSnapshot::default()));
        assert_eq!(session.findings()[0].id, "new");
    }

    #[test]
    fn test_apply_fix_is_idempotent() {
        let mut session = analyzed_session("a b a", vec![finding("x", Severity::High, 90, "a", "z")]);

        assert_eq!(session.apply_fix("x").unwrap(), FixOutcome::Applied);
        assert_eq!(session.current_code(), "z b a");
        assert_eq!(session.apply_fix("x").unwrap(), FixOutcome::AlreadyApplied);
        assert_eq!(session.current_code(), "z b a");
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.history()[0].action, "Fixed performance issue");
    }

    #[test]
    fn test_missing_snippet_is_a_no_op() {
        let mut session = analyzed_session("abc", vec![finding("x", Severity::High, 90, "zzz", "y")]);
        assert_eq!(session.apply_fix("x").unwrap(), FixOutcome::SnippetMissing);
        assert_eq!(session.current_code(), "abc");
        assert!(session.is_applied("x"));
    }

    #[test]
    fn test_apply_unknown_or_before_analysis() {
        let mut session = RepairSession::new();
        assert!(matches!(session.apply_fix("x"), Err(SentinelError::State(_))));

        let mut session = analyzed_session("abc", vec![]);
        assert!(matches!(session.apply_fix("nope"), Err(SentinelError::NotFound(_))));
    }

    #[test]
    fn test_smart_repair_order_and_skips() {
        // low-severity fix would destroy the snippet of the critical one if run first
        let findings = vec![
            finding("low", Severity::Low, 99, "alpha beta", "gone"),
            finding("crit", Severity::Critical, 10, "beta", "BETA"),
            finding("high-a", Severity::High, 70, "gamma", "GAMMA"),
            finding("high-b", Severity::High, 95, "missing", "x"),
        ];
        let mut session = analyzed_session("alpha beta gamma", findings);

        let outcome = session.smart_repair().unwrap();
        assert_eq!(outcome, SmartRepairOutcome { fixed: 2, skipped: 2 });
        assert_eq!(session.current_code(), "alpha BETA GAMMA");
        assert_eq!(session.applied(), &["crit", "high-b", "high-a", "low"]);

        let entry = session.history().last().unwrap();
        assert_eq!(entry.action, "Smart repair completed");
        assert_eq!(entry.issues_fixed, 2);

        assert_eq!(session.smart_repair().unwrap(), SmartRepairOutcome::default());
        assert_eq!(session.notice(), Some("No issues left to repair!"));
    }

    #[test]
    fn test_apply_all_then_reset() {
        let findings = vec![
            finding("a", Severity::Medium, 80, "one", "1"),
            finding("b", Severity::Medium, 80, "two", "2"),
        ];
        let mut session = analyzed_session("one two", findings);
        session.apply_fix("a").unwrap();

        assert_eq!(session.apply_all().unwrap(), 1);
        assert_eq!(session.current_code(), "1 2");
        assert_eq!(session.metrics().unwrap().remaining_issues, 0);

        let summary = session.summary().unwrap();
        assert_eq!(summary.metrics.issues_fixed, 2);
        assert_eq!(summary.metrics.performance_improvement, "~100% performance improvement");

        session.reset();
        assert_eq!(session.current_code(), "one two");
        assert!(session.applied().is_empty());
        assert!(session.history().is_empty());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_applied_ids_follow_latest_findings() {
        let mut session = analyzed_session("one", vec![finding("a", Severity::Low, 1, "one", "1")]);
        session.apply_fix("a").unwrap();

        let ticket = session.begin_analysis().unwrap();
        assert!(session.findings().is_empty());
        assert!(session.applied().is_empty());

        session.commit_analysis(
            ticket,
            AnalysisSnapshot {
                findings: vec![finding("b", Severity::Low, 1, "1", "one")],
                ..Default::default()
            },
        );
        assert!(session.applied().is_empty());
    }
}
