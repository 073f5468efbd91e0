//! Derived session metrics, the optimization summary and dashboard filters

use sentinel_analyzers::{CoverageReport, QualityMetrics};
use sentinel_core::{Finding, FindingKind};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub total_issues: usize,
    pub performance_issues: usize,
    pub security_issues: usize,
    pub algorithm_issues: usize,
    pub test_coverage: u8,
    pub quality_score: u32,
    /// Mean of the leading percentages of time-complexity improvements
    pub avg_improvement: u32,
    pub fixed_issues: usize,
    pub remaining_issues: usize,
}

pub fn derive_metrics(
    findings: &[Finding],
    security_issues: usize,
    coverage: Option<&CoverageReport>,
    quality: Option<&QualityMetrics>,
    applied: usize,
) -> DerivedMetrics {
    let complexity: Vec<&Finding> = findings
        .iter()
        .filter(|f| f.kind == FindingKind::TimeComplexity)
        .collect();

    let total_improvement: u32 = complexity
        .iter()
        .filter_map(|f| f.time_complexity.as_ref())
        .map(|shift| leading_number(&shift.improvement))
        .sum();

    let avg_improvement = if complexity.is_empty() {
        0
    } else {
        (total_improvement as f64 / complexity.len() as f64).round() as u32
    };

    DerivedMetrics {
        total_issues: findings.len(),
        performance_issues: findings.iter().filter(|f| f.kind.is_performance()).count(),
        security_issues,
        algorithm_issues: findings.iter().filter(|f| f.kind == FindingKind::Algorithm).count(),
        test_coverage: coverage.map(|c| c.line_coverage).unwrap_or(0),
        quality_score: quality.map(|q| q.maintainability_index).unwrap_or(0),
        avg_improvement,
        fixed_issues: applied,
        remaining_issues: findings.len().saturating_sub(applied),
    }
}

/// Leading decimal digits of `text`, 0 when there are none
fn leading_number(text: &str) -> u32 {
    let digits: String = text
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}

// ============================================================================
// OPTIMIZATION SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub issues_fixed: usize,
    pub performance_improvement: String,
    pub security_improvement: String,
    pub quality_improvement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizationSummary {
    pub improvements: Vec<String>,
    pub metrics: SummaryMetrics,
}

/// `~P% performance improvement`, P = min(100, fixed / performance findings)
pub fn performance_improvement(findings: &[Finding], fixed: usize) -> String {
    let performance = findings.iter().filter(|f| f.kind.is_performance()).count();
    if performance == 0 {
        return "No performance issues found".to_string();
    }

    let percent = (fixed as f64 / performance as f64 * 100.0).min(100.0);
    format!("~{}% performance improvement", percent.round() as u32)
}

pub fn improvement_line(finding: &Finding) -> String {
    format!("{}: {}", finding.kind, finding.message)
}

// ============================================================================
// DASHBOARD FILTERS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisTab {
    #[default]
    All,
    Performance,
    Security,
    Complexity,
    Algorithm,
    Tests,
    Quality,
}

impl AnalysisTab {
    pub fn accepts(&self, finding: &Finding) -> bool {
        match self {
            AnalysisTab::All => true,
            AnalysisTab::Performance => finding.kind.is_performance(),
            AnalysisTab::Security => finding.kind == FindingKind::Security,
            AnalysisTab::Complexity => finding.kind == FindingKind::TimeComplexity,
            AnalysisTab::Algorithm => finding.kind == FindingKind::Algorithm,
            AnalysisTab::Tests => {
                finding.kind == FindingKind::Bug || finding.message.to_lowercase().contains("test")
            }
            AnalysisTab::Quality => finding.kind == FindingKind::Style,
        }
    }
}

pub fn filter_findings(findings: &[Finding], tab: AnalysisTab) -> Vec<&Finding> {
    findings.iter().filter(|f| tab.accepts(f)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{ComplexityShift, Severity};

    fn finding(id: &str, kind: FindingKind, message: &str, improvement: Option<&str>) -> Finding {
        Finding {
            id: id.to_string(),
            kind,
            severity: Severity::Medium,
            message: message.to_string(),
            line: 1,
            fix: String::new(),
            code_snippet: String::new(),
            suggested_fix: String::new(),
            confidence: 80,
            explanation: String::new(),
            time_complexity: improvement.map(|i| ComplexityShift {
                current: "O(n²)".to_string(),
                improved: "O(n)".to_string(),
                improvement: i.to_string(),
                explanation: String::new(),
            }),
            space_complexity: None,
            recommendation: None,
        }
    }

    fn sample() -> Vec<Finding> {
        vec![
            finding("a", FindingKind::TimeComplexity, "Nested loops", Some("300% faster for n=1000")),
            finding("b", FindingKind::TimeComplexity, "Another", Some("fast")),
            finding("c", FindingKind::Algorithm, "Linear search", None),
            finding("d", FindingKind::Performance, "Add a Test harness", None),
            finding("e", FindingKind::Style, "Naming", None),
            finding("f", FindingKind::Bug, "Off by one", None),
        ]
    }

    #[test]
    fn test_derive_metrics() {
        let metrics = derive_metrics(&sample(), 2, None, None, 2);
        assert_eq!(metrics.total_issues, 6);
        assert_eq!(metrics.performance_issues, 3);
        assert_eq!(metrics.algorithm_issues, 1);
        assert_eq!(metrics.security_issues, 2);
        // (300 + 0) / 2
        assert_eq!(metrics.avg_improvement, 150);
        assert_eq!(metrics.remaining_issues, 4);
        assert_eq!(metrics.test_coverage, 0);
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("45% faster"), 45);
        assert_eq!(leading_number("Optimal"), 0);
        assert_eq!(leading_number(""), 0);
    }

    #[test]
    fn test_performance_improvement() {
        let findings = sample();
        assert_eq!(performance_improvement(&findings, 1), "~33% performance improvement");
        assert_eq!(performance_improvement(&findings, 9), "~100% performance improvement");
        assert_eq!(performance_improvement(&[], 1), "No performance issues found");
    }

    #[test]
    fn test_tabs() {
        let findings = sample();
        let ids = |tab| filter_findings(&findings, tab).iter().map(|f| f.id.clone()).collect::<Vec<_>>();

        assert_eq!(ids(AnalysisTab::All).len(), 6);
        assert_eq!(ids(AnalysisTab::Performance), vec!["a", "b", "d"]);
        assert_eq!(ids(AnalysisTab::Complexity), vec!["a", "b"]);
        assert_eq!(ids(AnalysisTab::Algorithm), vec!["c"]);
        assert_eq!(ids(AnalysisTab::Tests), vec!["d", "f"]);
        assert_eq!(ids(AnalysisTab::Quality), vec!["e"]);
        assert!(ids(AnalysisTab::Security).is_empty());
    }
}
