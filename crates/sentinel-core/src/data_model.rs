//! Data Model: Finding and its canned complexity annotations
//!
//! Findings are produced fresh on every analysis run and live only in the
//! repair session that requested them.
use serde::{Deserialize, Serialize};

/// Category of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FindingKind {
    Security,
    Performance,
    Bug,
    Style,
    TimeComplexity,
    Algorithm,
}

impl FindingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Bug => "bug",
            Self::Style => "style",
            Self::TimeComplexity => "time-complexity",
            Self::Algorithm => "algorithm",
        }
    }

    /// Performance-flavoured kinds, counted together in session metrics
    pub fn is_performance(&self) -> bool {
        matches!(self, Self::Performance | Self::TimeComplexity)
    }
}

impl std::fmt::Display for FindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl Severity {
    /// Repair ordering: critical first
    pub fn rank(&self) -> u8 {
        match self {
            Self::Critical => 0,
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

/// Canned "current → improved" time complexity annotation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityShift {
    pub current: String,
    pub improved: String,
    /// Fabricated speed-up (e.g. "300% faster for n=1000")
    pub improvement: String,
    pub explanation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpaceShift {
    pub current: String,
    pub improved: String,
}

/// Suggested algorithmic approach attached to performance findings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmAdvice {
    pub algorithm: String,
    pub method: String,
    pub libraries: Vec<String>,
    pub benefits: Vec<String>,
}

/// One reported issue or suggestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: FindingKind,
    pub severity: Severity,
    pub message: String,
    /// 1-based line hint
    pub line: usize,
    /// One-line remediation summary
    pub fix: String,
    /// Text replaced verbatim when the fix is applied
    pub code_snippet: String,
    pub suggested_fix: String,
    /// Fabricated confidence percentage (0-100)
    pub confidence: u8,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_complexity: Option<ComplexityShift>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space_complexity: Option<SpaceShift>,
    #[serde(rename = "recommendations", skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<AlgorithmAdvice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_rank_order() {
        let mut severities = vec![Severity::Low, Severity::Critical, Severity::Medium, Severity::High];
        severities.sort_by_key(|s| s.rank());
        assert_eq!(
            severities,
            vec![Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
        );
    }

    #[test]
    fn test_finding_kind_wire_names() {
        let json = serde_json::to_string(&FindingKind::TimeComplexity).unwrap();
        assert_eq!(json, "\"time-complexity\"");
        assert!(FindingKind::TimeComplexity.is_performance());
        assert!(!FindingKind::Algorithm.is_performance());
    }
}
