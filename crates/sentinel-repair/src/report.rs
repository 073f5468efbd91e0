//! Exported repair report

use crate::metrics::{DerivedMetrics, OptimizationSummary};
use crate::session::{RepairEntry, RepairSession};
use crate::test_runner::TestRunSummary;
use chrono::{DateTime, SecondsFormat, Utc};
use sentinel_analyzers::{
    ComplexityProfile, CoverageReport, GeneratedTest, Language, MemoryProfile, PerformanceResult,
    QualityMetrics, SecurityIssue,
};
use sentinel_core::{Finding, SentinelError, SENTINEL_VERSION};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    pub original_code: String,
    pub repaired_code: String,
    pub analysis: Vec<Finding>,
    pub applied_fixes: Vec<String>,
    pub metrics: Option<DerivedMetrics>,
    pub performance_results: Vec<PerformanceResult>,
    pub test_cases: Vec<GeneratedTest>,
    pub test_run: Option<TestRunSummary>,
    pub coverage_report: Option<CoverageReport>,
    pub security_issues: Vec<SecurityIssue>,
    pub quality_metrics: Option<QualityMetrics>,
    pub memory_profile: Option<MemoryProfile>,
    pub repair_history: Vec<RepairEntry>,
    pub optimization_summary: Option<OptimizationSummary>,
    pub complexity_data: Option<ComplexityProfile>,
    pub language: Language,
    pub engine_version: String,
    /// RFC 3339 / ISO-8601, millisecond precision
    pub timestamp: String,
}

impl RepairReport {
    pub fn from_session(session: &RepairSession, now: DateTime<Utc>) -> Self {
        let analysis = session.analysis();

        Self {
            original_code: session.original_code().to_string(),
            repaired_code: session.current_code().to_string(),
            analysis: session.findings().to_vec(),
            applied_fixes: session.applied().to_vec(),
            metrics: session.metrics(),
            performance_results: session
                .performance()
                .map(|p| p.results.clone())
                .unwrap_or_default(),
            test_cases: analysis.map(|a| a.test_cases.clone()).unwrap_or_default(),
            test_run: session.test_run().cloned(),
            coverage_report: analysis.map(|a| a.coverage.clone()),
            security_issues: analysis.map(|a| a.security_issues.clone()).unwrap_or_default(),
            quality_metrics: analysis.map(|a| a.quality.clone()),
            memory_profile: analysis.map(|a| a.memory.clone()),
            repair_history: session.history().to_vec(),
            optimization_summary: session.summary().cloned(),
            complexity_data: analysis.map(|a| a.complexity.clone()),
            language: session.language(),
            engine_version: SENTINEL_VERSION.to_string(),
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, SentinelError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// `ai-code-repair-<epoch-ms>.json`
pub fn report_file_name(now: DateTime<Utc>) -> String {
    format!("ai-code-repair-{}.json", now.timestamp_millis())
}
