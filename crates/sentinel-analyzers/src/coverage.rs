//! Coverage estimator
//!
//! Nothing is executed. Line coverage grows with the number of test cases,
//! and branch and function coverage are offsets from it.

use sentinel_core::{Analyzer, AnalyzerError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageReport {
    pub line_coverage: u8,
    pub branch_coverage: u8,
    pub function_coverage: u8,
    /// 1-based line numbers counted from the top
    pub uncovered_lines: Vec<usize>,
    pub missing_branches: Vec<String>,
}

/// Coverage estimate for a buffer exercised by `test_count` test cases
#[derive(Debug, Default, Clone, Copy)]
pub struct CoverageAnalyzer {
    test_count: usize,
}

impl CoverageAnalyzer {
    pub fn new(test_count: usize) -> Self {
        Self { test_count }
    }
}

impl Analyzer for CoverageAnalyzer {
    type Output = CoverageReport;

    fn id(&self) -> &'static str {
        "coverage.v1"
    }

    fn analyze(&self, code: &str) -> Result<CoverageReport, AnalyzerError> {
        if code.trim().is_empty() {
            return Ok(CoverageReport::default());
        }

        let base = (self.test_count.saturating_mul(15)).min(80);
        let bonus = if code.contains("function") { 10 } else { 0 };
        let line = (base + bonus).min(100);

        let lines = code.split('\n').count();
        let covered = lines * line / 100;
        let uncovered = lines.saturating_sub(covered);

        Ok(CoverageReport {
            line_coverage: line as u8,
            branch_coverage: line.saturating_sub(10) as u8,
            function_coverage: (line + 5).min(100) as u8,
            uncovered_lines: (1..=uncovered).collect(),
            missing_branches: vec![
                "edge-case handling".to_string(),
                "null input validation".to_string(),
            ],
        })
    }
}
