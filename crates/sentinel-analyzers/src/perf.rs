//! Performance suite
//!
//! Nothing is executed. After an artificial delay the suite returns four
//! rows whose numbers scale with the line count and a few matcher flags.
//! The caller races the suite against a deadline; a late suite is left to
//! finish on its own and its rows are replaced by a fixed fallback set.

use crate::matchers;
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerfStatus {
    Passed,
    Failed,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceResult {
    pub id: String,
    pub test_name: String,
    pub execution_time: f64,
    pub memory_usage: f64,
    pub complexity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_time: Option<f64>,
    pub status: PerfStatus,
}

impl PerformanceResult {
    fn row(
        id: &str,
        test_name: &str,
        execution_time: f64,
        memory_usage: f64,
        complexity: &str,
        improvement: &str,
        status: PerfStatus,
    ) -> Self {
        Self {
            id: id.to_string(),
            test_name: test_name.to_string(),
            execution_time,
            memory_usage,
            complexity: complexity.to_string(),
            improvement: Some(improvement.to_string()),
            before_time: None,
            after_time: None,
            status,
        }
    }

    fn timed(mut self, before: f64, after: f64) -> Self {
        self.before_time = Some(before);
        self.after_time = Some(after);
        self
    }
}

/// Where a set of performance rows came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultOrigin {
    Measured,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceReport {
    pub results: Vec<PerformanceResult>,
    pub origin: ResultOrigin,
}

impl PerformanceReport {
    pub fn is_fallback(&self) -> bool {
        self.origin == ResultOrigin::Fallback
    }
}

/// The four canned rows for `code`
pub fn measure(code: &str) -> Vec<PerformanceResult> {
    let lines = code.split('\n').count() as f64;
    let nested = matchers::has_inline_nested_loops(code);
    let recursion = code.contains("function") && code.contains("return");
    let large_data = code.contains("Array(") || code.contains("new Array");

    let base_time = (lines * 2.0).max(50.0);
    let base_memory = (lines * 0.5).max(10.0);

    let time_row = if nested {
        PerformanceResult::row("perf-1", "Time Complexity", base_time * 8.0, base_memory, "O(n²)", "O(n²) → O(n log n)", PerfStatus::Warning)
            .timed(1200.0, 450.0)
    } else if recursion {
        PerformanceResult::row("perf-1", "Time Complexity", base_time, base_memory, "O(2ⁿ)", "O(2ⁿ) → O(n)", PerfStatus::Warning)
            .timed(800.0, 300.0)
    } else {
        PerformanceResult::row("perf-1", "Time Complexity", base_time, base_memory, "O(n)", "Optimal", PerfStatus::Passed)
            .timed(200.0, 150.0)
    };

    let memory_row = if large_data {
        PerformanceResult::row("perf-2", "Memory Usage", base_time * 0.7, base_memory * 4.0, "O(n)", "35% reduction possible", PerfStatus::Warning)
            .timed(420.0, 270.0)
    } else {
        PerformanceResult::row("perf-2", "Memory Usage", base_time * 0.7, base_memory, "O(1)", "Optimal", PerfStatus::Passed)
            .timed(150.0, 150.0)
    };

    vec![
        time_row,
        memory_row,
        PerformanceResult::row("perf-3", "Execution Speed", base_time * 1.5, base_memory * 0.8, "O(n log n)", "O(n log n) → O(n)", PerfStatus::Warning)
            .timed(680.0, 320.0),
        PerformanceResult::row("perf-4", "Algorithm Efficiency", base_time, base_memory, "O(n)", "Optimal", PerfStatus::Passed),
    ]
}

/// Single row used when measuring itself fails
pub fn basic_analysis_fallback() -> Vec<PerformanceResult> {
    vec![PerformanceResult::row("fallback-1", "Basic Analysis", 100.0, 50.0, "O(n)", "Analysis completed", PerfStatus::Passed)]
}

/// Rows substituted when the suite misses its deadline or returns nothing
pub fn timeout_fallback() -> Vec<PerformanceResult> {
    vec![
        PerformanceResult::row("fallback-1", "Basic Performance", 150.0, 45.0, "O(n)", "No significant issues", PerfStatus::Passed),
        PerformanceResult::row("fallback-2", "Memory Analysis", 75.0, 88.0, "O(n)", "Consider memory optimization", PerfStatus::Warning),
        PerformanceResult::row("fallback-3", "Execution Time", 230.0, 32.0, "O(n log n)", "Could be optimized to O(n)", PerfStatus::Warning),
    ]
}

/// Runs the suite on a spawned task, raced against `timeout`.
///
/// Blank code yields an empty measured report. Never fails.
pub async fn run_performance_suite(code: &str, delay: Duration, timeout: Duration) -> PerformanceReport {
    if code.trim().is_empty() {
        return PerformanceReport { results: Vec::new(), origin: ResultOrigin::Measured };
    }

    let owned = code.to_string();
    let handle = tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match panic::catch_unwind(AssertUnwindSafe(|| measure(&owned))) {
            Ok(rows) => PerformanceReport { results: rows, origin: ResultOrigin::Measured },
            Err(_) => PerformanceReport { results: basic_analysis_fallback(), origin: ResultOrigin::Fallback },
        }
    });

    // On timeout the handle is dropped, which detaches the task without aborting it
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(report)) if !report.results.is_empty() => {
            debug!(rows = report.results.len(), origin = ?report.origin, "performance suite finished");
            report
        }
        Ok(Ok(_)) => {
            warn!("performance suite returned no rows, using fallback");
            PerformanceReport { results: timeout_fallback(), origin: ResultOrigin::Fallback }
        }
        Ok(Err(e)) => {
            warn!(error = %e, "performance suite task failed, using fallback");
            PerformanceReport { results: timeout_fallback(), origin: ResultOrigin::Fallback }
        }
        Err(_) => {
            warn!(timeout_ms = timeout.as_millis() as u64, "performance suite timed out, using fallback");
            PerformanceReport { results: timeout_fallback(), origin: ResultOrigin::Fallback }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_plain() {
        let rows = measure("const x = 1;");
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].complexity, "O(n)");
        assert_eq!(rows[0].status, PerfStatus::Passed);
        assert_eq!(rows[0].execution_time, 50.0);
        assert_eq!(rows[1].memory_usage, 10.0);
        assert!(rows[3].before_time.is_none());
    }

    #[test]
    fn test_measure_flags() {
        let rows = measure("for (a) { for (b) {} }\nconst big = new Array(5);");
        assert_eq!(rows[0].complexity, "O(n²)");
        assert_eq!(rows[0].execution_time, 400.0);
        assert_eq!(rows[0].before_time, Some(1200.0));
        assert_eq!(rows[1].memory_usage, 40.0);
        assert_eq!(rows[1].status, PerfStatus::Warning);

        let rows = measure("function f(n) { return f(n - 1); }");
        assert_eq!(rows[0].complexity, "O(2ⁿ)");
        assert_eq!(rows[0].improvement.as_deref(), Some("O(2ⁿ) → O(n)"));
    }

    #[test]
    fn test_fallback_sets() {
        assert_eq!(basic_analysis_fallback().len(), 1);
        let ids: Vec<String> = timeout_fallback().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["fallback-1", "fallback-2", "fallback-3"]);
    }

    #[tokio::test]
    async fn test_suite_measures_in_time() {
        let report = run_performance_suite("let x = 1;", Duration::ZERO, Duration::from_secs(5)).await;
        assert_eq!(report.origin, ResultOrigin::Measured);
        assert_eq!(report.results.len(), 4);
    }

    #[tokio::test]
    async fn test_suite_times_out_to_fallback() {
        let report =
            run_performance_suite("let x = 1;", Duration::from_millis(500), Duration::from_millis(10)).await;
        assert!(report.is_fallback());
        assert_eq!(report.results.len(), 3);
        assert_eq!(report.results[0].test_name, "Basic Performance");
    }

    #[tokio::test]
    async fn test_blank_code_is_empty() {
        let report = run_performance_suite("  \n", Duration::ZERO, Duration::from_secs(1)).await;
        assert!(report.results.is_empty());
        assert!(!report.is_fallback());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(&basic_analysis_fallback()[0]).unwrap();
        assert_eq!(json["testName"], "Basic Analysis");
        assert_eq!(json["status"], "passed");
        assert!(json.get("beforeTime").is_none());
    }
}
