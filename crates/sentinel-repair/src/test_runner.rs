//! Simulated test runner
//!
//! Generated test cases are never executed. Each one "passes" based on a
//! hash of the code and its id, so a rerun over the same buffer reports the
//! same outcome.

use sentinel_analyzers::GeneratedTest;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

/// Share of hash space that counts as a pass, out of 100
const PASS_RATE: u32 = 70;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub test_case_id: String,
    pub passed: bool,
    pub execution_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRunSummary {
    pub results: Vec<TestResult>,
    pub passed: usize,
    pub total: usize,
    pub pass_percentage: u8,
}

impl TestRunSummary {
    pub fn from_results(results: Vec<TestResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        let total = results.len();
        Self {
            pass_percentage: pass_percentage(passed, total),
            results,
            passed,
            total,
        }
    }
}

/// Rounded pass percentage, 0 when nothing ran
pub fn pass_percentage(passed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    (passed as f64 / total as f64 * 100.0).round() as u8
}

pub fn simulated_outcome(code: &str, test_id: &str) -> bool {
    let mut hasher = blake3::Hasher::new();
    hasher.update(code.as_bytes());
    hasher.update(b"\0");
    hasher.update(test_id.as_bytes());
    let first = hasher.finalize().as_bytes()[0] as u32;

    first * 100 / 256 < PASS_RATE
}

/// Runs `tests` one by one, waiting `step_delay` before each
pub async fn run_tests(code: &str, tests: &[GeneratedTest], step_delay: Duration) -> TestRunSummary {
    let mut results = Vec::with_capacity(tests.len());

    for test in tests {
        let start = Instant::now();
        tokio::time::sleep(step_delay).await;
        let passed = simulated_outcome(code, &test.id);

        debug!(test_id = %test.id, passed, "simulated test finished");
        results.push(TestResult {
            test_case_id: test.id.clone(),
            passed,
            execution_time: start.elapsed().as_secs_f64() * 1000.0,
            error: None,
        });
    }

    TestRunSummary::from_results(results)
}
