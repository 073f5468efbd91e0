//! Test case generator
//!
//! Emits edge and stress cases keyed off literal words in the buffer.

use sentinel_core::{Analyzer, AnalyzerError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Element count of the stress-test input
const STRESS_INPUT_LEN: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestCategory {
    EdgeCase,
    NormalCase,
    StressTest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestComplexity {
    Simple,
    Medium,
    Complex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedTest {
    pub id: String,
    pub input: Value,
    pub expected_output: Value,
    pub description: String,
    pub category: TestCategory,
    pub complexity: TestComplexity,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TestCaseGenerator;

impl TestCaseGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Analyzer for TestCaseGenerator {
    type Output = Vec<GeneratedTest>;

    fn id(&self) -> &'static str {
        "testgen.v1"
    }

    fn analyze(&self, code: &str) -> Result<Vec<GeneratedTest>, AnalyzerError> {
        let mut tests = Vec::new();

        if code.contains("array") {
            tests.push(GeneratedTest {
                id: "edge-1".to_string(),
                input: json!([]),
                expected_output: Value::Null,
                description: "Empty array input".to_string(),
                category: TestCategory::EdgeCase,
                complexity: TestComplexity::Simple,
            });
        }

        if code.contains("string") {
            tests.push(GeneratedTest {
                id: "edge-2".to_string(),
                input: json!(""),
                expected_output: Value::Null,
                description: "Empty string input".to_string(),
                category: TestCategory::EdgeCase,
                complexity: TestComplexity::Simple,
            });
        }

        if code.contains("O(n²)") {
            tests.push(GeneratedTest {
                id: "stress-1".to_string(),
                input: Value::Array((0..STRESS_INPUT_LEN).map(Value::from).collect()),
                expected_output: json!("Should complete within 1 second"),
                description: "Large dataset performance test".to_string(),
                category: TestCategory::StressTest,
                complexity: TestComplexity::Complex,
            });
        }

        Ok(tests)
    }
}
