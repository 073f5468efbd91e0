//! Endpoint logic behind the two serverless functions.
//!
//! Test-case generation picks a fixed scenario table by test kind; analysis
//! scores stored test cases with a handful of threshold rules. Both are
//! pure, so the in-memory store and the HTTP server share them.

use crate::store::ProjectStore;
use sentinel_core::{
    AnalysisIssue, AnalysisResult, Insight, NewAnalysisResult, NewTestCase, Priority,
    ProjectParameters, Recommendation, SentinelError, TestCase, TestKind, TestStatus,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

/// Body of `POST /functions/v1/generate-test-cases`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub project_id: Uuid,
    pub project_name: String,
    pub module_name: String,
    /// Free text on the wire; unknown kinds fall back to the unit table
    #[serde(alias = "testType")]
    pub test_kind: String,
    #[serde(default)]
    pub parameters: ProjectParameters,
}

/// Body of `POST /functions/v1/analyze-tests`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub project_id: Uuid,
    #[serde(alias = "testType")]
    pub test_kind: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub title: String,
    pub description: String,
    pub input: Value,
    pub expected_output: Value,
    pub priority: Priority,
}

impl Scenario {
    fn new(title: &str, description: String, input: Value, expected_output: Value, priority: Priority) -> Self {
        Self {
            title: title.to_string(),
            description,
            input,
            expected_output,
            priority,
        }
    }

    pub fn into_row(self, project_id: Uuid) -> NewTestCase {
        NewTestCase {
            project_id,
            title: self.title,
            description: self.description,
            input: self.input,
            expected_output: self.expected_output,
            priority: self.priority,
            status: TestStatus::Pending,
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// The five scenarios for `kind`; `None` means an unrecognised kind
pub fn scenarios_for(kind: Option<TestKind>, module: &str, parameters: &ProjectParameters) -> Vec<Scenario> {
    use Priority::{High, Low, Medium};

    match kind.unwrap_or(TestKind::Unit) {
        TestKind::Unit => vec![
            Scenario::new(
                "Valid Input Test",
                format!("Test {} with valid input parameters", module),
                json!({ "valid": true, "data": non_empty(&parameters.expected_inputs).unwrap_or("sample input") }),
                json!({ "success": true, "result": non_empty(&parameters.expected_outputs).unwrap_or("expected result") }),
                High,
            ),
            Scenario::new(
                "Invalid Input Test",
                format!("Test {} with invalid or malformed input", module),
                json!({ "valid": false, "data": null }),
                json!({ "success": false, "error": "Invalid input" }),
                High,
            ),
            Scenario::new(
                "Boundary Value Test",
                format!("Test {} with boundary values", module),
                json!({ "value": 0, "edge": true }),
                json!({ "success": true, "handled": true }),
                Medium,
            ),
            Scenario::new(
                "Empty Input Test",
                format!("Test {} with empty or null input", module),
                json!({}),
                json!({ "success": false, "error": "Required fields missing" }),
                Medium,
            ),
            Scenario::new(
                "Type Validation Test",
                format!("Test {} with incorrect data types", module),
                json!({ "wrongType": "string instead of number" }),
                json!({ "success": false, "error": "Type validation failed" }),
                Low,
            ),
        ],
        TestKind::Integration => vec![
            Scenario::new(
                "End-to-End Flow Test",
                format!("Test complete workflow of {}", module),
                json!({ "workflow": "complete", "steps": ["init", "process", "finalize"] }),
                json!({ "success": true, "completed": true }),
                High,
            ),
            Scenario::new(
                "Module Interaction Test",
                format!("Test {} interaction with dependent modules", module),
                json!({ "dependency": true, "modules": ["module1", "module2"] }),
                json!({ "success": true, "integrated": true }),
                High,
            ),
            Scenario::new(
                "Error Propagation Test",
                format!("Test error handling across {} boundaries", module),
                json!({ "causeError": true }),
                json!({ "success": false, "errorHandled": true }),
                Medium,
            ),
            Scenario::new(
                "Data Consistency Test",
                format!("Test data consistency across {} operations", module),
                json!({ "operation": "multiple", "consistency": true }),
                json!({ "success": true, "dataConsistent": true }),
                High,
            ),
            Scenario::new(
                "Concurrent Operations Test",
                format!("Test {} behavior with concurrent requests", module),
                json!({ "concurrent": true, "count": 10 }),
                json!({ "success": true, "allCompleted": true }),
                Medium,
            ),
        ],
        TestKind::Performance => vec![
            Scenario::new(
                "Response Time Test",
                format!("Measure {} response time under normal load", module),
                json!({ "load": "normal", "requests": 100 }),
                json!({ "avgResponseTime": "< 200ms", "success": true }),
                High,
            ),
            Scenario::new(
                "Heavy Load Test",
                format!("Test {} performance under heavy load", module),
                json!({ "load": "heavy", "requests": 1000 }),
                json!({ "maxResponseTime": "< 1000ms", "success": true }),
                High,
            ),
            Scenario::new(
                "Memory Usage Test",
                format!("Monitor {} memory consumption", module),
                json!({ "monitorMemory": true, "duration": "5min" }),
                json!({ "memoryLeak": false, "peakUsage": "< 500MB" }),
                Medium,
            ),
            Scenario::new(
                "Throughput Test",
                format!("Measure {} throughput capacity", module),
                json!({ "measure": "throughput", "duration": "1min" }),
                json!({ "requestsPerSecond": "> 1000", "success": true }),
                High,
            ),
            Scenario::new(
                "Resource Utilization Test",
                format!("Test {} CPU and resource usage", module),
                json!({ "monitorResources": true }),
                json!({ "cpuUsage": "< 70%", "resourcesOptimal": true }),
                Medium,
            ),
        ],
    }
}

// ============================================================================
// SCORING
// ============================================================================

/// clamp(45..=95, 60 + 3 per test + 5 per high-priority test)
pub fn coverage_level(total: usize, high_priority: usize) -> u8 {
    (60 + total * 3 + high_priority * 5).clamp(45, 95) as u8
}

fn insight(category: &str, message: &str, severity: Priority) -> Insight {
    Insight {
        category: category.to_string(),
        message: message.to_string(),
        severity,
    }
}

fn recommendation(title: &str, description: &str, priority: Priority) -> Recommendation {
    Recommendation {
        title: title.to_string(),
        description: description.to_string(),
        priority,
    }
}

fn general_issue(message: &str, suggestion: &str) -> AnalysisIssue {
    AnalysisIssue {
        test_id: "general".to_string(),
        message: message.to_string(),
        suggestion: suggestion.to_string(),
    }
}

fn any_title(tests: &[TestCase], needles: &[&str]) -> bool {
    tests.iter().any(|t| {
        let title = t.title.to_lowercase();
        needles.iter().any(|n| title.contains(n))
    })
}

/// Score the stored test cases of one project
pub fn score_test_cases(project_id: Uuid, tests: &[TestCase], kind: Option<TestKind>) -> NewAnalysisResult {
    let total = tests.len();
    let high = tests.iter().filter(|t| t.priority == Priority::High).count();
    let coverage = coverage_level(total, high);

    let mut insights = Vec::new();
    let mut errors = Vec::new();
    let mut recommendations = Vec::new();

    if total < 5 {
        insights.push(insight(
            "Coverage Gap",
            "Low test count detected. Consider adding more test cases for better coverage.",
            Priority::High,
        ));
    } else if total >= 10 {
        insights.push(insight(
            "Good Coverage",
            "Excellent test coverage with comprehensive test scenarios.",
            Priority::Low,
        ));
    }

    if (high as f64) < total as f64 * 0.3 {
        insights.push(insight(
            "Priority Distribution",
            "Consider marking more critical test cases as high priority.",
            Priority::Medium,
        ));
    }

    match kind {
        Some(TestKind::Unit) => {
            if !any_title(tests, &["edge", "boundary"]) {
                errors.push(general_issue(
                    "Missing edge case tests",
                    "Add test cases for boundary values and edge conditions",
                ));
            }
            if !any_title(tests, &["error", "invalid"]) {
                errors.push(general_issue(
                    "Missing error handling tests",
                    "Add test cases for error conditions and invalid inputs",
                ));
            }
        }
        Some(TestKind::Integration) => {
            insights.push(insight(
                "Integration Testing",
                "Integration tests should verify component interactions and data flow.",
                Priority::Low,
            ));
            if !any_title(tests, &["end-to-end", "e2e"]) {
                recommendations.push(recommendation(
                    "Add End-to-End Tests",
                    "Include complete workflow tests that verify the entire system integration.",
                    Priority::High,
                ));
            }
        }
        Some(TestKind::Performance) => {
            insights.push(insight(
                "Performance Metrics",
                "Performance tests should include response time, throughput, and resource usage metrics.",
                Priority::Low,
            ));
            recommendations.push(recommendation(
                "Establish Baselines",
                "Create performance baselines to track improvements and regressions over time.",
                Priority::High,
            ));
            recommendations.push(recommendation(
                "Load Testing",
                "Test system behavior under various load conditions (normal, peak, stress).",
                Priority::Medium,
            ));
        }
        None => {}
    }

    for failed in tests.iter().filter(|t| t.status == TestStatus::Failed) {
        errors.push(AnalysisIssue {
            test_id: failed.id.to_string(),
            message: format!("Test \"{}\" is failing", failed.title),
            suggestion: "Review test expectations and verify implementation matches requirements".to_string(),
        });
    }

    recommendations.push(recommendation(
        "Continuous Integration",
        "Integrate these tests into your CI/CD pipeline for automated validation.",
        Priority::High,
    ));
    recommendations.push(recommendation(
        "Test Documentation",
        "Document test purposes and expected outcomes for team reference.",
        Priority::Medium,
    ));
    recommendations.push(recommendation(
        "Regular Review",
        "Schedule periodic reviews to update tests as requirements evolve.",
        Priority::Low,
    ));
    if coverage < 70 {
        recommendations.push(recommendation(
            "Increase Coverage",
            "Add more test cases to cover additional scenarios and edge cases.",
            Priority::High,
        ));
    }

    NewAnalysisResult {
        project_id,
        coverage_level: coverage,
        insights,
        errors,
        recommendations,
    }
}

// ============================================================================
// ENDPOINT PIPELINES
// ============================================================================

/// Generate, insert and return the scenario rows for one project
pub async fn generate_into(store: &dyn ProjectStore, request: &GenerateRequest) -> Result<Vec<TestCase>, SentinelError> {
    let kind = TestKind::parse(&request.test_kind);
    let rows = scenarios_for(kind, &request.module_name, &request.parameters)
        .into_iter()
        .map(|s| s.into_row(request.project_id))
        .collect();

    let inserted = store.insert_test_cases(rows).await?;
    info!(project_id = %request.project_id, kind = %request.test_kind, count = inserted.len(), "test cases generated");
    Ok(inserted)
}

/// Score a project's stored test cases and append the result
pub async fn analyze_into(store: &dyn ProjectStore, request: &AnalyzeRequest) -> Result<AnalysisResult, SentinelError> {
    let tests = store.list_test_cases(request.project_id).await?;
    let scored = score_test_cases(request.project_id, &tests, TestKind::parse(&request.test_kind));

    let stored = store.insert_analysis(scored).await?;
    info!(project_id = %request.project_id, coverage = stored.coverage_level, tests = tests.len(), "tests analyzed");
    Ok(stored)
}
