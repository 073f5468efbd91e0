//! Phase-3 analysis export
use once_cell::sync::Lazy;
use regex::Regex;
use sentinel_core::{AnalysisIssue, AnalysisResult, Insight, Priority, Project, Recommendation, TestCase, TestKind, TestStatus};
use serde::Serialize;
use serde_json::Value;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisExport {
    pub project: ExportedProject,
    pub test_cases: Vec<ExportedTestCase>,
    pub analysis: Option<ExportedAnalysis>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedProject {
    pub name: String,
    pub module: String,
    pub test_type: TestKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedTestCase {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: TestStatus,
    pub input: Value,
    pub expected_output: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAnalysis {
    pub coverage_level: u8,
    pub insights: Vec<Insight>,
    pub errors: Vec<AnalysisIssue>,
    pub recommendations: Vec<Recommendation>,
}

pub fn analysis_export(project: &Project, tests: &[TestCase], analysis: Option<&AnalysisResult>) -> AnalysisExport {
    AnalysisExport {
        project: ExportedProject {
            name: project.name.clone(),
            module: project.module_name.clone(),
            test_type: project.test_kind,
        },
        test_cases: tests
            .iter()
            .map(|t| ExportedTestCase {
                title: t.title.clone(),
                description: t.description.clone(),
                priority: t.priority,
                status: t.status,
                input: t.input.clone(),
                expected_output: t.expected_output.clone(),
            })
            .collect(),
        analysis: analysis.map(|a| ExportedAnalysis {
            coverage_level: a.coverage_level,
            insights: a.insights.clone(),
            errors: a.errors.clone(),
            recommendations: a.recommendations.clone(),
        }),
    }
}

/// `<name with whitespace runs replaced by dashes>-analysis.json`
pub fn analysis_file_name(project_name: &str) -> String {
    format!("{}-analysis.json", WHITESPACE.replace_all(project_name, "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sentinel_core::{Phase, ProjectParameters};
    use serde_json::json;
    use uuid::Uuid;

    fn project() -> Project {
        Project {
            id: Uuid::new_v4(),
            owner: "alice".to_string(),
            name: "My Cool  Project".to_string(),
            module_name: "payments".to_string(),
            test_kind: TestKind::Integration,
            parameters: ProjectParameters::default(),
            current_phase: Phase::Analysis,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_file_name_collapses_whitespace() {
        assert_eq!(analysis_file_name("My Cool  Project"), "My-Cool-Project-analysis.json");
        assert_eq!(analysis_file_name("solo"), "solo-analysis.json");
    }

    #[test]
    fn test_export_without_analysis() {
        let export = analysis_export(&project(), &[], None);
        let value = serde_json::to_value(&export).unwrap();
        assert_eq!(
            value,
            json!({
                "project": {"name": "My Cool  Project", "module": "payments", "testType": "integration"},
                "testCases": [],
                "analysis": null
            })
        );
    }
}
