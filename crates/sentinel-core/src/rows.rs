//! Rows of the Remote Project Store: projects, test cases, analysis results
//!
//! Field names follow the store's column names so rows round-trip through
//! the REST interface unchanged.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestKind {
    Unit,
    Integration,
    Performance,
}

impl TestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unit => "unit",
            Self::Integration => "integration",
            Self::Performance => "performance",
        }
    }

    /// Parse a kind name; unknown names map to `None`
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "unit" => Some(Self::Unit),
            "integration" => Some(Self::Integration),
            "performance" => Some(Self::Performance),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    #[default]
    Pending,
    Passed,
    Failed,
}

/// Wizard phase, stored as 1, 2 or 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Phase {
    Input = 1,
    Generation = 2,
    Analysis = 3,
}

impl Phase {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Input => Some(Self::Generation),
            Self::Generation => Some(Self::Analysis),
            Self::Analysis => None,
        }
    }

    pub fn previous(&self) -> Option<Self> {
        match self {
            Self::Input => None,
            Self::Generation => Some(Self::Input),
            Self::Analysis => Some(Self::Generation),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Input => "Input",
            Self::Generation => "Test Generation",
            Self::Analysis => "Analysis",
        }
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        phase.number()
    }
}

impl TryFrom<u8> for Phase {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Input),
            2 => Ok(Self::Generation),
            3 => Ok(Self::Analysis),
            other => Err(format!("invalid phase {}", other)),
        }
    }
}

/// Free-form parameters captured in phase 1
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParameters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_inputs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outputs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_params: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    #[serde(rename = "user_id")]
    pub owner: String,
    pub name: String,
    pub module_name: String,
    #[serde(rename = "test_type")]
    pub test_kind: TestKind,
    #[serde(default)]
    pub parameters: ProjectParameters,
    pub current_phase: Phase,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProject {
    #[serde(rename = "user_id")]
    pub owner: String,
    pub name: String,
    pub module_name: String,
    #[serde(rename = "test_type")]
    pub test_kind: TestKind,
    #[serde(default)]
    pub parameters: ProjectParameters,
    pub current_phase: Phase,
}

/// Partial project update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_name: Option<String>,
    #[serde(rename = "test_type", skip_serializing_if = "Option::is_none")]
    pub test_kind: Option<TestKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<ProjectParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_phase: Option<Phase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub description: String,
    pub input: Value,
    pub expected_output: Value,
    pub priority: Priority,
    #[serde(default)]
    pub status: TestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTestCase {
    pub project_id: Uuid,
    pub title: String,
    pub description: String,
    pub input: Value,
    pub expected_output: Value,
    pub priority: Priority,
    #[serde(default)]
    pub status: TestStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCaseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TestStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub category: String,
    pub message: String,
    pub severity: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisIssue {
    #[serde(rename = "testId")]
    pub test_id: String,
    pub message: String,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    pub priority: Priority,
}

/// Append-only analysis snapshot; readers use the most recent one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: Uuid,
    pub project_id: Uuid,
    /// 0-100
    pub coverage_level: u8,
    pub insights: Vec<Insight>,
    pub errors: Vec<AnalysisIssue>,
    pub recommendations: Vec<Recommendation>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAnalysisResult {
    pub project_id: Uuid,
    pub coverage_level: u8,
    pub insights: Vec<Insight>,
    pub errors: Vec<AnalysisIssue>,
    pub recommendations: Vec<Recommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_phase_wire_format() {
        assert_eq!(serde_json::to_value(Phase::Generation).unwrap(), json!(2));
        let phase: Phase = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(phase, Phase::Analysis);
        assert!(serde_json::from_value::<Phase>(json!(4)).is_err());
    }

    #[test]
    fn test_phase_navigation() {
        assert_eq!(Phase::Input.next(), Some(Phase::Generation));
        assert_eq!(Phase::Analysis.next(), None);
        assert_eq!(Phase::Input.previous(), None);
        assert!(Phase::Input < Phase::Analysis);
    }

    #[test]
    fn test_project_column_names() {
        let project = NewProject {
            owner: "user-1".to_string(),
            name: "Checkout".to_string(),
            module_name: "cart".to_string(),
            test_kind: TestKind::Integration,
            parameters: ProjectParameters::default(),
            current_phase: Phase::Input,
        };

        let value = serde_json::to_value(&project).unwrap();
        assert_eq!(value["user_id"], "user-1");
        assert_eq!(value["test_type"], "integration");
        assert_eq!(value["current_phase"], 1);
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(TestKind::parse("performance"), Some(TestKind::Performance));
        assert_eq!(TestKind::parse("fuzz"), None);
    }
}
