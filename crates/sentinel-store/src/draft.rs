//! Manual test-case editor: raw form fields validated into rows
use sentinel_core::{NewTestCase, Priority, SentinelError, TestCase, TestCaseUpdate, TestStatus};
use serde_json::Value;
use uuid::Uuid;

pub const INVALID_JSON: &str = "Invalid JSON format in input or expected output";

/// Form state of the editor; `input`/`expected_output` are raw JSON text
#[derive(Debug, Clone, PartialEq)]
pub struct TestCaseDraft {
    pub title: String,
    pub description: String,
    pub input: String,
    pub expected_output: String,
    pub priority: Priority,
    pub status: TestStatus,
}

impl Default for TestCaseDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            input: "{}".to_string(),
            expected_output: "{}".to_string(),
            priority: Priority::Medium,
            status: TestStatus::Pending,
        }
    }
}

/// A draft whose fields passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidTestCase {
    pub title: String,
    pub description: String,
    pub input: Value,
    pub expected_output: Value,
    pub priority: Priority,
    pub status: TestStatus,
}

impl TestCaseDraft {
    /// Pre-fill the editor from a stored row
    pub fn from_test_case(row: &TestCase) -> Self {
        Self {
            title: row.title.clone(),
            description: row.description.clone(),
            input: serde_json::to_string_pretty(&row.input).unwrap_or_else(|_| "{}".to_string()),
            expected_output: serde_json::to_string_pretty(&row.expected_output)
                .unwrap_or_else(|_| "{}".to_string()),
            priority: row.priority,
            status: row.status,
        }
    }

    pub fn parse(&self) -> Result<ValidTestCase, SentinelError> {
        if self.title.trim().is_empty() {
            return Err(SentinelError::InvalidInput("Title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(SentinelError::InvalidInput("Description is required".to_string()));
        }

        let input: Value = serde_json::from_str(&self.input)
            .map_err(|_| SentinelError::InvalidInput(INVALID_JSON.to_string()))?;
        let expected_output: Value = serde_json::from_str(&self.expected_output)
            .map_err(|_| SentinelError::InvalidInput(INVALID_JSON.to_string()))?;

        Ok(ValidTestCase {
            title: self.title.clone(),
            description: self.description.clone(),
            input,
            expected_output,
            priority: self.priority,
            status: self.status,
        })
    }
}

impl ValidTestCase {
    pub fn into_new(self, project_id: Uuid) -> NewTestCase {
        NewTestCase {
            project_id,
            title: self.title,
            description: self.description,
            input: self.input,
            expected_output: self.expected_output,
            priority: self.priority,
            status: self.status,
        }
    }

    pub fn into_update(self) -> TestCaseUpdate {
        TestCaseUpdate {
            title: Some(self.title),
            description: Some(self.description),
            input: Some(self.input),
            expected_output: Some(self.expected_output),
            priority: Some(self.priority),
            status: Some(self.status),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft() -> TestCaseDraft {
        TestCaseDraft {
            title: "Rejects empty password".to_string(),
            description: "Login must fail".to_string(),
            input: r#"{"password": ""}"#.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_draft() {
        let parsed = draft().parse().unwrap();
        assert_eq!(parsed.input, json!({"password": ""}));
        assert_eq!(parsed.expected_output, json!({}));
        assert_eq!(parsed.priority, Priority::Medium);
    }

    #[test]
    fn test_invalid_json_rejected() {
        let mut bad = draft();
        bad.expected_output = "{not json".to_string();
        match bad.parse() {
            Err(SentinelError::InvalidInput(msg)) => assert_eq!(msg, INVALID_JSON),
            other => panic!("expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_blank_title_rejected() {
        let mut bad = draft();
        bad.title = "   ".to_string();
        assert!(matches!(bad.parse(), Err(SentinelError::InvalidInput(_))));
    }

    #[test]
    fn test_update_sets_every_field() {
        let update = draft().parse().unwrap().into_update();
        assert_eq!(update.title.as_deref(), Some("Rejects empty password"));
        assert_eq!(update.status, Some(TestStatus::Pending));
    }
}
