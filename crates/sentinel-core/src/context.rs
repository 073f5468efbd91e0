//! Run Context: state shared by every analyzer stage of one analysis run
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct RunContext {
    pub trace_id: String,
    /// Detected language tag (e.g. "javascript")
    pub language: Option<String>,
    pub metadata: HashMap<String, Value>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            trace_id: uuid::Uuid::new_v4().to_string(),
            language: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}
