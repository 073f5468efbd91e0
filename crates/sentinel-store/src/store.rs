//! The Remote Project Store interface.
//!
//! Rows live in three tables (projects, test cases, analysis results) and two
//! serverless endpoints compute test cases and analyses from them. The trait
//! is object-safe so the wizard and the API can hold `Arc<dyn ProjectStore>`.

use crate::functions::{AnalyzeRequest, GenerateRequest};
use async_trait::async_trait;
use sentinel_core::{
    AnalysisResult, NewAnalysisResult, NewProject, NewTestCase, Project, ProjectUpdate,
    SentinelError, TestCase, TestCaseUpdate,
};
use uuid::Uuid;

#[async_trait]
pub trait ProjectStore: Send + Sync {
    // ========================================================================
    // PROJECTS
    // ========================================================================

    async fn create_project(&self, project: NewProject) -> Result<Project, SentinelError>;

    async fn get_project(&self, id: Uuid) -> Result<Project, SentinelError>;

    async fn update_project(&self, id: Uuid, update: ProjectUpdate) -> Result<Project, SentinelError>;

    /// Projects of one owner, newest first
    async fn list_projects(&self, owner: &str) -> Result<Vec<Project>, SentinelError>;

    /// Deletes the project together with its test cases and analyses
    async fn delete_project(&self, id: Uuid) -> Result<(), SentinelError>;

    // ========================================================================
    // TEST CASES
    // ========================================================================

    /// Test cases of one project, newest first
    async fn list_test_cases(&self, project_id: Uuid) -> Result<Vec<TestCase>, SentinelError>;

    async fn create_test_case(&self, test_case: NewTestCase) -> Result<TestCase, SentinelError>;

    async fn insert_test_cases(&self, rows: Vec<NewTestCase>) -> Result<Vec<TestCase>, SentinelError>;

    async fn update_test_case(&self, id: Uuid, update: TestCaseUpdate) -> Result<TestCase, SentinelError>;

    async fn delete_test_case(&self, id: Uuid) -> Result<(), SentinelError>;

    // ========================================================================
    // ANALYSIS RESULTS
    // ========================================================================

    async fn latest_analysis(&self, project_id: Uuid) -> Result<Option<AnalysisResult>, SentinelError>;

    async fn insert_analysis(&self, analysis: NewAnalysisResult) -> Result<AnalysisResult, SentinelError>;

    // ========================================================================
    // SERVERLESS ENDPOINTS
    // ========================================================================

    async fn generate_test_cases(&self, request: &GenerateRequest) -> Result<Vec<TestCase>, SentinelError>;

    async fn analyze_tests(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, SentinelError>;
}
