//! HTTP client for the hosted project store.
//!
//! Tables are reached through the store's REST interface
//! (`/rest/v1/<table>` with `eq.` filters) and the two scoring endpoints
//! through `/functions/v1/<name>`. Every request carries the bearer
//! credential both as `Authorization` and as `apikey`.

use crate::functions::{AnalyzeRequest, GenerateRequest};
use crate::store::ProjectStore;
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder};
use sentinel_core::{
    AnalysisResult, NewAnalysisResult, NewProject, NewTestCase, Project, ProjectUpdate,
    SentinelConfig, SentinelError, TestCase, TestCaseUpdate,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};
use uuid::Uuid;

const PROJECTS: &str = "projects";
const TEST_CASES: &str = "test_cases";
const ANALYSES: &str = "analysis_results";

/// Response of a scoring endpoint: `{success, data}`, with the legacy
/// `testCases`/`analysis` keys accepted as well
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(alias = "testCases", alias = "analysis")]
    data: T,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

pub struct HttpProjectStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpProjectStore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_timeout(base_url, api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(base_url: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
            error!(error = %e, "Failed to build store HTTP client with custom timeout, using default client");
            Client::new()
        });

        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &SentinelConfig) -> Self {
        Self::with_timeout(&config.store_url, &config.anon_key, config.request_timeout())
    }

    /// Point the client at another host (used against mock servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.authorized(method, format!("{}/rest/v1/{}", self.base_url, table))
    }

    fn function(&self, name: &str) -> RequestBuilder {
        self.authorized(Method::POST, format!("{}/functions/v1/{}", self.base_url, name))
    }

    fn authorized(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("apikey", &self.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, SentinelError> {
        let response = request.send().await.map_err(|e| {
            error!(error = %e, "project store unreachable");
            SentinelError::Network(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SentinelError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            error!(status = %status, "project store error: {}", message);
            return Err(SentinelError::Remote {
                status: status.as_u16(),
                message,
            });
        }

        Ok(text)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SentinelError> {
        let text = self.send(request).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Write that returns the affected rows
    async fn write<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Vec<T>, SentinelError> {
        self.fetch(request.header("Prefer", "return=representation")).await
    }

    async fn single<T: DeserializeOwned>(&self, request: RequestBuilder, what: String) -> Result<T, SentinelError> {
        let rows: Vec<T> = self.write(request).await?;
        rows.into_iter().next().ok_or(SentinelError::NotFound(what))
    }
}

fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl ProjectStore for HttpProjectStore {
    async fn create_project(&self, project: NewProject) -> Result<Project, SentinelError> {
        let request = self.table(Method::POST, PROJECTS).json(&project);
        self.single(request, "created project".to_string()).await
    }

    async fn get_project(&self, id: Uuid) -> Result<Project, SentinelError> {
        let request = self
            .table(Method::GET, PROJECTS)
            .query(&[("select", "*".to_string()), ("id", eq(id))]);
        let rows: Vec<Project> = self.fetch(request).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| SentinelError::NotFound(format!("project {}", id)))
    }

    async fn update_project(&self, id: Uuid, update: ProjectUpdate) -> Result<Project, SentinelError> {
        let request = self
            .table(Method::PATCH, PROJECTS)
            .query(&[("id", eq(id))])
            .json(&update);
        self.single(request, format!("project {}", id)).await
    }

    async fn list_projects(&self, owner: &str) -> Result<Vec<Project>, SentinelError> {
        let request = self.table(Method::GET, PROJECTS).query(&[
            ("select", "*".to_string()),
            ("user_id", eq(owner)),
            ("order", "created_at.desc".to_string()),
        ]);
        self.fetch(request).await
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), SentinelError> {
        let request = self.table(Method::DELETE, PROJECTS).query(&[("id", eq(id))]);
        self.send(request).await?;
        debug!(project_id = %id, "project deleted");
        Ok(())
    }

    async fn list_test_cases(&self, project_id: Uuid) -> Result<Vec<TestCase>, SentinelError> {
        let request = self.table(Method::GET, TEST_CASES).query(&[
            ("select", "*".to_string()),
            ("project_id", eq(project_id)),
            ("order", "created_at.desc".to_string()),
        ]);
        self.fetch(request).await
    }

    async fn create_test_case(&self, test_case: NewTestCase) -> Result<TestCase, SentinelError> {
        let request = self.table(Method::POST, TEST_CASES).json(&test_case);
        self.single(request, "created test case".to_string()).await
    }

    async fn insert_test_cases(&self, rows: Vec<NewTestCase>) -> Result<Vec<TestCase>, SentinelError> {
        let request = self.table(Method::POST, TEST_CASES).json(&rows);
        self.write(request).await
    }

    async fn update_test_case(&self, id: Uuid, update: TestCaseUpdate) -> Result<TestCase, SentinelError> {
        let request = self
            .table(Method::PATCH, TEST_CASES)
            .query(&[("id", eq(id))])
            .json(&update);
        self.single(request, format!("test case {}", id)).await
    }

    async fn delete_test_case(&self, id: Uuid) -> Result<(), SentinelError> {
        let request = self.table(Method::DELETE, TEST_CASES).query(&[("id", eq(id))]);
        self.send(request).await?;
        Ok(())
    }

    async fn latest_analysis(&self, project_id: Uuid) -> Result<Option<AnalysisResult>, SentinelError> {
        let request = self.table(Method::GET, ANALYSES).query(&[
            ("select", "*".to_string()),
            ("project_id", eq(project_id)),
            ("order", "created_at.desc".to_string()),
            ("limit", "1".to_string()),
        ]);
        let rows: Vec<AnalysisResult> = self.fetch(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_analysis(&self, analysis: NewAnalysisResult) -> Result<AnalysisResult, SentinelError> {
        let request = self.table(Method::POST, ANALYSES).json(&analysis);
        self.single(request, "created analysis".to_string()).await
    }

    async fn generate_test_cases(&self, request: &GenerateRequest) -> Result<Vec<TestCase>, SentinelError> {
        debug!(project_id = %request.project_id, "calling generate-test-cases");
        let envelope: Envelope<Vec<TestCase>> =
            self.fetch(self.function("generate-test-cases").json(request)).await?;
        Ok(envelope.data)
    }

    async fn analyze_tests(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, SentinelError> {
        debug!(project_id = %request.project_id, "calling analyze-tests");
        let envelope: Envelope<AnalysisResult> =
            self.fetch(self.function("analyze-tests").json(request)).await?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let store = HttpProjectStore::new("http://localhost:54321/", "key");
        assert_eq!(store.base_url(), "http://localhost:54321");
        let store = store.with_base_url("http://127.0.0.1:9000");
        assert_eq!(store.base_url(), "http://127.0.0.1:9000");
    }

    #[test]
    fn test_envelope_accepts_legacy_keys() {
        let data: Envelope<Vec<u8>> = serde_json::from_str(r#"{"success":true,"data":[1]}"#).unwrap();
        assert_eq!(data.data, vec![1]);
        let legacy: Envelope<Vec<u8>> = serde_json::from_str(r#"{"success":true,"testCases":[2]}"#).unwrap();
        assert_eq!(legacy.data, vec![2]);
    }

    #[test]
    fn test_error_body_message() {
        let body: ErrorBody = serde_json::from_str(r#"{"message":"denied"}"#).unwrap();
        assert_eq!(body.error, "denied");
    }
}
