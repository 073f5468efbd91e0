//! In-process store used by the API server and the wizard tests
use crate::functions::{analyze_into, generate_into, AnalyzeRequest, GenerateRequest};
use crate::store::ProjectStore;
use async_trait::async_trait;
use chrono::Utc;
use sentinel_core::{
    AnalysisResult, NewAnalysisResult, NewProject, NewTestCase, Project, ProjectUpdate,
    SentinelError, TestCase, TestCaseUpdate,
};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    test_cases: Vec<TestCase>,
    analyses: Vec<AnalysisResult>,
}

/// Tables kept in insertion order; "newest first" reads walk them backwards
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn test_case_row(row: NewTestCase) -> TestCase {
        let now = Utc::now();
        TestCase {
            id: Uuid::new_v4(),
            project_id: row.project_id,
            title: row.title,
            description: row.description,
            input: row.input,
            expected_output: row.expected_output,
            priority: row.priority,
            status: row.status,
            created_at: now,
            updated_at: now,
        }
    }
}

fn project_not_found(id: Uuid) -> SentinelError {
    SentinelError::NotFound(format!("project {}", id))
}

fn test_case_not_found(id: Uuid) -> SentinelError {
    SentinelError::NotFound(format!("test case {}", id))
}

#[async_trait]
impl ProjectStore for InMemoryStore {
    async fn create_project(&self, project: NewProject) -> Result<Project, SentinelError> {
        let now = Utc::now();
        let row = Project {
            id: Uuid::new_v4(),
            owner: project.owner,
            name: project.name,
            module_name: project.module_name,
            test_kind: project.test_kind,
            parameters: project.parameters,
            current_phase: project.current_phase,
            created_at: now,
            updated_at: now,
        };

        self.tables.write().await.projects.push(row.clone());
        debug!(project_id = %row.id, "project created");
        Ok(row)
    }

    async fn get_project(&self, id: Uuid) -> Result<Project, SentinelError> {
        self.tables
            .read()
            .await
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| project_not_found(id))
    }

    async fn update_project(&self, id: Uuid, update: ProjectUpdate) -> Result<Project, SentinelError> {
        let mut tables = self.tables.write().await;
        let project = tables
            .projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| project_not_found(id))?;

        if let Some(name) = update.name {
            project.name = name;
        }
        if let Some(module_name) = update.module_name {
            project.module_name = module_name;
        }
        if let Some(kind) = update.test_kind {
            project.test_kind = kind;
        }
        if let Some(parameters) = update.parameters {
            project.parameters = parameters;
        }
        if let Some(phase) = update.current_phase {
            project.current_phase = phase;
        }
        project.updated_at = update.updated_at.unwrap_or_else(Utc::now);

        Ok(project.clone())
    }

    async fn list_projects(&self, owner: &str) -> Result<Vec<Project>, SentinelError> {
        let tables = self.tables.read().await;
        Ok(tables
            .projects
            .iter()
            .rev()
            .filter(|p| p.owner == owner)
            .cloned()
            .collect())
    }

    async fn delete_project(&self, id: Uuid) -> Result<(), SentinelError> {
        let mut tables = self.tables.write().await;
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        if tables.projects.len() == before {
            return Err(project_not_found(id));
        }

        tables.test_cases.retain(|t| t.project_id != id);
        tables.analyses.retain(|a| a.project_id != id);
        debug!(project_id = %id, "project deleted");
        Ok(())
    }

    async fn list_test_cases(&self, project_id: Uuid) -> Result<Vec<TestCase>, SentinelError> {
        let tables = self.tables.read().await;
        Ok(tables
            .test_cases
            .iter()
            .rev()
            .filter(|t| t.project_id == project_id)
            .cloned()
            .collect())
    }

    async fn create_test_case(&self, test_case: NewTestCase) -> Result<TestCase, SentinelError> {
        let mut inserted = self.insert_test_cases(vec![test_case]).await?;
        inserted
            .pop()
            .ok_or_else(|| SentinelError::State("insert returned no row".to_string()))
    }

    async fn insert_test_cases(&self, rows: Vec<NewTestCase>) -> Result<Vec<TestCase>, SentinelError> {
        let mut tables = self.tables.write().await;
        if let Some(orphan) = rows
            .iter()
            .find(|r| !tables.projects.iter().any(|p| p.id == r.project_id))
        {
            return Err(project_not_found(orphan.project_id));
        }

        let inserted: Vec<TestCase> = rows.into_iter().map(Self::test_case_row).collect();
        tables.test_cases.extend(inserted.iter().cloned());
        Ok(inserted)
    }

    async fn update_test_case(&self, id: Uuid, update: TestCaseUpdate) -> Result<TestCase, SentinelError> {
        let mut tables = self.tables.write().await;
        let row = tables
            .test_cases
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| test_case_not_found(id))?;

        if let Some(title) = update.title {
            row.title = title;
        }
        if let Some(description) = update.description {
            row.description = description;
        }
        if let Some(input) = update.input {
            row.input = input;
        }
        if let Some(expected) = update.expected_output {
            row.expected_output = expected;
        }
        if let Some(priority) = update.priority {
            row.priority = priority;
        }
        if let Some(status) = update.status {
            row.status = status;
        }
        row.updated_at = Utc::now();

        Ok(row.clone())
    }

    async fn delete_test_case(&self, id: Uuid) -> Result<(), SentinelError> {
        let mut tables = self.tables.write().await;
        let before = tables.test_cases.len();
        tables.test_cases.retain(|t| t.id != id);
        if tables.test_cases.len() == before {
            return Err(test_case_not_found(id));
        }
        Ok(())
    }

    async fn latest_analysis(&self, project_id: Uuid) -> Result<Option<AnalysisResult>, SentinelError> {
        let tables = self.tables.read().await;
        Ok(tables
            .analyses
            .iter()
            .rev()
            .find(|a| a.project_id == project_id)
            .cloned())
    }

    async fn insert_analysis(&self, analysis: NewAnalysisResult) -> Result<AnalysisResult, SentinelError> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == analysis.project_id) {
            return Err(project_not_found(analysis.project_id));
        }

        let row = AnalysisResult {
            id: Uuid::new_v4(),
            project_id: analysis.project_id,
            coverage_level: analysis.coverage_level,
            insights: analysis.insights,
            errors: analysis.errors,
            recommendations: analysis.recommendations,
            created_at: Utc::now(),
        };
        tables.analyses.push(row.clone());
        Ok(row)
    }

    async fn generate_test_cases(&self, request: &GenerateRequest) -> Result<Vec<TestCase>, SentinelError> {
        generate_into(self, request).await
    }

    async fn analyze_tests(&self, request: &AnalyzeRequest) -> Result<AnalysisResult, SentinelError> {
        analyze_into(self, request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sentinel_core::{Phase, Priority, ProjectParameters, TestKind, TestStatus};
    use serde_json::json;

    fn new_project(owner: &str, name: &str) -> NewProject {
        NewProject {
            owner: owner.to_string(),
            name: name.to_string(),
            module_name: "auth".to_string(),
            test_kind: TestKind::Unit,
            parameters: ProjectParameters::default(),
            current_phase: Phase::Input,
        }
    }

    fn new_test_case(project_id: Uuid, title: &str) -> NewTestCase {
        NewTestCase {
            project_id,
            title: title.to_string(),
            description: String::new(),
            input: json!({}),
            expected_output: json!({}),
            priority: Priority::Medium,
            status: TestStatus::Pending,
        }
    }

    #[tokio::test]
    async fn test_projects_listed_newest_first_per_owner() {
        let store = InMemoryStore::new();
        store.create_project(new_project("alice", "first")).await.unwrap();
        store.create_project(new_project("bob", "other")).await.unwrap();
        store.create_project(new_project("alice", "second")).await.unwrap();

        let names: Vec<String> = store
            .list_projects("alice")
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["second", "first"]);
    }

    #[tokio::test]
    async fn test_delete_project_cascades() {
        let store = InMemoryStore::new();
        let project = store.create_project(new_project("alice", "p")).await.unwrap();
        store.create_test_case(new_test_case(project.id, "t")).await.unwrap();

        store.delete_project(project.id).await.unwrap();
        assert!(store.list_test_cases(project.id).await.unwrap().is_empty());
        assert!(matches!(
            store.get_project(project.id).await,
            Err(SentinelError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_orphan_test_case_rejected() {
        let store = InMemoryStore::new();
        let result = store.create_test_case(new_test_case(Uuid::new_v4(), "t")).await;
        assert!(matches!(result, Err(SentinelError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_test_case_fields() {
        let store = InMemoryStore::new();
        let project = store.create_project(new_project("alice", "p")).await.unwrap();
        let row = store.create_test_case(new_test_case(project.id, "t")).await.unwrap();

        let updated = store
            .update_test_case(
                row.id,
                TestCaseUpdate {
                    status: Some(TestStatus::Failed),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, TestStatus::Failed);
        assert_eq!(updated.title, "t");
    }
}
