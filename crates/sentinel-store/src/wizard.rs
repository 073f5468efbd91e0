//! Three-phase project wizard: input, test generation, analysis.
//!
//! The wizard keeps a *view* phase separate from the project's stored
//! phase. Forward actions persist `max(stored, target)` so the stored phase
//! never decreases; `back` only moves the view. Store failures become a
//! dismissible [`Banner`] and the failed action is remembered for
//! [`ProjectWizard::retry`]. Nothing is retried automatically.

use crate::draft::TestCaseDraft;
use crate::export::{analysis_export, analysis_file_name, AnalysisExport};
use crate::functions::{AnalyzeRequest, GenerateRequest};
use crate::store::ProjectStore;
use chrono::Utc;
use sentinel_core::{
    AnalysisResult, NewProject, Phase, Priority, Project, ProjectParameters, ProjectUpdate,
    SentinelError, TestCase, TestKind,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Phase-1 form
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectForm {
    pub name: String,
    pub module_name: String,
    pub test_kind: TestKind,
    pub parameters: ProjectParameters,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub message: String,
    pub retryable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriorityStats {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl PriorityStats {
    pub fn of(tests: &[TestCase]) -> Self {
        let count = |p: Priority| tests.iter().filter(|t| t.priority == p).count();
        Self {
            high: count(Priority::High),
            medium: count(Priority::Medium),
            low: count(Priority::Low),
            total: tests.len(),
        }
    }
}

/// Action remembered after a failure
#[derive(Debug, Clone, PartialEq)]
enum PendingAction {
    SubmitPhase1(ProjectForm),
    EnterPhase2,
    Generate,
    SaveTestCase {
        editing: Option<Uuid>,
        draft: TestCaseDraft,
    },
    DeleteTestCase(Uuid),
    CompletePhase2,
    EnterPhase3,
    Analyze,
}

pub struct ProjectWizard {
    store: Arc<dyn ProjectStore>,
    owner: String,
    project: Option<Project>,
    view: Phase,
    test_cases: Vec<TestCase>,
    analysis: Option<AnalysisResult>,
    banner: Option<Banner>,
    pending: Option<PendingAction>,
}

impl ProjectWizard {
    /// Wizard for a new project
    pub fn new(store: Arc<dyn ProjectStore>, owner: impl Into<String>) -> Self {
        Self {
            store,
            owner: owner.into(),
            project: None,
            view: Phase::Input,
            test_cases: Vec::new(),
            analysis: None,
            banner: None,
            pending: None,
        }
    }

    /// Resume an existing project at its stored phase
    pub async fn open(store: Arc<dyn ProjectStore>, owner: impl Into<String>, project_id: Uuid) -> Result<Self, SentinelError> {
        let project = store.get_project(project_id).await?;
        let mut wizard = Self::new(store, owner);
        wizard.view = project.current_phase;
        wizard.project = Some(project);
        Ok(wizard)
    }

    pub fn project(&self) -> Option<&Project> {
        self.project.as_ref()
    }

    pub fn view(&self) -> Phase {
        self.view
    }

    pub fn test_cases(&self) -> &[TestCase] {
        &self.test_cases
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn priority_stats(&self) -> PriorityStats {
        PriorityStats::of(&self.test_cases)
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    fn current(&self) -> Result<&Project, SentinelError> {
        self.project
            .as_ref()
            .ok_or_else(|| SentinelError::State("no project loaded".to_string()))
    }

    fn fail(&mut self, action: PendingAction, what: &str, err: SentinelError) -> SentinelError {
        error!(error = %err, "{}", what);
        self.banner = Some(Banner {
            message: format!("{}: {}", what, err),
            retryable: matches!(err, SentinelError::Network(_) | SentinelError::Remote { .. }),
        });
        self.pending = Some(action);
        err
    }

    fn succeeded(&mut self) {
        self.banner = None;
        self.pending = None;
    }

    // ========================================================================
    // PHASE 1
    // ========================================================================

    /// Create or update the project, then enter phase 2
    pub async fn submit_phase1(&mut self, form: ProjectForm) -> Result<(), SentinelError> {
        if form.name.trim().is_empty() || form.module_name.trim().is_empty() {
            return Err(SentinelError::InvalidInput(
                "Project name and module name are required".to_string(),
            ));
        }

        let saved = match &self.project {
            Some(existing) => {
                let update = ProjectUpdate {
                    name: Some(form.name.clone()),
                    module_name: Some(form.module_name.clone()),
                    test_kind: Some(form.test_kind),
                    parameters: Some(form.parameters.clone()),
                    current_phase: Some(existing.current_phase.max(Phase::Generation)),
                    updated_at: Some(Utc::now()),
                };
                self.store.update_project(existing.id, update).await
            }
            None => {
                self.store
                    .create_project(NewProject {
                        owner: self.owner.clone(),
                        name: form.name.clone(),
                        module_name: form.module_name.clone(),
                        test_kind: form.test_kind,
                        parameters: form.parameters.clone(),
                        current_phase: Phase::Generation,
                    })
                    .await
            }
        };

        match saved {
            Ok(project) => {
                info!(project_id = %project.id, "project saved");
                self.project = Some(project);
                self.succeeded();
                self.enter_phase2().await
            }
            Err(e) => Err(self.fail(PendingAction::SubmitPhase1(form), "Failed to save project", e)),
        }
    }

    // ========================================================================
    // PHASE 2
    // ========================================================================

    /// Show phase 2; generates test cases when none are stored yet
    pub async fn enter_phase2(&mut self) -> Result<(), SentinelError> {
        let project_id = self.current()?.id;
        self.view = Phase::Generation;

        match self.store.list_test_cases(project_id).await {
            Ok(rows) => {
                self.test_cases = rows;
                self.succeeded();
            }
            Err(e) => return Err(self.fail(PendingAction::EnterPhase2, "Failed to load test cases", e)),
        }

        if self.test_cases.is_empty() {
            self.generate().await?;
        }
        Ok(())
    }

    /// Call the generation endpoint and reload the list
    pub async fn generate(&mut self) -> Result<(), SentinelError> {
        let project = self.current()?;
        let request = GenerateRequest {
            project_id: project.id,
            project_name: project.name.clone(),
            module_name: project.module_name.clone(),
            test_kind: project.test_kind.as_str().to_string(),
            parameters: project.parameters.clone(),
        };

        let result = match self.store.generate_test_cases(&request).await {
            Ok(_) => self.store.list_test_cases(request.project_id).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(rows) => {
                info!(project_id = %request.project_id, count = rows.len(), "test cases loaded");
                self.test_cases = rows;
                self.succeeded();
                Ok(())
            }
            Err(e) => Err(self.fail(PendingAction::Generate, "Failed to generate test cases", e)),
        }
    }

    /// Create (`editing = None`) or update a test case from the editor
    pub async fn save_test_case(&mut self, editing: Option<Uuid>, draft: &TestCaseDraft) -> Result<TestCase, SentinelError> {
        let valid = draft.parse()?;
        let project_id = self.current()?.id;

        let saved = match editing {
            Some(id) => self.store.update_test_case(id, valid.into_update()).await,
            None => self.store.create_test_case(valid.into_new(project_id)).await,
        };
        let row = match saved {
            Ok(row) => row,
            Err(e) => {
                let action = PendingAction::SaveTestCase {
                    editing,
                    draft: draft.clone(),
                };
                return Err(self.fail(action, "Failed to save test case", e));
            }
        };

        match self.test_cases.iter_mut().find(|t| t.id == row.id) {
            Some(slot) => *slot = row.clone(),
            None => self.test_cases.insert(0, row.clone()),
        }
        self.succeeded();
        Ok(row)
    }

    pub async fn delete_test_case(&mut self, id: Uuid) -> Result<(), SentinelError> {
        if let Err(e) = self.store.delete_test_case(id).await {
            return Err(self.fail(PendingAction::DeleteTestCase(id), "Failed to delete test case", e));
        }
        self.test_cases.retain(|t| t.id != id);
        self.succeeded();
        Ok(())
    }

    /// Persist phase 3 and enter it
    pub async fn complete_phase2(&mut self) -> Result<(), SentinelError> {
        let project = self.current()?;
        let update = ProjectUpdate {
            current_phase: Some(project.current_phase.max(Phase::Analysis)),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };

        match self.store.update_project(project.id, update).await {
            Ok(saved) => {
                self.project = Some(saved);
                self.succeeded();
                self.enter_phase3().await
            }
            Err(e) => Err(self.fail(PendingAction::CompletePhase2, "Failed to advance to analysis", e)),
        }
    }

    // ========================================================================
    // PHASE 3
    // ========================================================================

    /// Show phase 3; runs an analysis when none is stored yet
    pub async fn enter_phase3(&mut self) -> Result<(), SentinelError> {
        let project_id = self.current()?.id;
        self.view = Phase::Analysis;

        let loaded = match self.store.list_test_cases(project_id).await {
            Ok(rows) => {
                self.test_cases = rows;
                self.store.latest_analysis(project_id).await
            }
            Err(e) => Err(e),
        };
        match loaded {
            Ok(Some(analysis)) => {
                self.analysis = Some(analysis);
                self.succeeded();
                Ok(())
            }
            Ok(None) => {
                self.succeeded();
                self.run_analysis().await
            }
            Err(e) => Err(self.fail(PendingAction::EnterPhase3, "Failed to load analysis", e)),
        }
    }

    /// Call the analysis endpoint
    pub async fn run_analysis(&mut self) -> Result<(), SentinelError> {
        let project = self.current()?;
        let request = AnalyzeRequest {
            project_id: project.id,
            test_kind: project.test_kind.as_str().to_string(),
        };

        match self.store.analyze_tests(&request).await {
            Ok(analysis) => {
                info!(project_id = %request.project_id, coverage = analysis.coverage_level, "analysis loaded");
                self.analysis = Some(analysis);
                self.succeeded();
                Ok(())
            }
            Err(e) => Err(self.fail(PendingAction::Analyze, "Failed to analyze tests", e)),
        }
    }

    pub fn export(&self) -> Result<AnalysisExport, SentinelError> {
        let project = self.current()?;
        Ok(analysis_export(project, &self.test_cases, self.analysis.as_ref()))
    }

    /// Write the export into `dir`, returning the file path
    pub async fn export_to(&self, dir: &Path) -> Result<PathBuf, SentinelError> {
        let export = self.export()?;
        let path = dir.join(analysis_file_name(&export.project.name));
        tokio::fs::write(&path, serde_json::to_string_pretty(&export)?).await?;
        info!(path = %path.display(), "analysis exported");
        Ok(path)
    }

    // ========================================================================
    // NAVIGATION
    // ========================================================================

    /// Step the view back one phase without touching the stored phase
    pub fn back(&mut self) -> Phase {
        if let Some(previous) = self.view.previous() {
            self.view = previous;
        }
        self.view
    }

    /// Re-run the action that last failed
    pub async fn retry(&mut self) -> Result<(), SentinelError> {
        let Some(action) = self.pending.take() else {
            warn!("retry requested with nothing pending");
            return Ok(());
        };

        self.banner = None;
        match action {
            PendingAction::SubmitPhase1(form) => self.submit_phase1(form).await,
            PendingAction::EnterPhase2 => self.enter_phase2().await,
            PendingAction::Generate => self.generate().await,
            PendingAction::SaveTestCase { editing, draft } => {
                self.save_test_case(editing, &draft).await.map(|_| ())
            }
            PendingAction::DeleteTestCase(id) => self.delete_test_case(id).await,
            PendingAction::CompletePhase2 => self.complete_phase2().await,
            PendingAction::EnterPhase3 => self.enter_phase3().await,
            PendingAction::Analyze => self.run_analysis().await,
        }
    }

    pub fn has_pending_retry(&self) -> bool {
        self.pending.is_some()
    }
}
