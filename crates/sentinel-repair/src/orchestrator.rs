//! Orchestrator: drives the analyzers over a shared repair session.
//!
//! Analysis stages run sequentially through the guarded [`AnalysisRunner`],
//! so one failing analyzer degrades to its default output and the run
//! continues. The session sits behind an async mutex that is never held
//! across a delay; overlapping runs are resolved by the session's
//! generation counter (the newest run wins).

use crate::report::{report_file_name, RepairReport};
use crate::session::{AnalysisSnapshot, RepairSession};
use crate::test_runner::{self, TestRunSummary};
use chrono::Utc;
use sentinel_analyzers::{
    detect_language, language_findings, run_performance_suite, ComplexityProfiler, CoverageAnalyzer, Language,
    MemoryAnalyzer, PerformanceAnalyzer, PerformanceReport, QualityAnalyzer, SecurityAnalyzer,
    TestCaseGenerator,
};
use sentinel_core::{
    Analyzer, AnalysisRunner, ComplexityShift, Finding, FindingKind, RunContext, SentinelConfig,
    SentinelError, Severity, SpaceShift, StageStatus,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

pub const BASIC_MODE_NOTICE: &str = "Using basic analysis mode...";

/// Finding shown when the performance stage itself fails
pub fn basic_mode_finding() -> Finding {
    Finding {
        id: "fallback-1".to_string(),
        kind: FindingKind::Performance,
        severity: Severity::Medium,
        message: "Code analysis completed with basic mode".to_string(),
        line: 1,
        fix: "Review code for potential optimizations".to_string(),
        code_snippet: "// Your code is being analyzed".to_string(),
        suggested_fix: "// Consider performance optimizations".to_string(),
        confidence: 85,
        explanation: "Basic pattern detection for code analysis.".to_string(),
        time_complexity: Some(ComplexityShift {
            current: "O(n)".to_string(),
            improved: "O(log n)".to_string(),
            improvement: "60% faster".to_string(),
            explanation: String::new(),
        }),
        space_complexity: Some(SpaceShift {
            current: "O(n)".to_string(),
            improved: "O(1)".to_string(),
        }),
        recommendation: None,
    }
}

#[derive(Clone)]
pub struct Orchestrator {
    config: SentinelConfig,
    runner: AnalysisRunner,
    performance: Arc<dyn Analyzer<Output = Vec<Finding>>>,
    session: Arc<Mutex<RepairSession>>,
}

impl Orchestrator {
    pub fn new(config: SentinelConfig) -> Self {
        Self {
            config,
            runner: AnalysisRunner::new(),
            performance: Arc::new(PerformanceAnalyzer::new()),
            session: Arc::new(Mutex::new(RepairSession::new())),
        }
    }

    /// Replace the performance stage (the first analyzer of every run)
    pub fn with_performance_analyzer(mut self, analyzer: impl Analyzer<Output = Vec<Finding>> + 'static) -> Self {
        self.performance = Arc::new(analyzer);
        self
    }

    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    /// Exclusive access to the session for synchronous actions
    pub async fn session(&self) -> MutexGuard<'_, RepairSession> {
        self.session.lock().await
    }

    pub async fn edit_code(&self, code: impl Into<String>) {
        self.session.lock().await.edit_code(code);
    }

    /// Run every analyzer over the current buffer.
    ///
    /// Returns `Ok(false)` when a newer run started meanwhile and this
    /// result was discarded.
    pub async fn analyze(&self) -> Result<bool, SentinelError> {
        let ticket = self.session.lock().await.begin_analysis()?;
        let language = detect_language(&ticket.code);
        let ctx = RunContext::new().with_language(language.as_str());

        info!(trace_id = %ctx.trace_id, generation = ticket.generation, language = %language, "analysis requested");
        tokio::time::sleep(self.config.analysis_delay()).await;

        let snapshot = self.run_stages(&ticket.code, language, &ctx);
        Ok(self.session.lock().await.commit_analysis(ticket, snapshot))
    }

    fn run_stages(&self, code: &str, language: Language, ctx: &RunContext) -> AnalysisSnapshot {
        let mut stages = Vec::new();
        let mut notice = None;

        let (mut findings, report) = self.runner.run(self.performance.as_ref(), code, ctx);
        if report.status == StageStatus::Fallback {
            warn!(trace_id = %ctx.trace_id, "performance stage failed, using basic mode");
            findings = vec![basic_mode_finding()];
            notice = Some(BASIC_MODE_NOTICE.to_string());
        }
        stages.push(report);

        let (test_cases, report) = self.runner.run(&TestCaseGenerator::new(), code, ctx);
        stages.push(report);

        let (coverage, report) = self.runner.run(&CoverageAnalyzer::new(test_cases.len()), code, ctx);
        stages.push(report);

        let (security_issues, report) = self.runner.run(&SecurityAnalyzer::new(), code, ctx);
        stages.push(report);

        let (quality, report) = self.runner.run(&QualityAnalyzer::new(), code, ctx);
        stages.push(report);

        let (memory, report) = self.runner.run(&MemoryAnalyzer::new(), code, ctx);
        stages.push(report);

        let (complexity, report) = self.runner.run(&ComplexityProfiler, code, ctx);
        stages.push(report);

        AnalysisSnapshot {
            findings,
            security_issues,
            quality,
            memory,
            coverage,
            test_cases,
            complexity,
            language_notes: language_findings(code, language),
            stages,
            notice,
        }
    }

    /// Run the performance suite against its deadline and store the rows
    pub async fn run_performance_tests(&self) -> Result<PerformanceReport, SentinelError> {
        let code = self.session.lock().await.current_code().to_string();
        if code.trim().is_empty() {
            return Err(SentinelError::InvalidInput("Please enter some code to test".to_string()));
        }

        let report = run_performance_suite(&code, self.config.perf_delay(), self.config.perf_timeout()).await;
        info!(rows = report.results.len(), fallback = report.is_fallback(), "performance tests finished");

        self.session.lock().await.set_performance(report.clone());
        Ok(report)
    }

    /// Run the generated test cases of the latest analysis
    pub async fn run_tests(&self) -> TestRunSummary {
        let (code, tests) = {
            let session = self.session.lock().await;
            let tests = session
                .analysis()
                .map(|a| a.test_cases.clone())
                .unwrap_or_default();
            (session.current_code().to_string(), tests)
        };

        let summary = test_runner::run_tests(&code, &tests, self.config.test_step_delay()).await;
        self.session.lock().await.set_test_run(summary.clone());
        summary
    }

    /// Write the session report into the export directory
    pub async fn export_report(&self) -> Result<PathBuf, SentinelError> {
        let now = Utc::now();
        let json = {
            let session = self.session.lock().await;
            RepairReport::from_session(&session, now).to_json_pretty()?
        };

        let path = self.config.export_dir.join(report_file_name(now));
        tokio::fs::write(&path, json).await?;

        info!(path = %path.display(), "report exported");
        Ok(path)
    }
}
