//! Sentinel Core: data model, error taxonomy, configuration and the guarded
//! analyzer runner.
//!
//! Every analyzer in the workspace implements [`Analyzer`]; the
//! [`AnalysisRunner`] executes them best-effort so a faulty analyzer degrades
//! to its default output instead of failing the whole run.

pub mod analyzer;
pub mod config;
pub mod context;
pub mod data_model;
pub mod error;
pub mod rows;
pub mod runner;

pub use analyzer::{Analyzer, AnalyzerError};
pub use config::SentinelConfig;
pub use context::RunContext;
pub use data_model::{
    AlgorithmAdvice, ComplexityShift, Finding, FindingKind, Severity, SpaceShift,
};
pub use error::SentinelError;
pub use rows::{
    AnalysisIssue, AnalysisResult, Insight, NewAnalysisResult, NewProject, NewTestCase, Phase,
    Priority, Project, ProjectParameters, ProjectUpdate, Recommendation, TestCase,
    TestCaseUpdate, TestKind, TestStatus,
};
pub use runner::{AnalysisRunner, StageReport, StageStatus};

/// Engine version stamped into exported reports
pub const SENTINEL_VERSION: &str = "1.0.0";
