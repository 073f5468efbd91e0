//! Analysis Runner: executes analyzers best-effort and records a report per stage
use crate::analyzer::Analyzer;
use crate::context::RunContext;
use serde::{Deserialize, Serialize};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Completed,
    /// The analyzer failed and its default output was used
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageReport {
    pub id: String,
    pub in_hash: String,
    pub latency_ms: u64,
    pub status: StageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct AnalysisRunner;

impl AnalysisRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run one analyzer. Never fails: errors and panics yield `Output::default()`.
    pub fn run<A: Analyzer + ?Sized>(
        &self,
        analyzer: &A,
        code: &str,
        ctx: &RunContext,
    ) -> (A::Output, StageReport) {
        let start = Instant::now();
        let in_hash = hash_code(code);

        let outcome = catch_unwind(AssertUnwindSafe(|| analyzer.analyze(code)));
        let latency_ms = start.elapsed().as_millis() as u64;

        let (output, status, error) = match outcome {
            Ok(Ok(output)) => (output, StageStatus::Completed, None),
            Ok(Err(e)) => {
                tracing::warn!(trace_id = %ctx.trace_id, stage = analyzer.id(), error = %e, "analyzer failed, using default result");
                (A::Output::default(), StageStatus::Fallback, Some(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(trace_id = %ctx.trace_id, stage = analyzer.id(), "analyzer panicked, using default result");
                (
                    A::Output::default(),
                    StageStatus::Fallback,
                    Some("analyzer panicked".to_string()),
                )
            }
        };

        tracing::debug!(trace_id = %ctx.trace_id, stage = analyzer.id(), latency_ms, "stage finished");

        (
            output,
            StageReport {
                id: analyzer.id().to_string(),
                in_hash,
                latency_ms,
                status,
                error,
            },
        )
    }
}

/// Content hash of an analyzed buffer
pub fn hash_code(code: &str) -> String {
    format!("blake3:{}", blake3::hash(code.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::AnalyzerError;

    struct LineCounter;

    impl Analyzer for LineCounter {
        type Output = usize;

        fn id(&self) -> &'static str {
            "lines.v1"
        }

        fn analyze(&self, code: &str) -> Result<usize, AnalyzerError> {
            Ok(code.lines().count())
        }
    }

    struct Failing;

    impl Analyzer for Failing {
        type Output = Vec<String>;

        fn id(&self) -> &'static str {
            "failing.v1"
        }

        fn analyze(&self, _code: &str) -> Result<Vec<String>, AnalyzerError> {
            Err(AnalyzerError::Internal("boom".to_string()))
        }
    }

    struct Panicking;

    impl Analyzer for Panicking {
        type Output = Vec<String>;

        fn id(&self) -> &'static str {
            "panicking.v1"
        }

        fn analyze(&self, _code: &str) -> Result<Vec<String>, AnalyzerError> {
            panic!("unexpected input")
        }
    }

    #[test]
    fn test_completed_stage() {
        let ctx = RunContext::new();
        let (lines, report) = AnalysisRunner::new().run(&LineCounter, "a\nb\nc", &ctx);
        assert_eq!(lines, 3);
        assert_eq!(report.status, StageStatus::Completed);
        assert!(report.in_hash.starts_with("blake3:"));
    }

    #[test]
    fn test_error_becomes_default() {
        let ctx = RunContext::new();
        let (out, report) = AnalysisRunner::new().run(&Failing, "code", &ctx);
        assert!(out.is_empty());
        assert_eq!(report.status, StageStatus::Fallback);
        assert_eq!(report.error.as_deref(), Some("ANALYZE/INTERNAL: boom"));
    }

    #[test]
    fn test_panic_becomes_default() {
        let ctx = RunContext::new();
        let (out, report) = AnalysisRunner::new().run(&Panicking, "code", &ctx);
        assert!(out.is_empty());
        assert_eq!(report.status, StageStatus::Fallback);
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash_code("x"), hash_code("x"));
        assert_ne!(hash_code("x"), hash_code("y"));
    }
}
