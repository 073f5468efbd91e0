//! # Sentinel Analyzers
//!
//! Pattern matchers and the analyzer modules built on them.
//!
//! Every analyzer is a pure function of the code buffer behind the
//! [`sentinel_core::Analyzer`] trait. None of them parse the input: they
//! approximate code smells with regexes and substring checks and map each
//! hit to a canned finding.

pub mod complexity;
pub mod coverage;
pub mod language;
pub mod matchers;
pub mod memory;
pub mod perf;
pub mod quality;
pub mod security;
pub mod testgen;

pub use complexity::{
    complexity_profile, improvement_text, ComplexityEstimate, ComplexityProfile, ComplexityProfiler,
    PerformanceAnalyzer,
};
pub use coverage::{CoverageAnalyzer, CoverageReport};
pub use language::{detect_language, language_findings, Language};
pub use matchers::{Detector, FnDetector};
pub use memory::{MemoryAnalyzer, MemoryProfile};
pub use perf::{run_performance_suite, PerfStatus, PerformanceReport, PerformanceResult, ResultOrigin};
pub use quality::{QualityAnalyzer, QualityMetrics};
pub use security::{SecurityAnalyzer, SecurityCategory, SecurityIssue};
pub use testgen::{GeneratedTest, TestCaseGenerator, TestCategory, TestComplexity};
