//! # Sentinel Repair
//!
//! The repair orchestrator. A [`RepairSession`] holds the code buffer, the
//! findings of the latest analysis, the applied-fix set and the repair
//! history; the [`Orchestrator`] runs the analyzers against it and adds the
//! asynchronous pieces (simulated latency, the performance suite, the test
//! runner and report export).
//!
//! Fixes are literal, single-occurrence substitutions of a finding's
//! snippet. When an earlier fix already rewrote that region the snippet is
//! gone and the fix silently does nothing.

pub mod metrics;
pub mod orchestrator;
pub mod report;
pub mod session;
pub mod test_runner;

pub use metrics::{AnalysisTab, DerivedMetrics, OptimizationSummary, SummaryMetrics};
pub use orchestrator::{basic_mode_finding, Orchestrator, BASIC_MODE_NOTICE};
pub use report::{report_file_name, RepairReport};
pub use session::{
    AnalysisSnapshot, AnalysisTicket, FixOutcome, RepairEntry, RepairSession, SessionState,
    SmartRepairOutcome,
};
pub use test_runner::{TestResult, TestRunSummary};
