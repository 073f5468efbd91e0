//! Sentinel Store: the Remote Project Store and the project wizard.
//!
//! - [`ProjectStore`]: projects, test cases, analysis results and the two
//!   scoring endpoints behind one async trait
//! - [`HttpProjectStore`]: REST client for the hosted store
//! - [`InMemoryStore`]: in-process tables sharing the endpoint logic in
//!   [`functions`]
//! - [`ProjectWizard`]: the input, generation and analysis phases

pub mod draft;
pub mod export;
pub mod functions;
pub mod http;
pub mod memory;
pub mod store;
pub mod wizard;

pub use draft::{TestCaseDraft, ValidTestCase, INVALID_JSON};
pub use export::{analysis_export, analysis_file_name, AnalysisExport};
pub use functions::{
    analyze_into, coverage_level, generate_into, score_test_cases, scenarios_for, AnalyzeRequest,
    GenerateRequest, Scenario,
};
pub use http::HttpProjectStore;
pub use memory::InMemoryStore;
pub use store::ProjectStore;
pub use wizard::{Banner, PriorityStats, ProjectForm, ProjectWizard};

use sentinel_core::SentinelConfig;
use std::sync::Arc;
use tracing::info;

/// The hosted store when a credential is configured, else in-process tables
pub fn store_from_config(config: &SentinelConfig) -> Arc<dyn ProjectStore> {
    if config.anon_key.is_empty() {
        info!("no store credential configured, using in-memory store");
        Arc::new(InMemoryStore::new())
    } else {
        info!(url = %config.store_url, "using hosted project store");
        Arc::new(HttpProjectStore::from_config(config))
    }
}
