//! Analyzer Trait: the single contract every analyzer module implements

/// A pure, synchronous analysis over a source-code string.
///
/// Implementations may fail internally; callers go through
/// [`crate::AnalysisRunner`], which substitutes `Output::default()` for any
/// error or panic.
pub trait Analyzer: Send + Sync {
    type Output: Default;

    /// Unique analyzer ID (e.g. "security.v1")
    fn id(&self) -> &'static str;

    /// Run the analysis
    fn analyze(&self, code: &str) -> Result<Self::Output, AnalyzerError>;
}

#[derive(Debug, Clone)]
pub enum AnalyzerError {
    InvalidInput(String),
    Internal(String),
}

impl std::fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "ANALYZE/INPUT: {}", msg),
            Self::Internal(msg) => write!(f, "ANALYZE/INTERNAL: {}", msg),
        }
    }
}

impl std::error::Error for AnalyzerError {}
