//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SentinelError {
    #[error("NET/{0}")]
    Network(String),

    #[error("REMOTE/{status}: {message}")]
    Remote { status: u16, message: String },

    #[error("INPUT/{0}")]
    InvalidInput(String),

    #[error("NOTFOUND/{0}")]
    NotFound(String),

    #[error("SERIALIZE/{0}")]
    Serialize(String),

    #[error("CONFIG/{0}")]
    Config(String),

    #[error("STATE/{0}")]
    State(String),

    #[error("IO/{0}")]
    Io(#[from] std::io::Error),
}

impl SentinelError {
    /// Whether the user can meaningfully retry the failed action
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Remote { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for SentinelError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_prefixes() {
        assert_eq!(SentinelError::Network("down".into()).to_string(), "NET/down");
        assert_eq!(
            SentinelError::Remote { status: 500, message: "boom".into() }.to_string(),
            "REMOTE/500: boom"
        );
    }

    #[test]
    fn test_retryable() {
        assert!(SentinelError::Network("timeout".into()).is_retryable());
        assert!(SentinelError::Remote { status: 503, message: String::new() }.is_retryable());
        assert!(!SentinelError::Remote { status: 401, message: String::new() }.is_retryable());
        assert!(!SentinelError::InvalidInput("bad json".into()).is_retryable());
    }
}
