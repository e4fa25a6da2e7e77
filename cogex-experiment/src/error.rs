use cogex_core::SessionPhase;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}

/// Rejected participant intake
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("participant identifier must not be empty")]
    EmptyIdentifier,
    #[error("intake already completed")]
    AlreadySubmitted,
}

/// Failures reported by the presentation layer
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("render target unavailable: {0}")]
    TargetUnavailable(String),
    #[error("display backend failed: {0}")]
    Backend(String),
}

/// Faults that abort a session
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    #[error("missing render target: {0}")]
    MissingRenderTarget(String),
    #[error(transparent)]
    Display(DisplayError),
    #[error("input channel closed")]
    InputClosed,
    #[error("cannot {action} during {phase:?}")]
    InvalidTransition {
        phase: SessionPhase,
        action: &'static str,
    },
}

impl From<DisplayError> for ExperimentError {
    fn from(err: DisplayError) -> Self {
        match err {
            DisplayError::TargetUnavailable(target) => ExperimentError::MissingRenderTarget(target),
            other => ExperimentError::Display(other),
        }
    }
}

impl ExperimentError {
    /// Configuration faults that no retry can fix
    pub fn is_fatal_configuration(&self) -> bool {
        matches!(self, ExperimentError::MissingRenderTarget(_))
    }
}
