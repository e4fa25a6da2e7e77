pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod recorder;
pub mod response;
pub mod sequence;
pub mod state;
pub mod stats;
pub mod trial;

pub use config::ExperimentConfig;
pub use display::{Display, Screen};
pub use error::{ConfigError, DisplayError, ExperimentError, IntakeError};
pub use recorder::TrialLog;
pub use response::{Response, ResponseCollector};
pub use sequence::{DisplayPhase, Feedback, Hold, PhaseContent, TrainingHint, TrialSequence};
pub use state::{ExperimentStateMachine, IntakeForm, NavigationOutcome};
pub use stats::{Summary, summarize};
pub use trial::{Trial, TrialTimestamps};
