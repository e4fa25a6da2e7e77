pub mod key;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use key::{Key, KeyEvent};
pub use phase::{Block, Phase, SessionPhase};
pub use stimulus::{
    COLOR_TASK_STIMULI, ResponseKey, SHAPE_TASK_STIMULI, Shape, StimulusColor, StimulusDefinition,
    Task, catalog, correct_key,
};
pub use trial::{NOT_PROVIDED, ParticipantInfo, TrialRecord, TrialStatus};
