use crate::phase::Block;
use crate::stimulus::{ResponseKey, Shape, StimulusColor, Task};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for optional intake fields left empty
pub const NOT_PROVIDED: &str = "not provided";

/// Outcome of a completed trial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrialStatus {
    Correct,
    Wrong,
    Timeout,
}

impl TrialStatus {
    pub fn classify(correct: ResponseKey, actual: Option<ResponseKey>) -> Self {
        match actual {
            None => TrialStatus::Timeout,
            Some(key) if key == correct => TrialStatus::Correct,
            Some(_) => TrialStatus::Wrong,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TrialStatus::Correct => "CORRECT",
            TrialStatus::Wrong => "WRONG",
            TrialStatus::Timeout => "TIMEOUT",
        }
    }

    /// Whether the feedback phase is shown for this outcome
    pub fn needs_feedback(&self) -> bool {
        !matches!(self, TrialStatus::Correct)
    }
}

/// Participant snapshot taken at intake
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub start_time: DateTime<Utc>,
    pub client: String,
}

/// Recorded result per trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialRecord {
    pub participant_name: String,
    pub participant_age: String,
    pub participant_gender: String,
    /// 1-based index within the block
    pub trial: usize,
    /// 1-based index within the session log
    pub total_trial: usize,
    pub phase: Block,
    pub task: Task,
    pub stimulus: String,
    pub stimulus_shape: Shape,
    pub stimulus_color: StimulusColor,
    pub congruent: bool,
    pub task_switch: bool,
    pub correct_response: ResponseKey,
    pub actual_response: Option<ResponseKey>,
    pub rt: Option<u64>,
    pub status: TrialStatus,
    pub timestamp: DateTime<Utc>,
}

impl TrialRecord {
    pub fn is_main(&self) -> bool {
        self.phase == Block::Main
    }

    pub fn is_correct(&self) -> bool {
        self.status == TrialStatus::Correct
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_key() -> impl Strategy<Value = ResponseKey> {
        prop_oneof![Just(ResponseKey::Left), Just(ResponseKey::Right)]
    }

    proptest! {
        #[test]
        fn classification_is_exclusive_and_exhaustive(
            correct in arb_key(),
            actual in proptest::option::of(arb_key()),
        ) {
            let status = TrialStatus::classify(correct, actual);
            prop_assert_eq!(status == TrialStatus::Correct, actual == Some(correct));
            prop_assert_eq!(status == TrialStatus::Timeout, actual.is_none());
            prop_assert_eq!(
                status == TrialStatus::Wrong,
                actual.is_some() && actual != Some(correct)
            );
        }
    }

    #[test]
    fn record_serializes_with_log_field_names() {
        let record = TrialRecord {
            participant_name: "P01".into(),
            participant_age: "24".into(),
            participant_gender: NOT_PROVIDED.into(),
            trial: 1,
            total_trial: 11,
            phase: Block::Main,
            task: Task::Shape,
            stimulus: "shape congruent 1 left".into(),
            stimulus_shape: Shape::Circle,
            stimulus_color: StimulusColor::Yellow,
            congruent: true,
            task_switch: false,
            correct_response: ResponseKey::Left,
            actual_response: None,
            rt: None,
            status: TrialStatus::Timeout,
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["totalTrial"], 11);
        assert_eq!(json["phase"], "main");
        assert_eq!(json["correctResponse"], "b");
        assert_eq!(json["status"], "TIMEOUT");
        assert!(json["actualResponse"].is_null());
    }
}
