use crate::response::Response;
use crate::trial::Trial;
use chrono::{DateTime, Utc};
use cogex_core::{ParticipantInfo, TrialRecord, TrialStatus};

/// Append-only session trial log
#[derive(Debug, Clone, Default)]
pub struct TrialLog {
    records: Vec<TrialRecord>,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the record for the next trial without appending it
    pub fn build(
        &self,
        participant: &ParticipantInfo,
        trial: &Trial,
        response: Option<Response>,
        timestamp: DateTime<Utc>,
    ) -> TrialRecord {
        let stimulus = trial.stimulus;
        let actual = response.map(|r| r.key);
        TrialRecord {
            participant_name: participant.name.clone(),
            participant_age: participant.age.clone(),
            participant_gender: participant.gender.clone(),
            trial: trial.number,
            total_trial: self.records.len() + 1,
            phase: trial.block,
            task: trial.task,
            stimulus: stimulus.name.to_string(),
            stimulus_shape: stimulus.shape,
            stimulus_color: stimulus.color,
            congruent: stimulus.congruent,
            task_switch: trial.task_switch,
            correct_response: stimulus.correct_key,
            actual_response: actual,
            rt: response.map(|r| r.reaction_time_ms),
            status: TrialStatus::classify(stimulus.correct_key, actual),
            timestamp,
        }
    }

    /// Appends a record built by [`TrialLog::build`]
    pub fn append(&mut self, record: TrialRecord) -> &TrialRecord {
        debug_assert_eq!(record.total_trial, self.records.len() + 1);
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
