use cogex_core::{ParticipantInfo, TrialRecord};
use serde::Serialize;

/// Descriptive statistics over the main block
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub participant_name: String,
    pub participant_age: String,
    pub participant_gender: String,
    pub main_trials: usize,
    pub correct_trials: usize,
    /// Percent, rounded to one decimal
    pub accuracy_percent: f64,
    pub mean_rt_ms: f64,
    pub repeat_rt_ms: f64,
    pub switch_rt_ms: f64,
    pub switch_cost_ms: f64,
    pub congruent_rt_ms: f64,
    pub incongruent_rt_ms: f64,
    pub interference_ms: f64,
}

/// Arithmetic mean; an empty input yields 0.
pub fn mean<I: IntoIterator<Item = u64>>(values: I) -> f64 {
    let (sum, count) = values
        .into_iter()
        .fold((0u64, 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

pub fn accuracy_percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let pct = correct as f64 / total as f64 * 100.0;
    (pct * 10.0).round() / 10.0
}

/// Summarizes the main block. RT means only use CORRECT trials.
pub fn summarize(participant: &ParticipantInfo, records: &[TrialRecord]) -> Summary {
    let main: Vec<&TrialRecord> = records.iter().filter(|r| r.is_main()).collect();
    let correct: Vec<&TrialRecord> = main.iter().copied().filter(|r| r.is_correct()).collect();

    let rt_where = |pred: fn(&TrialRecord) -> bool| {
        mean(correct.iter().filter(|r| pred(r)).filter_map(|r| r.rt))
    };

    let mean_rt_ms = rt_where(|_| true);
    let repeat_rt_ms = rt_where(|r| !r.task_switch);
    let switch_rt_ms = rt_where(|r| r.task_switch);
    let congruent_rt_ms = rt_where(|r| r.congruent);
    let incongruent_rt_ms = rt_where(|r| !r.congruent);

    Summary {
        participant_name: participant.name.clone(),
        participant_age: participant.age.clone(),
        participant_gender: participant.gender.clone(),
        main_trials: main.len(),
        correct_trials: correct.len(),
        accuracy_percent: accuracy_percent(correct.len(), main.len()),
        mean_rt_ms,
        repeat_rt_ms,
        switch_rt_ms,
        switch_cost_ms: switch_rt_ms - repeat_rt_ms,
        congruent_rt_ms,
        incongruent_rt_ms,
        interference_ms: incongruent_rt_ms - congruent_rt_ms,
    }
}
