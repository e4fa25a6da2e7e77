//! Per-trial display timeline.
//!
//! A trial is a fixed chain of `(content, hold)` phases:
//! fixation → blank → cue → blank → stimulus (held by the response window)
//! → optional feedback → inter-trial blank.

use crate::config::ExperimentConfig;
use cogex_core::{ResponseKey, StimulusDefinition, Task, TrialStatus};
use std::time::Duration;

/// What the trial region shows during a phase
#[derive(Debug, Clone, PartialEq)]
pub enum PhaseContent {
    Fixation,
    Blank,
    /// Task cue, colored by task
    Cue(Task),
    Stimulus {
        stimulus: &'static StimulusDefinition,
        hint: Option<TrainingHint>,
    },
    Feedback(Feedback),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    WrongKey,
    TooSlow,
}

impl Feedback {
    pub fn for_status(status: TrialStatus) -> Option<Self> {
        match status {
            TrialStatus::Correct => None,
            TrialStatus::Wrong => Some(Feedback::WrongKey),
            TrialStatus::Timeout => Some(Feedback::TooSlow),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Feedback::WrongKey => "Wrong key!",
            Feedback::TooSlow => "Too slow!",
        }
    }
}

/// Practice-only hint block listing the key mapping and the expected answer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainingHint {
    pub task: Task,
    pub mappings: [(&'static str, ResponseKey); 2],
    pub correct: ResponseKey,
}

impl TrainingHint {
    pub fn new(task: Task, stimulus: &StimulusDefinition) -> Self {
        let mappings = match task {
            Task::Color => [("yellow", ResponseKey::Left), ("blue", ResponseKey::Right)],
            Task::Shape => [("circle", ResponseKey::Left), ("rectangle", ResponseKey::Right)],
        };
        Self {
            task,
            mappings,
            correct: stimulus.correct_key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    Fixed(Duration),
    /// Held until the response collector resolves, at most this long
    Response(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPhase {
    pub content: PhaseContent,
    pub hold: Hold,
}

impl DisplayPhase {
    fn fixed(content: PhaseContent, ms: u64) -> Self {
        Self {
            content,
            hold: Hold::Fixed(Duration::from_millis(ms)),
        }
    }
}

/// Timeline of one trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialSequence {
    pub lead_in: [DisplayPhase; 4],
    pub stimulus: DisplayPhase,
    pub feedback_ms: u64,
    pub show_feedback: bool,
    pub inter_trial: DisplayPhase,
}

impl TrialSequence {
    /// Feedback phase for an outcome, or `None` when it takes zero time
    pub fn feedback(&self, status: TrialStatus) -> Option<DisplayPhase> {
        if !self.show_feedback {
            return None;
        }
        Feedback::for_status(status)
            .map(|fb| DisplayPhase::fixed(PhaseContent::Feedback(fb), self.feedback_ms))
    }

    /// Full ordered timeline once the outcome is known
    pub fn phases(&self, status: TrialStatus) -> Vec<DisplayPhase> {
        let mut phases: Vec<DisplayPhase> = self.lead_in.to_vec();
        phases.push(self.stimulus.clone());
        phases.extend(self.feedback(status));
        phases.push(self.inter_trial.clone());
        phases
    }
}

pub fn build_sequence(
    task: Task,
    stimulus: &'static StimulusDefinition,
    training: bool,
    show_feedback: bool,
    config: &ExperimentConfig,
) -> TrialSequence {
    let hint = training.then(|| TrainingHint::new(task, stimulus));
    TrialSequence {
        lead_in: [
            DisplayPhase::fixed(PhaseContent::Fixation, config.fixation_ms),
            DisplayPhase::fixed(PhaseContent::Blank, config.post_fixation_blank_ms),
            DisplayPhase::fixed(PhaseContent::Cue(task), config.cue_display_ms),
            DisplayPhase::fixed(PhaseContent::Blank, config.cue_delay_ms),
        ],
        stimulus: DisplayPhase {
            content: PhaseContent::Stimulus { stimulus, hint },
            hold: Hold::Response(config.response_timeout()),
        },
        feedback_ms: config.feedback_ms,
        show_feedback,
        inter_trial: DisplayPhase::fixed(PhaseContent::Blank, config.inter_trial_interval_ms),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::{COLOR_TASK_STIMULI, SHAPE_TASK_STIMULI};

    fn holds(phases: &[DisplayPhase]) -> Vec<Hold> {
        phases.iter().map(|p| p.hold).collect()
    }

    #[test]
    fn default_timeline_matches_the_protocol() {
        let config = ExperimentConfig::default();
        let seq = build_sequence(Task::Color, &COLOR_TASK_STIMULI[0], false, true, &config);
        let ms = |n| Hold::Fixed(Duration::from_millis(n));
        assert_eq!(
            holds(&seq.phases(TrialStatus::Correct)),
            vec![
                ms(150),
                ms(500),
                ms(350),
                ms(750),
                Hold::Response(Duration::from_millis(2000)),
                ms(1000),
            ]
        );
        assert_eq!(seq.lead_in[2].content, PhaseContent::Cue(Task::Color));
    }

    #[test]
    fn feedback_only_follows_errors() {
        let config = ExperimentConfig::default();
        let seq = build_sequence(Task::Shape, &SHAPE_TASK_STIMULI[1], true, true, &config);
        assert!(seq.feedback(TrialStatus::Correct).is_none());
        assert_eq!(
            seq.feedback(TrialStatus::Wrong).map(|p| p.content),
            Some(PhaseContent::Feedback(Feedback::WrongKey))
        );
        let timeout = seq.phases(TrialStatus::Timeout);
        assert_eq!(timeout.len(), 7);
        assert_eq!(timeout[5].content, PhaseContent::Feedback(Feedback::TooSlow));
        assert_eq!(timeout[5].hold, Hold::Fixed(Duration::from_millis(500)));
    }

    #[test]
    fn suppressed_feedback_takes_no_time() {
        let config = ExperimentConfig::default();
        let seq = build_sequence(Task::Shape, &SHAPE_TASK_STIMULI[1], false, false, &config);
        assert_eq!(seq.phases(TrialStatus::Wrong).len(), 6);
    }

    #[test]
    fn training_adds_hint_without_changing_timing() {
        let config = ExperimentConfig::default();
        let stim = &SHAPE_TASK_STIMULI[2];
        let plain = build_sequence(Task::Shape, stim, false, true, &config);
        let training = build_sequence(Task::Shape, stim, true, true, &config);
        assert_eq!(
            holds(&plain.phases(TrialStatus::Wrong)),
            holds(&training.phases(TrialStatus::Wrong))
        );
        match &training.stimulus.content {
            PhaseContent::Stimulus {
                hint: Some(hint), ..
            } => {
                assert_eq!(hint.correct, ResponseKey::Left);
                assert_eq!(hint.mappings[1], ("rectangle", ResponseKey::Right));
            }
            other => panic!("unexpected content {other:?}"),
        }
    }
}
