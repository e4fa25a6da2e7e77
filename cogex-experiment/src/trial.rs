use cogex_core::{Block, StimulusDefinition, Task};

pub struct Trial {
    /// 1-based index within the block
    pub number: usize,
    pub block: Block,
    pub task: Task,
    pub stimulus: &'static StimulusDefinition,
    pub task_switch: bool,
    pub timestamps: TrialTimestamps,
}

#[derive(Debug, Clone, Default)]
pub struct TrialTimestamps {
    pub start: u64,
    pub stimulus_onset: Option<u64>,
    pub response: Option<u64>,
}

/// Switch status of a trial given the previous trial's task.
///
/// The first trial of a session has no predecessor and is never a switch.
pub fn is_task_switch(previous: Option<Task>, current: Task) -> bool {
    previous.is_some_and(|prev| prev != current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_trial_is_never_a_switch() {
        assert!(!is_task_switch(None, Task::Color));
        assert!(!is_task_switch(None, Task::Shape));
    }

    #[test]
    fn later_trials_compare_with_previous_task() {
        assert!(is_task_switch(Some(Task::Color), Task::Shape));
        assert!(!is_task_switch(Some(Task::Shape), Task::Shape));
    }
}
