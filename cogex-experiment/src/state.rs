use super::config::ExperimentConfig;
use super::trial::{Trial, TrialTimestamps, is_task_switch};
use crate::display::{Display, Screen};
use crate::error::{ExperimentError, IntakeError};
use crate::recorder::TrialLog;
use crate::response::ResponseCollector;
use crate::sequence::{Hold, PhaseContent, build_sequence};
use crate::stats::{Summary, summarize};
use chrono::Utc;
use cogex_core::{
    Block, Key, KeyEvent, NOT_PROVIDED, ParticipantInfo, Phase, SessionPhase, Task, TrialRecord,
    catalog,
};
use cogex_timing::{Timer, hold};
use rand::Rng;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, error, info, warn};

/// Raw intake form values
#[derive(Debug, Clone, Default)]
pub struct IntakeForm {
    pub name: String,
    pub age: Option<String>,
    pub gender: Option<String>,
    /// Program and platform running the session
    pub client: String,
}

/// Result of a navigation key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Ignored,
    Instruction(usize),
    BlockStarted(Block),
    Finished,
}

pub struct ExperimentStateMachine<T, R>
where
    T: Timer,
    R: Rng,
{
    pub phase: SessionPhase,
    pub timer: T,
    pub rng: R,
    pub config: ExperimentConfig,
    participant: Option<ParticipantInfo>,
    log: TrialLog,
    instruction_screen: usize,
    phase_trial_number: usize,
    previous_task: Option<Task>,
    awaiting_response: bool,
    summary: Option<Summary>,
}

impl<T, R> ExperimentStateMachine<T, R>
where
    T: Timer,
    R: Rng,
{
    pub fn new(config: ExperimentConfig, timer: T, rng: R) -> Self {
        Self {
            phase: SessionPhase::default(),
            timer,
            rng,
            config,
            participant: None,
            log: TrialLog::new(),
            instruction_screen: 0,
            phase_trial_number: 0,
            previous_task: None,
            awaiting_response: false,
            summary: None,
        }
    }

    /// Validates intake and moves to the first instruction screen.
    ///
    /// A rejected form leaves the session untouched.
    pub fn submit_intake(&mut self, form: IntakeForm) -> Result<&ParticipantInfo, IntakeError> {
        if !self.phase.is_entry() {
            return Err(IntakeError::AlreadySubmitted);
        }
        let name = form.name.trim();
        if name.is_empty() {
            warn!("intake rejected: empty participant identifier");
            return Err(IntakeError::EmptyIdentifier);
        }
        let or_sentinel = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| NOT_PROVIDED.to_string())
        };
        let info = ParticipantInfo {
            name: name.to_string(),
            age: or_sentinel(form.age),
            gender: or_sentinel(form.gender),
            start_time: Utc::now(),
            client: form.client,
        };
        info!(participant = %info.name, age = %info.age, gender = %info.gender, "participant registered");

        self.phase = SessionPhase::Instructions;
        self.instruction_screen = 0;
        Ok(self.participant.insert(info))
    }

    /// Handles space, arrows and the training-repeat key outside trials.
    pub fn handle_navigation(&mut self, key: &Key) -> NavigationOutcome {
        if self.awaiting_response || !self.phase.allows_navigation() {
            return NavigationOutcome::Ignored;
        }
        let last_screen = self.config.instruction_screens.saturating_sub(1);
        match (self.phase, key) {
            (SessionPhase::Instructions, Key::Space | Key::ArrowRight) => {
                if self.instruction_screen < last_screen {
                    self.instruction_screen += 1;
                    NavigationOutcome::Instruction(self.instruction_screen)
                } else {
                    self.begin_block(Block::Practice)
                }
            }
            (SessionPhase::Instructions, Key::ArrowLeft) if self.instruction_screen > 0 => {
                self.instruction_screen -= 1;
                NavigationOutcome::Instruction(self.instruction_screen)
            }
            (SessionPhase::Instructions, Key::Char('q'))
                if self.instruction_screen == last_screen =>
            {
                self.begin_block(Block::Practice)
            }
            (SessionPhase::Ready, Key::Space) => self.begin_block(Block::Main),
            (SessionPhase::Ready, Key::Char('q')) => self.begin_block(Block::Practice),
            (SessionPhase::Results, Key::Space) => {
                self.phase = SessionPhase::ThankYou;
                info!("session finished");
                NavigationOutcome::Finished
            }
            _ => NavigationOutcome::Ignored,
        }
    }

    fn begin_block(&mut self, block: Block) -> NavigationOutcome {
        self.phase = match block {
            Block::Practice => SessionPhase::Practice,
            Block::Main => SessionPhase::Main,
        };
        self.phase_trial_number = 0;
        info!(
            block = block.as_str(),
            trials = self.config.trials_for(block),
            "block started"
        );
        NavigationOutcome::BlockStarted(block)
    }

    /// Picks task and stimulus for the next trial and fixes its switch flag.
    pub fn plan_trial(&mut self, block: Block) -> Trial {
        let task = if self.rng.random_bool(0.5) {
            Task::Color
        } else {
            Task::Shape
        };
        let stimuli = catalog(task);
        let stimulus = &stimuli[self.rng.random_range(0..stimuli.len())];
        Trial {
            number: self.phase_trial_number + 1,
            block,
            task,
            stimulus,
            task_switch: is_task_switch(self.previous_task, task),
            timestamps: TrialTimestamps::default(),
        }
    }

    /// Runs one trial to completion and appends its record.
    pub async fn run_trial<D: Display>(
        &mut self,
        display: &mut D,
        input: &mut UnboundedReceiver<KeyEvent>,
    ) -> Result<TrialRecord, ExperimentError> {
        let block = self.phase.block().ok_or(ExperimentError::InvalidTransition {
            phase: self.phase,
            action: "run a trial",
        })?;
        let participant = self
            .participant
            .clone()
            .ok_or(ExperimentError::InvalidTransition {
                phase: self.phase,
                action: "run a trial without a participant",
            })?;

        let mut trial = self.plan_trial(block);
        let training = block == Block::Practice;
        let show_feedback = training || self.config.feedback_in_main;
        let sequence = build_sequence(
            trial.task,
            trial.stimulus,
            training,
            show_feedback,
            &self.config,
        );

        let mut at = self.timer.now();
        trial.timestamps.start = at;
        debug!(
            trial = trial.number,
            block = block.as_str(),
            task = %trial.task,
            stimulus = trial.stimulus.name,
            switch = trial.task_switch,
            start_ns = at,
            "trial started"
        );

        for phase in &sequence.lead_in {
            display.render_trial(&phase.content)?;
            if let Hold::Fixed(duration) = phase.hold {
                at = hold(&mut self.timer, at, duration).await;
            }
        }

        display.render_trial(&sequence.stimulus.content)?;
        let onset = self.timer.now();
        trial.timestamps.stimulus_onset = Some(onset);
        let timeout = self.config.response_timeout();

        self.awaiting_response = true;
        let response = ResponseCollector::new(input, &self.timer)
            .collect_from(onset, timeout)
            .await;
        self.awaiting_response = false;
        trial.timestamps.response =
            response.map(|r| onset + r.reaction_time_ms * 1_000_000);

        display.render_trial(&PhaseContent::Blank)?;
        let record = self
            .log
            .build(&participant, &trial, response, Utc::now());
        debug!(
            trial = record.trial,
            status = record.status.as_str(),
            rt_ms = ?record.rt,
            onset_ns = ?trial.timestamps.stimulus_onset,
            response_ns = ?trial.timestamps.response,
            "trial resolved"
        );

        if let Some(feedback) = sequence.feedback(record.status) {
            display.render_trial(&feedback.content)?;
            if let Hold::Fixed(duration) = feedback.hold {
                let start = self.timer.now();
                hold(&mut self.timer, start, duration).await;
            }
            display.render_trial(&PhaseContent::Blank)?;
        }

        display.render_trial(&sequence.inter_trial.content)?;
        if let Hold::Fixed(duration) = sequence.inter_trial.hold {
            let start = self.timer.now();
            hold(&mut self.timer, start, duration).await;
        }

        // The log, previous task and block counter only move together.
        let record = self.log.append(record).clone();
        self.previous_task = Some(trial.task);
        self.phase_trial_number += 1;
        if self.phase_trial_number >= self.config.trials_for(block) {
            self.finish_block(block);
        }
        Ok(record)
    }

    fn finish_block(&mut self, block: Block) {
        let drift = self.timer.drift_stats();
        info!(
            block = block.as_str(),
            trials = self.phase_trial_number,
            holds = drift.samples,
            mean_overshoot_ms = drift.average_overshoot_ns / 1_000_000.0,
            jitter_ms = drift.jitter_ns / 1_000_000.0,
            max_overshoot_ms = drift.max_overshoot_ns / 1_000_000.0,
            "block complete"
        );
        match block {
            Block::Practice => self.phase = SessionPhase::Ready,
            Block::Main => {
                if let Some(participant) = &self.participant {
                    let summary = summarize(participant, self.log.records());
                    info!(
                        accuracy = summary.accuracy_percent,
                        switch_cost_ms = summary.switch_cost_ms,
                        interference_ms = summary.interference_ms,
                        "results computed"
                    );
                    self.summary = Some(summary);
                }
                self.phase = SessionPhase::Results;
            }
        }
    }

    /// Runs trials until the current block ends
    pub async fn run_block<D: Display>(
        &mut self,
        display: &mut D,
        input: &mut UnboundedReceiver<KeyEvent>,
    ) -> Result<(), ExperimentError> {
        while self.phase.runs_trials() {
            self.run_trial(display, input).await?;
        }
        Ok(())
    }

    /// Drives the session from the instructions to the thank-you screen.
    ///
    /// Any fault aborts the session. Records of completed trials stay in the log.
    pub async fn run<D: Display>(
        &mut self,
        display: &mut D,
        input: &mut UnboundedReceiver<KeyEvent>,
    ) -> Result<(), ExperimentError> {
        let result = self.drive(display, input).await;
        if let Err(err) = &result {
            self.awaiting_response = false;
            error!(
                error = %err,
                phase = ?self.phase,
                progress = ?self.trial_progress(),
                recorded_trials = self.log.len(),
                "session aborted"
            );
        }
        result
    }

    async fn drive<D: Display>(
        &mut self,
        display: &mut D,
        input: &mut UnboundedReceiver<KeyEvent>,
    ) -> Result<(), ExperimentError> {
        if self.phase.is_entry() {
            return Err(ExperimentError::InvalidTransition {
                phase: self.phase,
                action: "start before intake",
            });
        }
        self.show_current_screen(display)?;
        loop {
            if self.phase.runs_trials() {
                self.run_block(display, input).await?;
                self.show_current_screen(display)?;
                continue;
            }
            if self.phase == SessionPhase::ThankYou {
                return Ok(());
            }

            let shown_at = self.timer.now();
            let event = input.recv().await.ok_or(ExperimentError::InputClosed)?;
            // Keys pressed while the previous screen was up do not navigate this one.
            if event.timestamp_ns < shown_at {
                continue;
            }
            if self.handle_navigation(&event.key) != NavigationOutcome::Ignored {
                self.show_current_screen(display)?;
            }
        }
    }

    fn show_current_screen<D: Display>(&self, display: &mut D) -> Result<(), ExperimentError> {
        match self.phase {
            SessionPhase::Entry => {}
            SessionPhase::Instructions => display.show_screen(Screen::Instructions {
                page: self.instruction_screen,
                of: self.config.instruction_screens,
            })?,
            SessionPhase::Practice | SessionPhase::Main => {
                display.show_screen(Screen::Trial)?;
                display.set_mode_indicator(self.phase.is_practice())?;
            }
            SessionPhase::Ready => display.show_screen(Screen::Ready)?,
            SessionPhase::Results => match &self.summary {
                Some(summary) => display.show_results(summary)?,
                None => {
                    return Err(ExperimentError::InvalidTransition {
                        phase: self.phase,
                        action: "show results without a summary",
                    });
                }
            },
            SessionPhase::ThankYou => display.show_screen(Screen::ThankYou)?,
        }
        Ok(())
    }

    pub fn participant(&self) -> Option<&ParticipantInfo> {
        self.participant.as_ref()
    }

    pub fn log(&self) -> &TrialLog {
        &self.log
    }

    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn previous_task(&self) -> Option<Task> {
        self.previous_task
    }

    pub fn instruction_screen(&self) -> usize {
        self.instruction_screen
    }

    pub fn is_awaiting_response(&self) -> bool {
        self.awaiting_response
    }

    pub fn trial_progress(&self) -> Option<(usize, usize)> {
        self.phase
            .block()
            .map(|block| (self.phase_trial_number + 1, self.config.trials_for(block)))
    }
}
