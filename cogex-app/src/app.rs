use crate::Args;
use crate::simulate::SimulatedParticipant;
use crate::terminal::{self, TerminalDisplay};
use anyhow::{Context, Result};
use chrono::Local;
use cogex_core::KeyEvent;
use cogex_experiment::export::{export_file_name, to_csv};
use cogex_experiment::{
    Display, ExperimentConfig, ExperimentError, ExperimentStateMachine, IntakeError, IntakeForm,
    Summary, summarize,
};
use cogex_timing::HighPrecisionTimer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

type Session = ExperimentStateMachine<HighPrecisionTimer, StdRng>;

pub struct App {
    args: Args,
    config: ExperimentConfig,
}

impl App {
    pub fn new(args: Args) -> Result<Self> {
        let mut config = match &args.config {
            Some(path) => ExperimentConfig::from_json_file(path)
                .with_context(|| format!("loading {}", path.display()))?,
            None => ExperimentConfig::default(),
        };
        if let Some(n) = args.practice_trials {
            config.practice_trials = n;
        }
        if let Some(n) = args.main_trials {
            config.main_trials = n;
        }
        config.validate()?;

        Ok(Self { args, config })
    }

    pub fn run(self) -> Result<SessionEnd> {
        tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .context("failed to build tokio runtime")?
            .block_on(self.session())
    }

    async fn session(self) -> Result<SessionEnd> {
        let timer = HighPrecisionTimer::new();
        let mut machine =
            ExperimentStateMachine::new(self.config.clone(), timer.clone(), self.rng(0));
        self.intake(&mut machine)?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let outcome = if self.args.simulate {
            let mut display = SimulatedParticipant::new(tx, timer, self.rng(1));
            machine
                .run(&mut display, &mut rx)
                .await
                .map(|()| SessionEnd::Completed)
        } else {
            let mut display = TerminalDisplay::new().map_err(ExperimentError::from)?;
            let (interrupt_tx, interrupt) = oneshot::channel();
            terminal::spawn_key_reader(tx, interrupt_tx, timer);
            let outcome =
                run_until_interrupted(&mut machine, &mut display, &mut rx, interrupt).await;
            if matches!(outcome, Ok(SessionEnd::Completed)) {
                // leave the thank-you screen up briefly
                tokio::time::sleep(Duration::from_millis(1500)).await;
            }
            outcome
        };

        if let Some((path, summary)) = export_session(&machine, &self.args.output)? {
            let date = Local::now().date_naive();
            for line in terminal::results_lines(&summary, date) {
                println!("{line}");
            }
            println!("Data saved to {}", path.display());
        }
        Ok(outcome?)
    }

    /// Seeded streams are offset by `stream` so the engine and the simulated
    /// participant never share one.
    fn rng(&self, stream: u64) -> StdRng {
        match self.args.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(stream)),
            None => StdRng::from_os_rng(),
        }
    }

    /// Fills the participant fields, re-prompting until the identifier is accepted.
    fn intake(&self, machine: &mut Session) -> Result<()> {
        let client = format!(
            "{} {} ({}/{})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        let mut name = self.args.participant.clone();
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            let name = match name.take() {
                Some(name) => name,
                None => prompt(&mut lines, "Participant ID: ")?,
            };
            let form = IntakeForm {
                name,
                age: self.args.age.clone(),
                gender: self.args.gender.clone(),
                client: client.clone(),
            };
            match machine.submit_intake(form) {
                Ok(_) => return Ok(()),
                Err(IntakeError::EmptyIdentifier) => {
                    eprintln!("A participant ID is required.");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

/// How a session that did not fail came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Completed,
    /// Stopped by the participant or operator (Ctrl-C)
    Interrupted,
}

/// Runs the session until it finishes or `interrupt` fires.
///
/// An interrupt drops the trial in flight; the log keeps every completed trial.
pub async fn run_until_interrupted<D: Display>(
    machine: &mut Session,
    display: &mut D,
    rx: &mut mpsc::UnboundedReceiver<KeyEvent>,
    interrupt: oneshot::Receiver<()>,
) -> Result<SessionEnd, ExperimentError> {
    let end = tokio::select! {
        biased;
        // A dropped sender disables this branch instead of interrupting.
        Ok(()) = interrupt => Ok(SessionEnd::Interrupted),
        outcome = machine.run(display, rx) => outcome.map(|()| SessionEnd::Completed),
    };
    if let Ok(SessionEnd::Interrupted) = end {
        warn!(
            phase = ?machine.phase,
            recorded_trials = machine.log().len(),
            "session interrupted"
        );
    }
    end
}

/// Writes whatever was recorded, even after an aborted session.
///
/// Returns the written path and the summary it carries, or `None` when no
/// trial was recorded.
pub fn export_session(machine: &Session, output: &Path) -> Result<Option<(PathBuf, Summary)>> {
    let Some(participant) = machine.participant() else {
        return Ok(None);
    };
    let records = machine.log().records();
    if records.is_empty() {
        warn!("no trials recorded, skipping export");
        return Ok(None);
    }
    let summary = machine
        .summary()
        .cloned()
        .unwrap_or_else(|| summarize(participant, records));

    let path = output.join(export_file_name(participant, Local::now().date_naive()));
    std::fs::write(&path, to_csv(records, &summary))
        .with_context(|| format!("writing {}", path.display()))?;
    info!(path = %path.display(), trials = records.len(), "export written");
    Ok(Some((path, summary)))
}

fn prompt<B: BufRead>(lines: &mut io::Lines<B>, label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    match lines.next() {
        Some(line) => Ok(line?),
        None => anyhow::bail!("stdin closed during intake"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cogex_core::SessionPhase;

    fn session(config: ExperimentConfig, name: &str) -> (Session, HighPrecisionTimer) {
        let timer = HighPrecisionTimer::new();
        let mut machine =
            ExperimentStateMachine::new(config, timer.clone(), StdRng::seed_from_u64(3));
        machine
            .submit_intake(IntakeForm {
                name: name.into(),
                age: None,
                gender: None,
                client: "tests".into(),
            })
            .unwrap();
        (machine, timer)
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_keeps_completed_trials_for_export() {
        let (mut machine, timer) = session(ExperimentConfig::default(), "lab/P9");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut display = SimulatedParticipant::new(tx, timer, StdRng::seed_from_u64(4));
        let (interrupt_tx, interrupt) = oneshot::channel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(20)).await;
            let _ = interrupt_tx.send(());
        });

        let end = run_until_interrupted(&mut machine, &mut display, &mut rx, interrupt)
            .await
            .unwrap();
        assert_eq!(end, SessionEnd::Interrupted);
        assert_eq!(machine.phase, SessionPhase::Practice);
        let recorded = machine.log().len();
        assert!(recorded > 0);

        let dir = tempfile::tempdir().unwrap();
        let (path, summary) = export_session(&machine, dir.path()).unwrap().unwrap();
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(summary.main_trials, 0);
        let csv = std::fs::read_to_string(&path).unwrap();
        // header, trials, spacer, summary title, eight summary rows
        assert_eq!(csv.lines().count(), 1 + recorded + 2 + 8);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_interrupt_lets_the_session_finish() {
        let config = ExperimentConfig {
            practice_trials: 1,
            main_trials: 1,
            instruction_screens: 1,
            ..ExperimentConfig::default()
        };
        let (mut machine, timer) = session(config, "P10");
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut display = SimulatedParticipant::new(tx, timer, StdRng::seed_from_u64(5));
        let (_, interrupt) = oneshot::channel();

        let end = run_until_interrupted(&mut machine, &mut display, &mut rx, interrupt)
            .await
            .unwrap();
        assert_eq!(end, SessionEnd::Completed);
        assert_eq!(machine.phase, SessionPhase::ThankYou);
        assert_eq!(machine.log().len(), 2);
    }

    #[test]
    fn nothing_to_export_before_intake() {
        let machine = ExperimentStateMachine::new(
            ExperimentConfig::default(),
            HighPrecisionTimer::new(),
            StdRng::seed_from_u64(1),
        );
        let dir = tempfile::tempdir().unwrap();
        assert!(export_session(&machine, dir.path()).unwrap().is_none());
    }
}
