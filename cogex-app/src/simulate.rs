//! Scripted participant for unattended runs.
//!
//! Presses SPACE on every screen and answers each stimulus after a random
//! delay. The engine cannot tell these keys apart from a human's.

use cogex_core::{Key, KeyEvent, ResponseKey};
use cogex_experiment::{Display, DisplayError, PhaseContent, Screen, Summary};
use cogex_timing::{HighPrecisionTimer, Timer};
use rand::Rng;
use rand::rngs::StdRng;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Response behavior of the simulated participant
#[derive(Debug, Clone, Copy)]
pub struct Behavior {
    pub accuracy: f64,
    pub miss_rate: f64,
    pub min_rt_ms: u64,
    pub max_rt_ms: u64,
    pub reading_ms: u64,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            accuracy: 0.9,
            miss_rate: 0.05,
            min_rt_ms: 350,
            max_rt_ms: 1400,
            reading_ms: 300,
        }
    }
}

pub struct SimulatedParticipant {
    tx: UnboundedSender<KeyEvent>,
    timer: HighPrecisionTimer,
    rng: StdRng,
    behavior: Behavior,
}

impl SimulatedParticipant {
    pub fn new(tx: UnboundedSender<KeyEvent>, timer: HighPrecisionTimer, rng: StdRng) -> Self {
        Self {
            tx,
            timer,
            rng,
            behavior: Behavior::default(),
        }
    }

    fn press_after(&self, key: Key, delay: Duration) {
        let tx = self.tx.clone();
        let timer = self.timer.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(KeyEvent::new(key, timer.now()));
        });
    }

    fn answer(&mut self, correct: ResponseKey) {
        let b = self.behavior;
        if self.rng.random_bool(b.miss_rate) {
            debug!("simulated miss");
            return;
        }
        let key = if self.rng.random_bool(b.accuracy) {
            correct
        } else {
            match correct {
                ResponseKey::Left => ResponseKey::Right,
                ResponseKey::Right => ResponseKey::Left,
            }
        };
        let rt = self.rng.random_range(b.min_rt_ms..=b.max_rt_ms);
        self.press_after(
            Key::from_char(key.physical()),
            Duration::from_millis(rt),
        );
    }
}

impl Display for SimulatedParticipant {
    fn show_screen(&mut self, screen: Screen) -> Result<(), DisplayError> {
        match screen {
            Screen::Trial => {}
            Screen::ThankYou => info!("simulated session finished"),
            Screen::Instructions { .. } | Screen::Ready => {
                self.press_after(Key::Space, Duration::from_millis(self.behavior.reading_ms));
            }
        }
        Ok(())
    }

    fn set_mode_indicator(&mut self, _practice: bool) -> Result<(), DisplayError> {
        Ok(())
    }

    fn render_trial(&mut self, content: &PhaseContent) -> Result<(), DisplayError> {
        if let PhaseContent::Stimulus { stimulus, .. } = content {
            self.answer(stimulus.correct_key);
        }
        Ok(())
    }

    fn show_results(&mut self, summary: &Summary) -> Result<(), DisplayError> {
        info!(
            accuracy = summary.accuracy_percent,
            mean_rt_ms = summary.mean_rt_ms,
            "simulated results"
        );
        self.press_after(Key::Space, Duration::from_millis(self.behavior.reading_ms));
        Ok(())
    }
}
