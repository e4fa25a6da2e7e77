//! Text-mode presentation and raw key input.

use cogex_core::{Key, KeyEvent, ResponseKey, Shape, StimulusColor, Task};
use chrono::{Local, NaiveDate};
use cogex_experiment::export::summary_rows;
use cogex_experiment::{Display, DisplayError, Feedback, PhaseContent, Screen, Summary};
use cogex_timing::{HighPrecisionTimer, Timer};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use std::io::{self, Stdout, Write};
use std::thread;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tracing::{debug, warn};

const INSTRUCTION_PAGES: [&str; 5] = [
    "In this task you will see a shape on every trial.\nEach shape is either a circle or a rectangle, colored yellow or blue.",
    "Before the shape, a cue tells you which rule to use.\nCOLOR: yellow = b, blue = n\nSHAPE: circle = b, rectangle = n",
    "The rule changes from trial to trial without warning.\nAnswer as quickly and accurately as you can.",
    "You have 2 seconds to answer each shape.\nKeep your fingers on the b and n keys.",
    "You will start with a short practice block with hints.\nPress SPACE to begin.",
];

fn backend(err: io::Error) -> DisplayError {
    DisplayError::Backend(err.to_string())
}

/// Alternate-screen text display. Restores the terminal on drop.
pub struct TerminalDisplay {
    out: Stdout,
    practice: bool,
}

impl TerminalDisplay {
    pub fn new() -> Result<Self, DisplayError> {
        terminal::size().map_err(|err| DisplayError::TargetUnavailable(err.to_string()))?;
        terminal::enable_raw_mode().map_err(backend)?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, Hide).map_err(backend)?;
        Ok(Self {
            out,
            practice: false,
        })
    }

    fn center(&self) -> (u16, u16) {
        let (w, h) = terminal::size().unwrap_or((80, 24));
        (w / 2, h / 2)
    }

    fn clear(&mut self) -> io::Result<()> {
        queue!(self.out, ResetColor, Clear(ClearType::All))
    }

    fn centered(&mut self, row: u16, text: &str, color: Option<Color>) -> io::Result<()> {
        let (cx, _) = self.center();
        let x = cx.saturating_sub(text.chars().count() as u16 / 2);
        queue!(self.out, MoveTo(x, row))?;
        if let Some(color) = color {
            queue!(self.out, SetForegroundColor(color))?;
        }
        queue!(self.out, Print(text), ResetColor)
    }

    fn paragraph(&mut self, text: &str) -> io::Result<()> {
        let (_, cy) = self.center();
        let lines: Vec<&str> = text.lines().collect();
        let top = cy.saturating_sub(lines.len() as u16 / 2);
        for (i, line) in lines.iter().enumerate() {
            self.centered(top + i as u16, line, None)?;
        }
        Ok(())
    }

    fn mode_line(&mut self) -> io::Result<()> {
        let label = if self.practice {
            "PRACTICE MODE"
        } else {
            "MAIN EXPERIMENT"
        };
        let color = if self.practice {
            Color::Green
        } else {
            Color::DarkGrey
        };
        queue!(
            self.out,
            MoveTo(1, 0),
            SetForegroundColor(color),
            Print(label),
            ResetColor
        )
    }

    fn draw_trial(&mut self, content: &PhaseContent) -> io::Result<()> {
        self.clear()?;
        self.mode_line()?;
        let (_, cy) = self.center();
        match content {
            PhaseContent::Blank => {}
            PhaseContent::Fixation => self.centered(cy, "+", None)?,
            PhaseContent::Cue(task) => {
                let color = match task {
                    Task::Color => Color::Magenta,
                    Task::Shape => Color::Cyan,
                };
                self.centered(cy, &task.as_str().to_uppercase(), Some(color))?;
            }
            PhaseContent::Stimulus { stimulus, hint } => {
                let color = match stimulus.color {
                    StimulusColor::Yellow => Color::Yellow,
                    StimulusColor::Blue => Color::Blue,
                };
                let glyph = match stimulus.shape {
                    Shape::Circle => ["  ████  ", "████████", "  ████  "],
                    Shape::Rectangle => ["██████████", "██████████", "██████████"],
                };
                for (i, row) in glyph.iter().enumerate() {
                    self.centered(cy.saturating_sub(1) + i as u16, row, Some(color))?;
                }
                if let Some(hint) = hint {
                    let keys = hint
                        .mappings
                        .iter()
                        .map(|(value, key)| format!("{value} = {}", key.as_str()))
                        .collect::<Vec<_>>()
                        .join("   ");
                    self.centered(cy + 3, &format!("{} task: {keys}", hint.task), None)?;
                    let answer = match hint.correct {
                        ResponseKey::Left => "Correct answer: b",
                        ResponseKey::Right => "Correct answer: n",
                    };
                    self.centered(cy + 4, answer, Some(Color::Green))?;
                }
            }
            PhaseContent::Feedback(feedback) => {
                let color = match feedback {
                    Feedback::WrongKey => Color::Red,
                    Feedback::TooSlow => Color::DarkYellow,
                };
                self.centered(cy, feedback.message(), Some(color))?;
            }
        }
        self.out.flush()
    }
}

impl Display for TerminalDisplay {
    fn show_screen(&mut self, screen: Screen) -> Result<(), DisplayError> {
        self.clear().map_err(backend)?;
        match screen {
            Screen::Instructions { page, of } => {
                let text = INSTRUCTION_PAGES
                    .get(page)
                    .copied()
                    .unwrap_or("Press SPACE to continue.");
                self.paragraph(text).map_err(backend)?;
                let (_, h) = terminal::size().unwrap_or((80, 24));
                let nav = format!("page {} of {of}   <- back   -> / SPACE next", page + 1);
                self.centered(h.saturating_sub(2), &nav, Some(Color::DarkGrey))
                    .map_err(backend)?;
            }
            Screen::Trial => self.mode_line().map_err(backend)?,
            Screen::Ready => self
                .paragraph(
                    "Practice complete.\n\nPress SPACE to start the main experiment\nor q to practice again.",
                )
                .map_err(backend)?,
            Screen::ThankYou => self
                .paragraph("Thank you for participating!")
                .map_err(backend)?,
        }
        self.out.flush().map_err(backend)
    }

    fn set_mode_indicator(&mut self, practice: bool) -> Result<(), DisplayError> {
        self.practice = practice;
        self.mode_line().map_err(backend)?;
        self.out.flush().map_err(backend)
    }

    fn render_trial(&mut self, content: &PhaseContent) -> Result<(), DisplayError> {
        self.draw_trial(content).map_err(backend)
    }

    fn show_results(&mut self, summary: &Summary) -> Result<(), DisplayError> {
        self.clear().map_err(backend)?;
        let mut lines = vec!["Results".to_string(), String::new()];
        lines.extend(results_lines(summary, Local::now().date_naive()));
        lines.extend([String::new(), "Press SPACE to finish.".to_string()]);
        self.paragraph(&lines.join("\n")).map_err(backend)?;
        self.out.flush().map_err(backend)
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Participant, date and every summary row, one per line
pub fn results_lines(summary: &Summary, date: NaiveDate) -> Vec<String> {
    let mut lines = vec![
        format!("Participant: {}", summary.participant_name),
        format!("Date: {}", date.format("%Y-%m-%d")),
    ];
    lines.extend(
        summary_rows(summary)
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}")),
    );
    lines
}

/// Best-effort teardown, safe to call more than once.
pub fn restore_terminal() {
    let mut out = io::stdout();
    let _ = execute!(out, ResetColor, Show, LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Char(c) => Some(Key::from_char(c)),
        KeyCode::Left => Some(Key::ArrowLeft),
        KeyCode::Right => Some(Key::ArrowRight),
        _ => None,
    }
}

/// Reads key presses on a dedicated thread and stamps them on arrival.
///
/// The first Ctrl-C fires `interrupt` so the session can still be exported.
/// A second one restores the terminal and exits with status 130.
pub fn spawn_key_reader(
    tx: UnboundedSender<KeyEvent>,
    interrupt: oneshot::Sender<()>,
    timer: HighPrecisionTimer,
) {
    let mut interrupt = Some(interrupt);
    thread::spawn(move || {
        loop {
            let event = match event::read() {
                Ok(event) => event,
                Err(err) => {
                    warn!(error = %err, "key reader stopped");
                    return;
                }
            };
            let Event::Key(key) = event else { continue };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            let timestamp_ns = timer.now();
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                match interrupt.take() {
                    Some(interrupt) => {
                        let _ = interrupt.send(());
                    }
                    None => {
                        restore_terminal();
                        std::process::exit(130);
                    }
                }
                continue;
            }
            let Some(key) = map_key(key.code) else {
                continue;
            };
            debug!(?key, timestamp_ns, "key");
            if tx.send(KeyEvent::new(key, timestamp_ns)).is_err() {
                return;
            }
        }
    });
}
