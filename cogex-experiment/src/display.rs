use crate::error::DisplayError;
use crate::sequence::PhaseContent;
use crate::stats::Summary;

/// Screens outside the trial region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Zero-based page out of `of`
    Instructions { page: usize, of: usize },
    Trial,
    Ready,
    ThankYou,
}

/// Presentation layer seam
pub trait Display {
    fn show_screen(&mut self, screen: Screen) -> Result<(), DisplayError>;
    fn set_mode_indicator(&mut self, practice: bool) -> Result<(), DisplayError>;
    /// Replaces the trial region's content. Returns once the content is visible.
    fn render_trial(&mut self, content: &PhaseContent) -> Result<(), DisplayError>;
    fn show_results(&mut self, summary: &Summary) -> Result<(), DisplayError>;
}
