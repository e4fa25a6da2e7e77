use serde::{Deserialize, Serialize};

/// Defines session phases and behavior
pub trait Phase: Copy + Clone + PartialEq + Send + Sync + std::fmt::Debug + Default {
    fn allows_navigation(&self) -> bool;
    fn next(&self) -> Option<Self>;
    fn block(&self) -> Option<Block>;

    fn is_entry(&self) -> bool {
        false
    }

    fn is_practice(&self) -> bool {
        matches!(self.block(), Some(Block::Practice))
    }

    fn is_main(&self) -> bool {
        matches!(self.block(), Some(Block::Main))
    }

    fn runs_trials(&self) -> bool {
        self.block().is_some()
    }
}

/// Trial block a record belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Block {
    Practice,
    Main,
}

impl Block {
    pub fn as_str(&self) -> &'static str {
        match self {
            Block::Practice => "practice",
            Block::Main => "main",
        }
    }
}

#[derive(Copy, Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Entry,
    Instructions,
    Practice,
    Ready,
    Main,
    Results,
    ThankYou,
}

impl Phase for SessionPhase {
    fn allows_navigation(&self) -> bool {
        matches!(self, Self::Instructions | Self::Ready | Self::Results)
    }

    fn next(&self) -> Option<Self> {
        use SessionPhase::*;
        Some(match self {
            Entry => Instructions,
            Instructions => Practice,
            Practice => Ready,
            Ready => Main,
            Main => Results,
            Results => ThankYou,
            ThankYou => return None,
        })
    }

    fn block(&self) -> Option<Block> {
        match self {
            Self::Practice => Some(Block::Practice),
            Self::Main => Some(Block::Main),
            _ => None,
        }
    }

    fn is_entry(&self) -> bool {
        matches!(self, Self::Entry)
    }
}
