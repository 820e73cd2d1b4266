use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationState {
    Idle,
    Running,
    Paused,
}

impl fmt::Display for GenerationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GenerationState::Idle => "idle",
            GenerationState::Running => "running",
            GenerationState::Paused => "paused",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of a sequencer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SequencerSnapshot {
    pub state: GenerationState,
    pub cursor: Option<usize>,
}

/// How a call to `start` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    /// Every section completed; the sequencer is idle again.
    Completed,
    /// Paused by the caller; `section` is where generation resumes.
    Paused { section: usize },
    /// A section failed; the sequencer is paused on it.
    Failed { section: usize, message: String },
    /// A run was already in progress; nothing changed.
    AlreadyRunning,
}
