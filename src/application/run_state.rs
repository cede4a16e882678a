//! Orchestration state of one run

use std::fmt;

/// Stage an extraction run has reached
///
/// `Preprocessed` and `SkippedPreprocessing` are alternates: a run passes
/// through exactly one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Validated,
    EngineReady,
    Preprocessed,
    SkippedPreprocessing,
    PresetResolved,
    SessionBuilt,
    Dispatched,
    Completed,
}

impl RunState {
    pub fn name(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Validated => "validated",
            RunState::EngineReady => "engine ready",
            RunState::Preprocessed => "preprocessed",
            RunState::SkippedPreprocessing => "skipped preprocessing",
            RunState::PresetResolved => "preset resolved",
            RunState::SessionBuilt => "session built",
            RunState::Dispatched => "dispatched",
            RunState::Completed => "completed",
        }
    }

    /// Returns the state that may follow this one
    ///
    /// `EngineReady` is followed by either preprocessing state.
    pub fn can_advance_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (RunState::Idle, RunState::Validated)
                | (RunState::Validated, RunState::EngineReady)
                | (RunState::EngineReady, RunState::Preprocessed)
                | (RunState::EngineReady, RunState::SkippedPreprocessing)
                | (RunState::Preprocessed, RunState::PresetResolved)
                | (RunState::SkippedPreprocessing, RunState::PresetResolved)
                | (RunState::PresetResolved, RunState::SessionBuilt)
                | (RunState::SessionBuilt, RunState::Dispatched)
                | (RunState::Dispatched, RunState::Completed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        *self == RunState::Completed
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tracks the states a run moves through
#[derive(Debug, Clone)]
pub struct RunTracker {
    history: Vec<RunState>,
}

impl Default for RunTracker {
    fn default() -> Self {
        Self {
            history: vec![RunState::Idle],
        }
    }
}

impl RunTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RunState {
        self.history.last().copied().unwrap_or(RunState::Idle)
    }

    /// States visited so far, starting with `Idle`
    pub fn history(&self) -> &[RunState] {
        &self.history
    }

    /// Moves to `next`
    ///
    /// Transitions only move forward; an out of order transition is a bug in
    /// the caller.
    pub(crate) fn advance(&mut self, next: RunState) {
        let current = self.state();
        debug_assert!(
            current.can_advance_to(next),
            "invalid run state transition: {current} -> {next}"
        );
        tracing::debug!("Run state: {} -> {}", current, next);
        self.history.push(next);
    }
}
