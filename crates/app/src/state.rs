//! State machine for Snapcode

/// Application state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Idle state - ready to select
    Idle,
    /// Overlay is up, user is selecting a region
    Selecting,
    /// Waiting for the model to answer
    Asking,
}

impl AppState {
    /// Get display text for current state
    pub fn display_text(&self) -> &'static str {
        match self {
            AppState::Idle => "Ready",
            AppState::Selecting => "Select a region...",
            AppState::Asking => "Asking the model...",
        }
    }

    /// Check if the selection button should be enabled
    pub fn can_select(&self) -> bool {
        matches!(self, AppState::Idle)
    }

    pub fn is_busy(&self) -> bool {
        !matches!(self, AppState::Idle)
    }
}

/// State machine transitions
pub struct StateMachine {
    state: AppState,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AppState::Idle,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Transition to selecting state
    pub fn start_selecting(&mut self) -> bool {
        if self.state.can_select() {
            self.state = AppState::Selecting;
            true
        } else {
            false
        }
    }

    /// Cancel selection and return to idle
    pub fn cancel_selecting(&mut self) -> bool {
        if matches!(self.state, AppState::Selecting) {
            self.state = AppState::Idle;
            true
        } else {
            false
        }
    }

    /// A payload was captured; the request is going out
    pub fn start_asking(&mut self) -> bool {
        if matches!(self.state, AppState::Selecting) {
            self.state = AppState::Asking;
            true
        } else {
            false
        }
    }

    /// Answer received or request failed
    pub fn finish_asking(&mut self) {
        if matches!(self.state, AppState::Asking) {
            self.state = AppState::Idle;
        }
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
