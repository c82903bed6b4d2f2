//! Finite State Machine for deploy polling

use serde::{Deserialize, Serialize};

use crate::models::deploy::DeployStatus;

/// Poll state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollState {
    /// Deploy triggered, not live yet
    Pending,

    /// Deploy reached `live`
    Live,

    /// Wait budget exhausted while still pending
    TimedOut,

    /// A status query failed
    QueryFailed,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Pending)
    }
}

/// Poll event
#[derive(Debug, Clone)]
pub enum PollEvent {
    /// A status query returned this status
    StatusObserved(DeployStatus),

    /// The elapsed time went past the wait budget
    DeadlineExceeded,

    /// A status query failed
    QueryError(String),
}

/// Deploy poll FSM
#[derive(Debug, Clone)]
pub struct PollFsm {
    state: PollState,
    last_status: DeployStatus,
    error: Option<String>,
    polls: u32,
}

impl PollFsm {
    /// Create a new FSM in pending state
    pub fn new(initial_status: DeployStatus) -> Self {
        Self {
            state: PollState::Pending,
            last_status: initial_status,
            error: None,
            polls: 0,
        }
    }

    /// Get current state
    pub fn state(&self) -> &PollState {
        &self.state
    }

    /// Last status seen for the deploy
    pub fn last_status(&self) -> &DeployStatus {
        &self.last_status
    }

    /// Get error message if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Number of status queries answered so far
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Process an event and transition state
    pub fn process(&mut self, event: PollEvent) -> Result<(), String> {
        let new_state = match (&self.state, event) {
            (PollState::Pending, PollEvent::StatusObserved(status)) => {
                self.polls += 1;
                let live = status.is_live();
                self.last_status = status;
                if live {
                    PollState::Live
                } else {
                    PollState::Pending
                }
            }
            (PollState::Pending, PollEvent::DeadlineExceeded) => PollState::TimedOut,
            (PollState::Pending, PollEvent::QueryError(err)) => {
                self.error = Some(err);
                PollState::QueryFailed
            }

            // Terminal states accept nothing
            (state, event) => {
                return Err(format!("Invalid transition: {:?} -> {:?}", state, event));
            }
        };

        self.state = new_state;
        Ok(())
    }
}
