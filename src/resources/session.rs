use bevy::prelude::*;
use std::time::Duration;

/// Terminal result of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionOutcome {
    /// Every cow popped; carries the elapsed game time in seconds.
    Victory { elapsed: f64 },
    /// Time ran out; carries the number of cows still standing.
    Defeat { remaining: usize },
}

/// Clock and outcome of the running match.
#[derive(Resource, Debug, Clone)]
pub struct PlaySession {
    game_time: f64,
    defeat_after: f64,
    outcome: Option<SessionOutcome>,
    frozen: bool,
}

impl PlaySession {
    pub fn new(defeat_after: f64) -> Self {
        Self {
            game_time: 0.0,
            defeat_after,
            outcome: None,
            frozen: false,
        }
    }

    pub fn game_time(&self) -> f64 {
        self.game_time
    }

    pub fn remaining_time(&self) -> Duration {
        Duration::from_secs_f64((self.defeat_after - self.game_time).max(0.0))
    }

    pub fn outcome(&self) -> Option<SessionOutcome> {
        self.outcome
    }

    pub fn is_decided(&self) -> bool {
        self.outcome.is_some()
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Post-tick bookkeeping. Victory is checked before the clock moves, defeat
    /// after; once decided the session never changes again.
    pub fn advance(&mut self, remaining_cows: usize, dt: f64) -> Option<SessionOutcome> {
        if self.outcome.is_some() {
            return None;
        }

        if remaining_cows == 0 {
            self.outcome = Some(SessionOutcome::Victory {
                elapsed: self.game_time,
            });
            return self.outcome;
        }

        self.game_time += dt.max(0.0);
        if self.game_time > self.defeat_after {
            self.outcome = Some(SessionOutcome::Defeat {
                remaining: remaining_cows,
            });
        }
        self.outcome
    }
}
