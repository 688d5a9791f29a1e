//! Event phase enum and transition function.
//!
//! Phase changes are admin-driven and deliberately permissive: the
//! transition function is total over the four phases, so an admin may set
//! any target phase directly, including jumping backwards. The real
//! sequencing rules live in the mutation handlers, which consult the guard
//! helpers below.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stage an event is currently in, controlling which mutations are legal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPhase {
    /// Participants submit and revise guesses.
    Guessing,
    /// Guessing is frozen; participants rank their top three boxes.
    Ranking,
    /// Ground-truth mappings are disclosed in the results payload.
    Revealed,
    /// The event is over.
    Closed,
}

/// Outcome of a requested phase transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseChange {
    /// Phase the event was in.
    pub from: EventPhase,
    /// Phase the event moves to.
    pub to: EventPhase,
}

impl PhaseChange {
    /// Whether the transition actually changes the phase.
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

impl EventPhase {
    /// Compute the transition to `requested`.
    ///
    /// Total by design: every one of the four phases is a valid target from
    /// every other, there is no monotonic ordering.
    pub fn transition(self, requested: EventPhase) -> PhaseChange {
        PhaseChange {
            from: self,
            to: requested,
        }
    }

    /// Whether guess creation and updates are currently legal.
    pub fn allows_guessing(&self) -> bool {
        matches!(self, EventPhase::Guessing)
    }

    /// Whether ground-truth mappings are disclosed to participants.
    pub fn is_revealed(&self) -> bool {
        matches!(self, EventPhase::Revealed)
    }
}
