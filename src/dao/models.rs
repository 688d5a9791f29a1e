//! Relational entities persisted by the store.

use std::time::SystemTime;

use uuid::Uuid;

use crate::state::phase::EventPhase;

/// One instance of the game, identified by a short human-entered code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntity {
    /// Primary key.
    pub id: Uuid,
    /// Short join code, unique across events.
    pub code: String,
    /// Display name shown to participants.
    pub name: String,
    /// Current phase of the event.
    pub phase: EventPhase,
    /// Creation timestamp.
    pub created_at: SystemTime,
}

impl EventEntity {
    /// Build a fresh event in the guessing phase.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            code: code.into(),
            name: name.into(),
            phase: EventPhase::Guessing,
            created_at: SystemTime::now(),
        }
    }
}

/// A candidate origin restaurant, unique by name across all events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceEntity {
    /// Primary key.
    pub id: Uuid,
    /// Globally unique restaurant name.
    pub name: String,
}

/// One of the numbered mystery boxes belonging to an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoxEntity {
    /// Primary key.
    pub id: Uuid,
    /// Owning event.
    pub event_id: Uuid,
    /// Box number, unique within the event (1..=6).
    pub number: u8,
    /// Ground-truth origin once mapped by the admin.
    pub place_id: Option<Uuid>,
}

/// A participant registered in exactly one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key.
    pub id: Uuid,
    /// Owning event.
    pub event_id: Uuid,
    /// Username, unique within the event.
    pub username: String,
    /// Opaque anonymous session token.
    pub token: String,
}

/// A user's claimed origin for one box, keyed by `(user_id, box_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessEntity {
    /// Guessing user.
    pub user_id: Uuid,
    /// Box the guess is about.
    pub box_id: Uuid,
    /// Guessed origin place.
    pub place_id: Uuid,
}

/// A user's assignment of a box to one preference rank, keyed by
/// `(user_id, rank)` with rank in 1..=3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntity {
    /// Ranking user.
    pub user_id: Uuid,
    /// Preference position, 1 (best) through 3.
    pub rank: u8,
    /// Chosen box.
    pub box_id: Uuid,
}
