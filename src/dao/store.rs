//! Store abstraction consumed by the service layer.

use std::error::Error;

use futures::future::BoxFuture;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    dao::models::{BoxEntity, EventEntity, GuessEntity, PlaceEntity, RankingEntity, UserEntity},
    state::phase::EventPhase,
};

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Error raised by store backends regardless of the underlying database.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend cannot be reached or failed mid-operation.
    #[error("storage unavailable: {message}")]
    Unavailable {
        /// Human-readable description of the failure.
        message: String,
        /// Underlying backend error.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// A uniqueness constraint rejected the write.
    #[error("{message}")]
    Conflict {
        /// Which constraint was violated.
        message: String,
    },
    /// A referenced row does not exist.
    #[error("{message}")]
    NotFound {
        /// Which row was missing.
        message: String,
    },
}

impl StoreError {
    /// Construct an unavailable error from any backend failure.
    pub fn unavailable(message: String, source: impl Error + Send + Sync + 'static) -> Self {
        StoreError::Unavailable {
            message,
            source: Box::new(source),
        }
    }

    /// Construct a uniqueness-violation error.
    pub fn conflict(message: impl Into<String>) -> Self {
        StoreError::Conflict {
            message: message.into(),
        }
    }

    /// Construct a missing-row error.
    pub fn not_found(message: impl Into<String>) -> Self {
        StoreError::NotFound {
            message: message.into(),
        }
    }
}

/// Abstraction over the persistence layer for events and their child rows.
///
/// Batch operations (`seed_event`, `apply_box_mapping`, `upsert_rankings`)
/// are atomic: on any failure no row from the batch may remain persisted.
pub trait EventStore: Send + Sync {
    /// Atomically create an event together with its numbered boxes, and
    /// upsert the given place names. Fails with a conflict when the event
    /// code is already taken.
    fn seed_event(
        &self,
        event: EventEntity,
        place_names: Vec<String>,
        box_count: u8,
    ) -> BoxFuture<'static, StoreResult<()>>;
    /// Look an event up by its join code.
    fn find_event_by_code(&self, code: &str)
    -> BoxFuture<'static, StoreResult<Option<EventEntity>>>;
    /// Look an event up by id.
    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StoreResult<Option<EventEntity>>>;
    /// All events, newest first.
    fn list_events(&self) -> BoxFuture<'static, StoreResult<Vec<EventEntity>>>;
    /// Overwrite an event's phase.
    fn set_event_phase(&self, id: Uuid, phase: EventPhase) -> BoxFuture<'static, StoreResult<()>>;

    /// Insert a place if no place with that name exists yet.
    fn upsert_place(&self, name: &str) -> BoxFuture<'static, StoreResult<PlaceEntity>>;
    /// Look a place up by its unique name.
    fn find_place_by_name(&self, name: &str)
    -> BoxFuture<'static, StoreResult<Option<PlaceEntity>>>;
    /// All places in insertion order.
    fn list_places(&self) -> BoxFuture<'static, StoreResult<Vec<PlaceEntity>>>;

    /// Boxes belonging to an event, ordered by box number.
    fn boxes_for_event(&self, event_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<BoxEntity>>>;
    /// Atomically set the ground-truth place of several boxes, addressed by
    /// `(box number, place id)` within the event.
    fn apply_box_mapping(
        &self,
        event_id: Uuid,
        mapping: Vec<(u8, Uuid)>,
    ) -> BoxFuture<'static, StoreResult<()>>;

    /// Insert a user. Fails with a conflict when the username is already
    /// taken within the event or the token collides.
    fn create_user(&self, user: UserEntity) -> BoxFuture<'static, StoreResult<()>>;
    /// Resolve a session token to its user.
    fn find_user_by_token(&self, token: &str)
    -> BoxFuture<'static, StoreResult<Option<UserEntity>>>;
    /// Look a user up by event and username.
    fn find_user_by_username(
        &self,
        event_id: Uuid,
        username: &str,
    ) -> BoxFuture<'static, StoreResult<Option<UserEntity>>>;
    /// Users registered in an event, in registration order.
    fn users_for_event(&self, event_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<UserEntity>>>;

    /// Insert or overwrite the guess keyed by `(user_id, box_id)`.
    fn upsert_guess(&self, guess: GuessEntity) -> BoxFuture<'static, StoreResult<()>>;
    /// All guesses made by users of an event.
    fn guesses_for_event(&self, event_id: Uuid)
    -> BoxFuture<'static, StoreResult<Vec<GuessEntity>>>;
    /// Guesses made by one user.
    fn guesses_for_user(&self, user_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<GuessEntity>>>;

    /// Atomically insert or overwrite the ranking rows keyed by
    /// `(user_id, rank)`.
    fn upsert_rankings(
        &self,
        entries: Vec<RankingEntity>,
    ) -> BoxFuture<'static, StoreResult<()>>;
    /// All ranking entries made by users of an event.
    fn rankings_for_event(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<Vec<RankingEntity>>>;
    /// Ranking entries of one user, ordered by rank.
    fn rankings_for_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<Vec<RankingEntity>>>;

    /// Probe the backend.
    fn health_check(&self) -> BoxFuture<'static, StoreResult<()>>;
}
