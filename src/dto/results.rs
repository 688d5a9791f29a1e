//! Results payload pushed to rooms and returned by the results endpoint.
//!
//! Field order and mapping key order are deterministic: for identical store
//! snapshots the serialized payload is byte-for-byte identical.

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::state::phase::EventPhase;

/// Full aggregate view of one event, recomputed from scratch on every
/// relevant mutation.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultsPayload {
    /// Current phase of the event.
    pub event_status: EventPhase,
    /// Per-box reveal status, ordered by box number.
    pub boxes: Vec<BoxStatus>,
    /// Per-box aggregates, sorted descending by points (stable: ties keep
    /// box-number order).
    pub results: Vec<BoxResult>,
    /// Per-user accuracy, present only once the event is revealed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_accuracy: Option<Vec<UserAccuracy>>,
    /// Per-user participation progress.
    pub user_progress: Vec<UserProgress>,
}

/// Reveal status of one box.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoxStatus {
    /// Box number within the event.
    pub number: u8,
    /// Ground-truth place name; populated only when the event is revealed
    /// and the admin has mapped this box.
    pub revealed_place: Option<String>,
    /// How many guesses matched the ground truth; present only when
    /// revealed and mapped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_guesses: Option<u32>,
}

/// Aggregate guess and ranking figures for one box.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BoxResult {
    /// Box number within the event.
    pub number: u8,
    /// Place name to number of guesses for that place, insertion-ordered.
    #[schema(value_type = std::collections::BTreeMap<String, u32>)]
    pub guess_dist: IndexMap<String, u32>,
    /// Ranking points: 3 per first place, 2 per second, 1 per third.
    pub points: u32,
    /// How many users put the box at each rank.
    pub rank_counts: RankCounts,
}

/// Number of users who assigned a box to each preference rank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct RankCounts {
    /// Users who ranked the box first.
    #[serde(rename = "1")]
    pub first: u32,
    /// Users who ranked the box second.
    #[serde(rename = "2")]
    pub second: u32,
    /// Users who ranked the box third.
    #[serde(rename = "3")]
    pub third: u32,
}

/// How well one user guessed, disclosed once the event is revealed.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserAccuracy {
    /// Display name of the user.
    pub username: String,
    /// Guesses that matched the revealed ground truth.
    pub correct: u32,
    /// Total guesses the user made.
    pub total: u32,
}

/// Participation progress of one user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    /// User identifier.
    pub user_id: Uuid,
    /// Display name of the user.
    pub username: String,
    /// Number of boxes the user has guessed.
    pub guesses_completed: u32,
    /// Whether the user has submitted all three ranking entries.
    pub ranking_completed: bool,
}
