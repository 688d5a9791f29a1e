//! Guess and ranking shapes for participant endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Payload submitting or revising a guess for one box.
#[derive(Debug, Deserialize, ToSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    /// Box number being guessed, 1 through 6.
    #[validate(range(min = 1, max = 6))]
    pub box_number: u8,
    /// Name of the guessed origin place.
    pub place_name: String,
}

/// Payload submitting the caller's top-three ranking.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RankRequest {
    /// Box ranked first (3 points).
    #[validate(range(min = 1, max = 6))]
    pub first: u8,
    /// Box ranked second (2 points).
    #[validate(range(min = 1, max = 6))]
    pub second: u8,
    /// Box ranked third (1 point).
    #[validate(range(min = 1, max = 6))]
    pub third: u8,
}

/// One of the caller's stored guesses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GuessView {
    /// Guessed box number.
    pub box_number: u8,
    /// Guessed place name.
    pub place_name: String,
}

/// The caller's stored guesses.
#[derive(Debug, Serialize, ToSchema)]
pub struct GuessesResponse {
    /// Guesses in store order.
    pub guesses: Vec<GuessView>,
}

/// One of the caller's stored ranking entries.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RankingView {
    /// Preference position, 1 through 3.
    pub rank: u8,
    /// Box assigned to that position.
    pub box_number: u8,
}

/// The caller's stored ranking entries.
#[derive(Debug, Serialize, ToSchema)]
pub struct RankingsResponse {
    /// Entries ordered by rank.
    pub rankings: Vec<RankingView>,
}

/// Candidate origin places participants can pick from.
#[derive(Debug, Serialize, ToSchema)]
pub struct PlacesResponse {
    /// Place names sorted alphabetically.
    pub places: Vec<String>,
}

/// Ground-truth mapping for one box, available to participants on request.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswerView {
    /// Box number.
    pub number: u8,
    /// Mapped place name, if the admin has set one.
    pub place: Option<String>,
}

/// Box-to-place answers regardless of phase (party mode).
#[derive(Debug, Serialize, ToSchema)]
pub struct AnswersResponse {
    /// Answers ordered by box number.
    pub answers: Vec<AnswerView>,
}
