//! Participant mutations: guesses and rankings.
//!
//! Every mutation runs validation, then persistence, then triggers a
//! full-refresh room broadcast. Broadcast failures never affect the
//! mutation outcome.

use std::collections::{HashMap, HashSet};

use validator::Validate;

use crate::{
    config::DEFAULT_PLACES,
    dao::models::{GuessEntity, RankingEntity},
    dto::game::{
        AnswerView, AnswersResponse, GuessRequest, GuessView, GuessesResponse, PlacesResponse,
        RankRequest, RankingView, RankingsResponse,
    },
    error::ServiceError,
    services::{auth_service, live_events},
    state::SharedState,
};

/// Submit or revise the caller's guess for one box. Legal only while the
/// event is in the guessing phase.
pub async fn submit_guess(
    state: &SharedState,
    token: Option<&str>,
    request: GuessRequest,
) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::Validation(format!("validation failed: {err}")))?;

    let (user, event) = auth_service::authenticate(state, token).await?;
    if !event.phase.allows_guessing() {
        return Err(ServiceError::Validation("Not in guessing phase".into()));
    }

    let boxes = state.store().boxes_for_event(event.id).await?;
    let box_id = boxes
        .iter()
        .find(|entity| entity.number == request.box_number)
        .map(|entity| entity.id)
        .ok_or_else(|| ServiceError::Validation("Invalid box number".into()))?;
    let place = state
        .store()
        .find_place_by_name(&request.place_name)
        .await?
        .ok_or_else(|| ServiceError::Validation("Invalid place name".into()))?;

    state
        .store()
        .upsert_guess(GuessEntity {
            user_id: user.id,
            box_id,
            place_id: place.id,
        })
        .await?;

    live_events::broadcast_results(state, event.id).await;
    Ok(())
}

/// The caller's stored guesses.
pub async fn my_guesses(
    state: &SharedState,
    token: Option<&str>,
) -> Result<GuessesResponse, ServiceError> {
    let (user, event) = auth_service::authenticate(state, token).await?;

    let boxes = state.store().boxes_for_event(event.id).await?;
    let numbers: HashMap<_, _> = boxes.iter().map(|b| (b.id, b.number)).collect();
    let places: HashMap<_, _> = state
        .store()
        .list_places()
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let guesses = state
        .store()
        .guesses_for_user(user.id)
        .await?
        .into_iter()
        .filter_map(|guess| {
            Some(GuessView {
                box_number: *numbers.get(&guess.box_id)?,
                place_name: places.get(&guess.place_id)?.clone(),
            })
        })
        .collect();

    Ok(GuessesResponse { guesses })
}

/// Submit the caller's top-three ranking. The three boxes must be pairwise
/// distinct; all three rows are upserted atomically.
///
/// Deliberately lenient about guessing progress: a ranking is accepted even
/// before all six guesses exist, matching the product behavior where the UI
/// is the only gate.
pub async fn submit_ranking(
    state: &SharedState,
    token: Option<&str>,
    request: RankRequest,
) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::Validation(format!("validation failed: {err}")))?;

    let picks = [request.first, request.second, request.third];
    if picks.iter().collect::<HashSet<_>>().len() != picks.len() {
        return Err(ServiceError::Validation(
            "Must select 3 different boxes".into(),
        ));
    }

    let (user, event) = auth_service::authenticate(state, token).await?;

    let boxes = state.store().boxes_for_event(event.id).await?;
    let by_number: HashMap<_, _> = boxes.iter().map(|b| (b.number, b.id)).collect();
    let entries = picks
        .iter()
        .enumerate()
        .map(|(index, number)| {
            let box_id = *by_number
                .get(number)
                .ok_or_else(|| ServiceError::Validation("Invalid box numbers".into()))?;
            Ok(RankingEntity {
                user_id: user.id,
                rank: index as u8 + 1,
                box_id,
            })
        })
        .collect::<Result<Vec<_>, ServiceError>>()?;

    state.store().upsert_rankings(entries).await?;

    live_events::broadcast_results(state, event.id).await;
    Ok(())
}

/// The caller's stored ranking entries, ordered by rank.
pub async fn my_rankings(
    state: &SharedState,
    token: Option<&str>,
) -> Result<RankingsResponse, ServiceError> {
    let (user, event) = auth_service::authenticate(state, token).await?;

    let boxes = state.store().boxes_for_event(event.id).await?;
    let numbers: HashMap<_, _> = boxes.iter().map(|b| (b.id, b.number)).collect();

    let rankings = state
        .store()
        .rankings_for_user(user.id)
        .await?
        .into_iter()
        .filter_map(|entry| {
            Some(RankingView {
                rank: entry.rank,
                box_number: *numbers.get(&entry.box_id)?,
            })
        })
        .collect();

    Ok(RankingsResponse { rankings })
}

/// All candidate place names, alphabetical. Seeds the default party places
/// when the table is empty so a fresh deployment is immediately playable.
pub async fn list_places(state: &SharedState) -> Result<PlacesResponse, ServiceError> {
    let mut places = state.store().list_places().await?;
    if places.is_empty() {
        for name in DEFAULT_PLACES {
            state.store().upsert_place(name).await?;
        }
        places = state.store().list_places().await?;
    }

    let mut names: Vec<String> = places.into_iter().map(|p| p.name).collect();
    names.sort();
    Ok(PlacesResponse { places: names })
}

/// Box-to-place answers for the caller's event regardless of phase.
pub async fn answers(
    state: &SharedState,
    token: Option<&str>,
) -> Result<AnswersResponse, ServiceError> {
    let (_user, event) = auth_service::authenticate(state, token).await?;

    let places: HashMap<_, _> = state
        .store()
        .list_places()
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let answers = state
        .store()
        .boxes_for_event(event.id)
        .await?
        .into_iter()
        .map(|entity| AnswerView {
            number: entity.number,
            place: entity.place_id.and_then(|id| places.get(&id).cloned()),
        })
        .collect();

    Ok(AnswersResponse { answers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::{memory::MemoryStore, models::EventEntity, store::EventStore},
        dto::auth::RegisterRequest,
        services::results_service,
        state::{AppState, phase::EventPhase},
    };

    async fn party_state() -> SharedState {
        let store = MemoryStore::new();
        let place_names = DEFAULT_PLACES.iter().map(|name| name.to_string()).collect();
        store
            .seed_event(EventEntity::new("WINGS", "Wing Night"), place_names, 6)
            .await
            .unwrap();
        AppState::new(Arc::new(store), AppConfig::default())
    }

    async fn join(state: &SharedState, username: &str) -> String {
        auth_service::register(
            state,
            RegisterRequest {
                event_code: "WINGS".into(),
                username: username.into(),
            },
        )
        .await
        .unwrap()
        .token
    }

    async fn event_id(state: &SharedState) -> uuid::Uuid {
        state
            .store()
            .find_event_by_code("WINGS")
            .await
            .unwrap()
            .unwrap()
            .id
    }

    fn guess(box_number: u8, place: &str) -> GuessRequest {
        GuessRequest {
            box_number,
            place_name: place.into(),
        }
    }

    #[tokio::test]
    async fn guess_upsert_overwrites_instead_of_accumulating() {
        let state = party_state().await;
        let token = join(&state, "alice").await;

        submit_guess(&state, Some(&token), guess(1, "KFC"))
            .await
            .unwrap();
        submit_guess(&state, Some(&token), guess(1, "Popeyes"))
            .await
            .unwrap();

        let payload = results_service::results_for_event(&state, event_id(&state).await)
            .await
            .unwrap();
        let box_one = payload.results.iter().find(|r| r.number == 1).unwrap();
        assert_eq!(box_one.guess_dist.get("Popeyes"), Some(&1));
        assert_eq!(box_one.guess_dist.get("KFC"), None);
    }

    #[tokio::test]
    async fn guessing_outside_the_guessing_phase_changes_nothing() {
        let state = party_state().await;
        let token = join(&state, "alice").await;
        let event = event_id(&state).await;
        state
            .store()
            .set_event_phase(event, EventPhase::Ranking)
            .await
            .unwrap();

        let err = submit_guess(&state, Some(&token), guess(1, "KFC"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(message) => assert_eq!(message, "Not in guessing phase"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(state
            .store()
            .guesses_for_event(event)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn unknown_box_or_place_is_rejected() {
        let state = party_state().await;
        let token = join(&state, "alice").await;

        let err = submit_guess(&state, Some(&token), guess(9, "KFC"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let err = submit_guess(&state, Some(&token), guess(1, "Chick-fil-A"))
            .await
            .unwrap_err();
        match err {
            ServiceError::Validation(message) => assert_eq!(message, "Invalid place name"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn duplicate_ranking_pick_is_rejected_without_rows() {
        let state = party_state().await;
        let token = join(&state, "alice").await;

        let err = submit_ranking(
            &state,
            Some(&token),
            RankRequest {
                first: 2,
                second: 2,
                third: 5,
            },
        )
        .await
        .unwrap_err();
        match err {
            ServiceError::Validation(message) => {
                assert_eq!(message, "Must select 3 different boxes")
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(state
            .store()
            .rankings_for_event(event_id(&state).await)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn resubmitted_ranking_replaces_all_three_rows() {
        let state = party_state().await;
        let token = join(&state, "alice").await;

        submit_ranking(
            &state,
            Some(&token),
            RankRequest {
                first: 1,
                second: 2,
                third: 3,
            },
        )
        .await
        .unwrap();
        submit_ranking(
            &state,
            Some(&token),
            RankRequest {
                first: 4,
                second: 5,
                third: 6,
            },
        )
        .await
        .unwrap();

        let mine = my_rankings(&state, Some(&token)).await.unwrap();
        let ordered: Vec<(u8, u8)> = mine
            .rankings
            .iter()
            .map(|r| (r.rank, r.box_number))
            .collect();
        assert_eq!(ordered, vec![(1, 4), (2, 5), (3, 6)]);
    }

    // Lenient on purpose: rankings are accepted before all six guesses
    // exist, the UI is the only gate.
    #[tokio::test]
    async fn ranking_is_accepted_without_any_guesses() {
        let state = party_state().await;
        let token = join(&state, "alice").await;

        submit_ranking(
            &state,
            Some(&token),
            RankRequest {
                first: 1,
                second: 2,
                third: 3,
            },
        )
        .await
        .unwrap();

        let payload = results_service::results_for_event(&state, event_id(&state).await)
            .await
            .unwrap();
        let alice = payload
            .user_progress
            .iter()
            .find(|p| p.username == "alice")
            .unwrap();
        assert_eq!(alice.guesses_completed, 0);
        assert!(alice.ranking_completed);
    }

    #[tokio::test]
    async fn places_are_seeded_lazily_and_sorted() {
        let store = MemoryStore::new();
        let state = AppState::new(Arc::new(store), AppConfig::default());

        let response = list_places(&state).await.unwrap();
        let mut expected: Vec<String> = DEFAULT_PLACES.iter().map(|s| s.to_string()).collect();
        expected.sort();
        assert_eq!(response.places, expected);

        // Second call must not duplicate anything.
        let again = list_places(&state).await.unwrap();
        assert_eq!(again.places, expected);
    }

    #[tokio::test]
    async fn answers_expose_mappings_regardless_of_phase() {
        let state = party_state().await;
        let token = join(&state, "alice").await;
        let event = event_id(&state).await;
        let kfc = state
            .store()
            .find_place_by_name("KFC")
            .await
            .unwrap()
            .unwrap();
        state
            .store()
            .apply_box_mapping(event, vec![(2, kfc.id)])
            .await
            .unwrap();

        let response = answers(&state, Some(&token)).await.unwrap();
        assert_eq!(response.answers.len(), 6);
        assert_eq!(response.answers[1].place.as_deref(), Some("KFC"));
        assert!(response.answers[0].place.is_none());
    }
}
