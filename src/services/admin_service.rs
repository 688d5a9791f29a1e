//! Admin operations: seeding events, driving phases, and mapping boxes to
//! their ground-truth places.

use std::collections::HashMap;

use validator::Validate;

use crate::{
    config::{AppConfig, BOXES_PER_EVENT, DEFAULT_PLACES},
    dao::models::EventEntity,
    dto::admin::{
        AdminBoxView, EventDetail, EventListItem, EventsResponse, MappingRequest, PhaseRequest,
        SeedRequest,
    },
    error::ServiceError,
    services::live_events,
    state::SharedState,
};

/// Check the shared admin secret presented with a request.
pub fn require_admin(config: &AppConfig, presented: Option<&str>) -> Result<(), ServiceError> {
    match presented {
        Some(secret) if config.admin_secret_matches(secret) => Ok(()),
        _ => Err(ServiceError::Forbidden("Forbidden".into())),
    }
}

/// Atomically create an event in the guessing phase together with its six
/// boxes, upserting the default places.
pub async fn seed_event(state: &SharedState, request: SeedRequest) -> Result<(), ServiceError> {
    request
        .validate()
        .map_err(|err| ServiceError::Validation(format!("validation failed: {err}")))?;

    let event = EventEntity::new(request.event_code, request.event_name);
    let place_names = DEFAULT_PLACES.iter().map(|name| name.to_string()).collect();
    state
        .store()
        .seed_event(event, place_names, BOXES_PER_EVENT)
        .await?;
    Ok(())
}

/// Move an event to the requested phase, then notify the room: first the
/// phase change, then a freshly recomputed results payload.
pub async fn set_phase(state: &SharedState, request: PhaseRequest) -> Result<(), ServiceError> {
    let event = state
        .store()
        .find_event_by_code(&request.code)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Event not found".into()))?;

    let change = event.phase.transition(request.status);
    state.store().set_event_phase(event.id, change.to).await?;

    live_events::broadcast_phase(state, event.id, change.to);
    live_events::broadcast_results(state, event.id).await;
    Ok(())
}

/// Atomically map box numbers to their ground-truth places. Idempotent:
/// re-applying the same mapping is a no-op. When the event is already
/// revealed the room is refreshed immediately so viewers see updated
/// correctness.
pub async fn set_box_mapping(
    state: &SharedState,
    request: MappingRequest,
) -> Result<(), ServiceError> {
    let event = state
        .store()
        .find_event_by_code(&request.code)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Event not found".into()))?;

    let mut mapping = Vec::with_capacity(request.mappings.len());
    for (number, place_name) in &request.mappings {
        let place = state
            .store()
            .find_place_by_name(place_name)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Place not found: {place_name}")))?;
        mapping.push((*number, place.id));
    }

    state.store().apply_box_mapping(event.id, mapping).await?;

    if event.phase.is_revealed() {
        live_events::broadcast_results(state, event.id).await;
    }
    Ok(())
}

/// Detailed admin view of one event with per-box participation counters.
pub async fn event_detail(state: &SharedState, code: &str) -> Result<EventDetail, ServiceError> {
    let event = state
        .store()
        .find_event_by_code(code)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Event not found".into()))?;

    let boxes = state.store().boxes_for_event(event.id).await?;
    let guesses = state.store().guesses_for_event(event.id).await?;
    let rankings = state.store().rankings_for_event(event.id).await?;
    let users = state.store().users_for_event(event.id).await?;
    let places: HashMap<_, _> = state
        .store()
        .list_places()
        .await?
        .into_iter()
        .map(|p| (p.id, p.name))
        .collect();

    let boxes = boxes
        .into_iter()
        .map(|entity| AdminBoxView {
            number: entity.number,
            place_name: entity.place_id.and_then(|id| places.get(&id).cloned()),
            guess_count: guesses.iter().filter(|g| g.box_id == entity.id).count() as u32,
            ranking_count: rankings.iter().filter(|r| r.box_id == entity.id).count() as u32,
        })
        .collect();

    Ok(EventDetail::from_entity(&event, users.len() as u32, boxes))
}

/// All events, newest first, with their child counts.
pub async fn list_events(state: &SharedState) -> Result<EventsResponse, ServiceError> {
    let mut events = Vec::new();
    for event in state.store().list_events().await? {
        let user_count = state.store().users_for_event(event.id).await?.len() as u32;
        let box_count = state.store().boxes_for_event(event.id).await?.len() as u32;
        events.push(EventListItem::from_entity(&event, user_count, box_count));
    }
    Ok(EventsResponse { events })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::extract::ws::Message;
    use indexmap::IndexMap;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    use crate::{
        dao::memory::MemoryStore,
        dto::{auth::RegisterRequest, game::GuessRequest},
        services::{auth_service, game_service, results_service},
        state::{AppState, phase::EventPhase, rooms::RoomMember},
    };

    fn fresh_state() -> SharedState {
        AppState::new(
            Arc::new(MemoryStore::new()),
            AppConfig::with_admin_secret("test-secret"),
        )
    }

    async fn seeded_state() -> SharedState {
        let state = fresh_state();
        seed_event(
            &state,
            SeedRequest {
                event_code: "WINGS".into(),
                event_name: "Wing Night".into(),
            },
        )
        .await
        .unwrap();
        state
    }

    fn mappings(entries: &[(u8, &str)]) -> IndexMap<u8, String> {
        entries
            .iter()
            .map(|(number, place)| (*number, place.to_string()))
            .collect()
    }

    #[test]
    fn admin_secret_is_enforced() {
        let config = AppConfig::with_admin_secret("test-secret");
        assert!(require_admin(&config, Some("test-secret")).is_ok());
        assert!(matches!(
            require_admin(&config, Some("wrong")).unwrap_err(),
            ServiceError::Forbidden(_)
        ));
        assert!(matches!(
            require_admin(&config, None).unwrap_err(),
            ServiceError::Forbidden(_)
        ));
    }

    #[tokio::test]
    async fn seeding_twice_with_the_same_code_conflicts() {
        let state = seeded_state().await;
        let err = seed_event(
            &state,
            SeedRequest {
                event_code: "WINGS".into(),
                event_name: "Second Night".into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn seeded_event_matches_scenario_a() {
        let state = seeded_state().await;
        let payload = results_service::results_for_code(&state, "WINGS")
            .await
            .unwrap();

        assert_eq!(payload.event_status, EventPhase::Guessing);
        assert_eq!(
            payload.results.iter().map(|r| r.number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert!(payload.results.iter().all(|r| r.points == 0));
        assert!(payload.boxes.iter().all(|b| b.revealed_place.is_none()));
        assert!(payload.user_accuracy.is_none());
    }

    #[tokio::test]
    async fn phase_change_pushes_status_then_results_to_the_room() {
        let state = seeded_state().await;
        let event = state
            .store()
            .find_event_by_code("WINGS")
            .await
            .unwrap()
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        state.rooms().join(
            event.id,
            RoomMember {
                id: Uuid::new_v4(),
                tx,
            },
        );

        set_phase(
            &state,
            PhaseRequest {
                code: "WINGS".into(),
                status: EventPhase::Ranking,
            },
        )
        .await
        .unwrap();

        let first = rx.recv().await.expect("status frame");
        let Message::Text(text) = first else {
            panic!("expected text frame");
        };
        assert!(text.as_str().contains("\"event:status\""));
        assert!(text.as_str().contains("\"RANKING\""));

        let second = rx.recv().await.expect("results frame");
        let Message::Text(text) = second else {
            panic!("expected text frame");
        };
        assert!(text.as_str().contains("\"results:update\""));
    }

    #[tokio::test]
    async fn mapping_is_idempotent_down_to_the_payload_bytes() {
        let state = seeded_state().await;
        let request = MappingRequest {
            code: "WINGS".into(),
            mappings: mappings(&[(1, "Jollibee"), (2, "KFC")]),
        };

        set_box_mapping(&state, request).await.unwrap();
        let first = serde_json::to_string(
            &results_service::results_for_code(&state, "WINGS")
                .await
                .unwrap(),
        )
        .unwrap();

        set_box_mapping(
            &state,
            MappingRequest {
                code: "WINGS".into(),
                mappings: mappings(&[(1, "Jollibee"), (2, "KFC")]),
            },
        )
        .await
        .unwrap();
        let second = serde_json::to_string(
            &results_service::results_for_code(&state, "WINGS")
                .await
                .unwrap(),
        )
        .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn mapping_unknown_place_is_not_found() {
        let state = seeded_state().await;
        let err = set_box_mapping(
            &state,
            MappingRequest {
                code: "WINGS".into(),
                mappings: mappings(&[(1, "Chick-fil-A")]),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn reveal_with_correct_guess_surfaces_accuracy() {
        let state = seeded_state().await;
        let token = auth_service::register(
            &state,
            RegisterRequest {
                event_code: "WINGS".into(),
                username: "alice".into(),
            },
        )
        .await
        .unwrap()
        .token;

        game_service::submit_guess(
            &state,
            Some(&token),
            GuessRequest {
                box_number: 1,
                place_name: "Jollibee".into(),
            },
        )
        .await
        .unwrap();

        set_box_mapping(
            &state,
            MappingRequest {
                code: "WINGS".into(),
                mappings: mappings(&[(1, "Jollibee")]),
            },
        )
        .await
        .unwrap();
        set_phase(
            &state,
            PhaseRequest {
                code: "WINGS".into(),
                status: EventPhase::Revealed,
            },
        )
        .await
        .unwrap();

        let payload = results_service::results_for_code(&state, "WINGS")
            .await
            .unwrap();
        assert_eq!(payload.boxes[0].correct_guesses, Some(1));
        let accuracy = payload.user_accuracy.expect("revealed payload");
        assert_eq!(accuracy[0].username, "alice");
        assert!(accuracy[0].correct >= 1);
    }

    #[tokio::test]
    async fn mapping_while_revealed_refreshes_the_room() {
        let state = seeded_state().await;
        let event = state
            .store()
            .find_event_by_code("WINGS")
            .await
            .unwrap()
            .unwrap();
        state
            .store()
            .set_event_phase(event.id, EventPhase::Revealed)
            .await
            .unwrap();

        let (tx, mut rx) = mpsc::unbounded_channel();
        state.rooms().join(
            event.id,
            RoomMember {
                id: Uuid::new_v4(),
                tx,
            },
        );

        set_box_mapping(
            &state,
            MappingRequest {
                code: "WINGS".into(),
                mappings: mappings(&[(3, "Starbird")]),
            },
        )
        .await
        .unwrap();

        let frame = rx.recv().await.expect("results frame");
        let Message::Text(text) = frame else {
            panic!("expected text frame");
        };
        assert!(text.as_str().contains("\"results:update\""));
        assert!(text.as_str().contains("Starbird"));
    }

    #[tokio::test]
    async fn event_listing_and_detail_report_counts() {
        let state = seeded_state().await;
        auth_service::register(
            &state,
            RegisterRequest {
                event_code: "WINGS".into(),
                username: "alice".into(),
            },
        )
        .await
        .unwrap();

        let listing = list_events(&state).await.unwrap();
        assert_eq!(listing.events.len(), 1);
        assert_eq!(listing.events[0].code, "WINGS");
        assert_eq!(listing.events[0].user_count, 1);
        assert_eq!(listing.events[0].box_count, 6);

        let detail = event_detail(&state, "WINGS").await.unwrap();
        assert_eq!(detail.user_count, 1);
        assert_eq!(detail.boxes.len(), 6);
        assert!(detail.boxes.iter().all(|b| b.guess_count == 0));
    }
}
