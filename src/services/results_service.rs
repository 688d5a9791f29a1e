//! Results aggregation: the pure payload builder and the store-facing
//! snapshot loader around it.

use std::{collections::HashMap, sync::Arc};

use indexmap::IndexMap;
use uuid::Uuid;

use crate::{
    dao::{
        models::{BoxEntity, EventEntity, GuessEntity, PlaceEntity, RankingEntity, UserEntity},
        store::EventStore,
    },
    dto::results::{BoxResult, BoxStatus, RankCounts, ResultsPayload, UserAccuracy, UserProgress},
    error::ServiceError,
    state::SharedState,
};

/// Read-only view of everything the aggregator needs for one event.
#[derive(Debug, Clone)]
pub struct EventSnapshot {
    /// The event row.
    pub event: EventEntity,
    /// Boxes ordered by number.
    pub boxes: Vec<BoxEntity>,
    /// All known places (guesses and mappings reference them).
    pub places: Vec<PlaceEntity>,
    /// Users of the event in registration order.
    pub users: Vec<UserEntity>,
    /// All guesses made by the event's users.
    pub guesses: Vec<GuessEntity>,
    /// All ranking entries made by the event's users.
    pub rankings: Vec<RankingEntity>,
}

/// Load the aggregation snapshot for an event with bulk reads.
pub async fn snapshot_for_event(
    store: &Arc<dyn EventStore>,
    event_id: Uuid,
) -> Result<EventSnapshot, ServiceError> {
    let event = store
        .find_event(event_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("event `{event_id}` not found")))?;
    let boxes = store.boxes_for_event(event_id).await?;
    let places = store.list_places().await?;
    let users = store.users_for_event(event_id).await?;
    let guesses = store.guesses_for_event(event_id).await?;
    let rankings = store.rankings_for_event(event_id).await?;

    Ok(EventSnapshot {
        event,
        boxes,
        places,
        users,
        guesses,
        rankings,
    })
}

/// Compute the full results payload for an event.
pub async fn results_for_event(
    state: &SharedState,
    event_id: Uuid,
) -> Result<ResultsPayload, ServiceError> {
    let snapshot = snapshot_for_event(state.store(), event_id).await?;
    Ok(build_results(&snapshot))
}

/// Compute the results payload for an event addressed by join code.
pub async fn results_for_code(
    state: &SharedState,
    code: &str,
) -> Result<ResultsPayload, ServiceError> {
    let event = state
        .store()
        .find_event_by_code(code)
        .await?
        .ok_or_else(|| ServiceError::NotFound("Event not found".into()))?;
    results_for_event(state, event.id).await
}

/// Points awarded for placing a box at the given rank.
fn rank_weight(rank: u8) -> u32 {
    match rank {
        1 => 3,
        2 => 2,
        _ => 1,
    }
}

struct BoxAccumulator {
    number: u8,
    truth: Option<Uuid>,
    guess_dist: IndexMap<String, u32>,
    points: u32,
    rank_counts: RankCounts,
    correct: u32,
}

/// Build the results payload from a snapshot.
///
/// Pure and deterministic: identical snapshots yield byte-for-byte
/// identical serialized payloads. Guess distributions use insertion order,
/// the results list is sorted with a stable sort so point ties keep
/// box-number order.
pub fn build_results(snapshot: &EventSnapshot) -> ResultsPayload {
    let revealed = snapshot.event.phase.is_revealed();

    let place_names: HashMap<Uuid, &str> = snapshot
        .places
        .iter()
        .map(|place| (place.id, place.name.as_str()))
        .collect();

    let mut by_box: IndexMap<Uuid, BoxAccumulator> = snapshot
        .boxes
        .iter()
        .map(|entity| {
            (
                entity.id,
                BoxAccumulator {
                    number: entity.number,
                    truth: entity.place_id,
                    guess_dist: IndexMap::new(),
                    points: 0,
                    rank_counts: RankCounts::default(),
                    correct: 0,
                },
            )
        })
        .collect();

    for guess in &snapshot.guesses {
        let Some(acc) = by_box.get_mut(&guess.box_id) else {
            continue;
        };
        let Some(name) = place_names.get(&guess.place_id) else {
            continue;
        };
        *acc.guess_dist.entry((*name).to_string()).or_insert(0) += 1;
        if revealed && acc.truth == Some(guess.place_id) {
            acc.correct += 1;
        }
    }

    for entry in &snapshot.rankings {
        let Some(acc) = by_box.get_mut(&entry.box_id) else {
            continue;
        };
        acc.points += rank_weight(entry.rank);
        match entry.rank {
            1 => acc.rank_counts.first += 1,
            2 => acc.rank_counts.second += 1,
            3 => acc.rank_counts.third += 1,
            _ => {}
        }
    }

    let boxes = by_box
        .values()
        .map(|acc| {
            let revealed_place = if revealed {
                acc.truth
                    .and_then(|id| place_names.get(&id))
                    .map(|name| (*name).to_string())
            } else {
                None
            };
            // An unmapped box carries no correctness figure even when the
            // event is revealed.
            let correct_guesses = if revealed && acc.truth.is_some() {
                Some(acc.correct)
            } else {
                None
            };
            BoxStatus {
                number: acc.number,
                revealed_place,
                correct_guesses,
            }
        })
        .collect();

    let mut results: Vec<BoxResult> = by_box
        .values()
        .map(|acc| BoxResult {
            number: acc.number,
            guess_dist: acc.guess_dist.clone(),
            points: acc.points,
            rank_counts: acc.rank_counts,
        })
        .collect();
    // Stable: point ties keep box-number order.
    results.sort_by(|a, b| b.points.cmp(&a.points));

    let user_accuracy = revealed.then(|| {
        let mut rows: Vec<UserAccuracy> = snapshot
            .users
            .iter()
            .map(|user| {
                let mut correct = 0;
                let mut total = 0;
                for guess in snapshot.guesses.iter().filter(|g| g.user_id == user.id) {
                    total += 1;
                    let truth = by_box.get(&guess.box_id).and_then(|acc| acc.truth);
                    if truth == Some(guess.place_id) {
                        correct += 1;
                    }
                }
                UserAccuracy {
                    username: user.username.clone(),
                    correct,
                    total,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.correct.cmp(&a.correct));
        rows
    });

    let user_progress = snapshot
        .users
        .iter()
        .map(|user| UserProgress {
            user_id: user.id,
            username: user.username.clone(),
            guesses_completed: snapshot
                .guesses
                .iter()
                .filter(|g| g.user_id == user.id)
                .count() as u32,
            ranking_completed: snapshot
                .rankings
                .iter()
                .filter(|r| r.user_id == user.id)
                .count()
                == 3,
        })
        .collect();

    ResultsPayload {
        event_status: snapshot.event.phase,
        boxes,
        results,
        user_accuracy,
        user_progress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::phase::EventPhase;

    struct Fixture {
        snapshot: EventSnapshot,
    }

    impl Fixture {
        fn new() -> Self {
            let event = EventEntity::new("WINGS", "Wing Night");
            let boxes = (1..=6)
                .map(|number| BoxEntity {
                    id: Uuid::new_v4(),
                    event_id: event.id,
                    number,
                    place_id: None,
                })
                .collect();
            let places = ["Popeyes", "Jollibee", "KFC", "Starbird"]
                .into_iter()
                .map(|name| PlaceEntity {
                    id: Uuid::new_v4(),
                    name: name.to_string(),
                })
                .collect();
            Self {
                snapshot: EventSnapshot {
                    event,
                    boxes,
                    places,
                    users: vec![],
                    guesses: vec![],
                    rankings: vec![],
                },
            }
        }

        fn place(&self, name: &str) -> Uuid {
            self.snapshot
                .places
                .iter()
                .find(|p| p.name == name)
                .expect("fixture place")
                .id
        }

        fn box_id(&self, number: u8) -> Uuid {
            self.snapshot
                .boxes
                .iter()
                .find(|b| b.number == number)
                .expect("fixture box")
                .id
        }

        fn add_user(&mut self, username: &str) -> Uuid {
            let user = UserEntity {
                id: Uuid::new_v4(),
                event_id: self.snapshot.event.id,
                username: username.to_string(),
                token: Uuid::new_v4().to_string(),
            };
            let id = user.id;
            self.snapshot.users.push(user);
            id
        }

        fn guess(&mut self, user_id: Uuid, number: u8, place: &str) {
            let guess = GuessEntity {
                user_id,
                box_id: self.box_id(number),
                place_id: self.place(place),
            };
            // Upsert semantics, mirroring the store's composite key.
            self.snapshot
                .guesses
                .retain(|g| !(g.user_id == user_id && g.box_id == guess.box_id));
            self.snapshot.guesses.push(guess);
        }

        fn rank(&mut self, user_id: Uuid, rank: u8, number: u8) {
            self.snapshot.rankings.push(RankingEntity {
                user_id,
                rank,
                box_id: self.box_id(number),
            });
        }

        fn map_box(&mut self, number: u8, place: &str) {
            let place_id = self.place(place);
            let box_id = self.box_id(number);
            for entity in &mut self.snapshot.boxes {
                if entity.id == box_id {
                    entity.place_id = Some(place_id);
                }
            }
        }

        fn set_phase(&mut self, phase: EventPhase) {
            self.snapshot.event.phase = phase;
        }
    }

    #[test]
    fn fresh_event_yields_all_zero_results_in_box_order() {
        let fixture = Fixture::new();
        let payload = build_results(&fixture.snapshot);

        assert_eq!(payload.event_status, EventPhase::Guessing);
        assert_eq!(
            payload.results.iter().map(|r| r.number).collect::<Vec<_>>(),
            vec![1, 2, 3, 4, 5, 6]
        );
        assert!(payload.results.iter().all(|r| r.points == 0));
        assert!(payload.results.iter().all(|r| r.guess_dist.is_empty()));
        assert!(payload.boxes.iter().all(|b| b.revealed_place.is_none()));
        assert!(payload.boxes.iter().all(|b| b.correct_guesses.is_none()));
        assert!(payload.user_accuracy.is_none());
        assert!(payload.user_progress.is_empty());
    }

    #[test]
    fn regressed_guess_counts_once_after_overwrite() {
        let mut fixture = Fixture::new();
        let alice = fixture.add_user("alice");
        fixture.guess(alice, 1, "KFC");
        fixture.guess(alice, 1, "Popeyes");

        let payload = build_results(&fixture.snapshot);
        let box_one = payload.results.iter().find(|r| r.number == 1).unwrap();
        assert_eq!(box_one.guess_dist.len(), 1);
        assert_eq!(box_one.guess_dist.get("Popeyes"), Some(&1));
        assert_eq!(box_one.guess_dist.get("KFC"), None);
    }

    #[test]
    fn ranking_points_and_counts_accumulate_per_box() {
        let mut fixture = Fixture::new();
        let alice = fixture.add_user("alice");
        let bob = fixture.add_user("bob");
        fixture.rank(alice, 1, 3);
        fixture.rank(bob, 2, 3);

        let payload = build_results(&fixture.snapshot);
        let box_three = payload.results.iter().find(|r| r.number == 3).unwrap();
        assert_eq!(box_three.points, 5);
        assert_eq!(
            box_three.rank_counts,
            RankCounts {
                first: 1,
                second: 1,
                third: 0,
            }
        );
        // Highest points first.
        assert_eq!(payload.results[0].number, 3);
    }

    #[test]
    fn point_ties_keep_box_number_order() {
        let mut fixture = Fixture::new();
        let alice = fixture.add_user("alice");
        let bob = fixture.add_user("bob");
        // Boxes 2 and 5 both end up with 3 points.
        fixture.rank(alice, 1, 5);
        fixture.rank(bob, 2, 2);
        fixture.rank(bob, 3, 2);

        let payload = build_results(&fixture.snapshot);
        let ordered: Vec<u8> = payload.results.iter().map(|r| r.number).collect();
        assert_eq!(ordered, vec![2, 5, 1, 3, 4, 6]);
    }

    #[test]
    fn reveal_discloses_truth_and_accuracy() {
        let mut fixture = Fixture::new();
        let alice = fixture.add_user("alice");
        let bob = fixture.add_user("bob");
        fixture.guess(alice, 1, "Jollibee");
        fixture.guess(alice, 2, "KFC");
        fixture.guess(bob, 1, "Popeyes");
        fixture.map_box(1, "Jollibee");
        fixture.set_phase(EventPhase::Revealed);

        let payload = build_results(&fixture.snapshot);

        let box_one = payload.boxes.iter().find(|b| b.number == 1).unwrap();
        assert_eq!(box_one.revealed_place.as_deref(), Some("Jollibee"));
        assert_eq!(box_one.correct_guesses, Some(1));

        let accuracy = payload.user_accuracy.expect("revealed payload");
        assert_eq!(accuracy[0].username, "alice");
        assert_eq!(accuracy[0].correct, 1);
        assert_eq!(accuracy[0].total, 2);
        assert_eq!(accuracy[1].username, "bob");
        assert_eq!(accuracy[1].correct, 0);
    }

    #[test]
    fn unmapped_box_stays_silent_even_when_revealed() {
        let mut fixture = Fixture::new();
        let alice = fixture.add_user("alice");
        fixture.guess(alice, 2, "KFC");
        fixture.map_box(1, "Jollibee");
        fixture.set_phase(EventPhase::Revealed);

        let payload = build_results(&fixture.snapshot);
        let box_two = payload.boxes.iter().find(|b| b.number == 2).unwrap();
        assert!(box_two.revealed_place.is_none());
        assert!(box_two.correct_guesses.is_none());
    }

    #[test]
    fn truth_is_withheld_before_reveal() {
        let mut fixture = Fixture::new();
        fixture.map_box(1, "Jollibee");
        fixture.set_phase(EventPhase::Ranking);

        let payload = build_results(&fixture.snapshot);
        let box_one = payload.boxes.iter().find(|b| b.number == 1).unwrap();
        assert!(box_one.revealed_place.is_none());
        assert!(box_one.correct_guesses.is_none());
        assert!(payload.user_accuracy.is_none());
    }

    #[test]
    fn user_progress_tracks_guesses_and_ranking_completion() {
        let mut fixture = Fixture::new();
        let alice = fixture.add_user("alice");
        let bob = fixture.add_user("bob");
        fixture.guess(alice, 1, "KFC");
        fixture.guess(alice, 2, "Popeyes");
        fixture.rank(alice, 1, 1);
        fixture.rank(alice, 2, 2);
        fixture.rank(alice, 3, 3);
        fixture.rank(bob, 1, 4);

        let payload = build_results(&fixture.snapshot);
        let alice_row = payload
            .user_progress
            .iter()
            .find(|p| p.username == "alice")
            .unwrap();
        assert_eq!(alice_row.guesses_completed, 2);
        assert!(alice_row.ranking_completed);

        let bob_row = payload
            .user_progress
            .iter()
            .find(|p| p.username == "bob")
            .unwrap();
        assert_eq!(bob_row.guesses_completed, 0);
        assert!(!bob_row.ranking_completed);
    }

    #[test]
    fn identical_snapshots_serialize_identically() {
        let mut fixture = Fixture::new();
        let alice = fixture.add_user("alice");
        let bob = fixture.add_user("bob");
        fixture.guess(alice, 1, "KFC");
        fixture.guess(bob, 1, "Popeyes");
        fixture.guess(bob, 4, "Starbird");
        fixture.rank(alice, 1, 4);
        fixture.rank(bob, 2, 1);
        fixture.map_box(4, "Starbird");
        fixture.set_phase(EventPhase::Revealed);

        let first = serde_json::to_string(&build_results(&fixture.snapshot)).unwrap();
        let second = serde_json::to_string(&build_results(&fixture.snapshot)).unwrap();
        assert_eq!(first, second);
    }
}
