//! In-process store backend.
//!
//! All tables live behind a single `RwLock`, which makes the multi-row
//! batches (`seed_event`, `apply_box_mapping`, `upsert_rankings`) atomic:
//! every batch validates its inputs before touching any row, so a failed
//! batch leaves no partial state behind. `IndexMap` tables keep insertion
//! order, which keeps bulk reads deterministic.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    dao::{
        models::{BoxEntity, EventEntity, GuessEntity, PlaceEntity, RankingEntity, UserEntity},
        store::{EventStore, StoreError, StoreResult},
    },
    state::phase::EventPhase,
};

#[derive(Default)]
struct Tables {
    events: IndexMap<Uuid, EventEntity>,
    places: IndexMap<Uuid, PlaceEntity>,
    boxes: IndexMap<Uuid, BoxEntity>,
    users: IndexMap<Uuid, UserEntity>,
    guesses: IndexMap<(Uuid, Uuid), GuessEntity>,
    rankings: IndexMap<(Uuid, u8), RankingEntity>,
}

/// Process-local [`EventStore`] implementation used as the default backend.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn upsert_place_by_name(&mut self, name: &str) -> PlaceEntity {
        if let Some(place) = self.places.values().find(|place| place.name == name) {
            return place.clone();
        }
        let place = PlaceEntity {
            id: Uuid::new_v4(),
            name: name.to_string(),
        };
        self.places.insert(place.id, place.clone());
        place
    }
}

impl EventStore for MemoryStore {
    fn seed_event(
        &self,
        event: EventEntity,
        place_names: Vec<String>,
        box_count: u8,
    ) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.write().await;
            if tables.events.values().any(|row| row.code == event.code) {
                return Err(StoreError::conflict(format!(
                    "event code `{}` already exists",
                    event.code
                )));
            }

            let event_id = event.id;
            tables.events.insert(event_id, event);
            for name in &place_names {
                tables.upsert_place_by_name(name);
            }
            for number in 1..=box_count {
                let entity = BoxEntity {
                    id: Uuid::new_v4(),
                    event_id,
                    number,
                    place_id: None,
                };
                tables.boxes.insert(entity.id, entity);
            }
            Ok(())
        })
    }

    fn find_event_by_code(
        &self,
        code: &str,
    ) -> BoxFuture<'static, StoreResult<Option<EventEntity>>> {
        let inner = self.inner.clone();
        let code = code.to_string();
        Box::pin(async move {
            let tables = inner.read().await;
            Ok(tables.events.values().find(|row| row.code == code).cloned())
        })
    }

    fn find_event(&self, id: Uuid) -> BoxFuture<'static, StoreResult<Option<EventEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            Ok(tables.events.get(&id).cloned())
        })
    }

    fn list_events(&self) -> BoxFuture<'static, StoreResult<Vec<EventEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            // Insertion order is creation order; newest first.
            Ok(tables.events.values().rev().cloned().collect())
        })
    }

    fn set_event_phase(&self, id: Uuid, phase: EventPhase) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.write().await;
            let event = tables
                .events
                .get_mut(&id)
                .ok_or_else(|| StoreError::not_found(format!("event `{id}` not found")))?;
            event.phase = phase;
            Ok(())
        })
    }

    fn upsert_place(&self, name: &str) -> BoxFuture<'static, StoreResult<PlaceEntity>> {
        let inner = self.inner.clone();
        let name = name.to_string();
        Box::pin(async move {
            let mut tables = inner.write().await;
            Ok(tables.upsert_place_by_name(&name))
        })
    }

    fn find_place_by_name(
        &self,
        name: &str,
    ) -> BoxFuture<'static, StoreResult<Option<PlaceEntity>>> {
        let inner = self.inner.clone();
        let name = name.to_string();
        Box::pin(async move {
            let tables = inner.read().await;
            Ok(tables.places.values().find(|row| row.name == name).cloned())
        })
    }

    fn list_places(&self) -> BoxFuture<'static, StoreResult<Vec<PlaceEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            Ok(tables.places.values().cloned().collect())
        })
    }

    fn boxes_for_event(&self, event_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<BoxEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            let mut boxes: Vec<BoxEntity> = tables
                .boxes
                .values()
                .filter(|row| row.event_id == event_id)
                .cloned()
                .collect();
            boxes.sort_by_key(|row| row.number);
            Ok(boxes)
        })
    }

    fn apply_box_mapping(
        &self,
        event_id: Uuid,
        mapping: Vec<(u8, Uuid)>,
    ) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.write().await;

            // Resolve every row before mutating any so a bad entry cannot
            // leave the batch half-applied.
            let mut updates = Vec::with_capacity(mapping.len());
            for (number, place_id) in mapping {
                if !tables.places.contains_key(&place_id) {
                    return Err(StoreError::not_found(format!(
                        "place `{place_id}` not found"
                    )));
                }
                let box_id = tables
                    .boxes
                    .values()
                    .find(|row| row.event_id == event_id && row.number == number)
                    .map(|row| row.id)
                    .ok_or_else(|| {
                        StoreError::not_found(format!(
                            "box {number} not found in event `{event_id}`"
                        ))
                    })?;
                updates.push((box_id, place_id));
            }

            for (box_id, place_id) in updates {
                if let Some(entity) = tables.boxes.get_mut(&box_id) {
                    entity.place_id = Some(place_id);
                }
            }
            Ok(())
        })
    }

    fn create_user(&self, user: UserEntity) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.write().await;
            if tables
                .users
                .values()
                .any(|row| row.event_id == user.event_id && row.username == user.username)
            {
                return Err(StoreError::conflict(
                    "Username already taken in this event".to_string(),
                ));
            }
            if tables.users.values().any(|row| row.token == user.token) {
                return Err(StoreError::conflict("session token collision".to_string()));
            }
            tables.users.insert(user.id, user);
            Ok(())
        })
    }

    fn find_user_by_token(
        &self,
        token: &str,
    ) -> BoxFuture<'static, StoreResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        let token = token.to_string();
        Box::pin(async move {
            let tables = inner.read().await;
            Ok(tables.users.values().find(|row| row.token == token).cloned())
        })
    }

    fn find_user_by_username(
        &self,
        event_id: Uuid,
        username: &str,
    ) -> BoxFuture<'static, StoreResult<Option<UserEntity>>> {
        let inner = self.inner.clone();
        let username = username.to_string();
        Box::pin(async move {
            let tables = inner.read().await;
            Ok(tables
                .users
                .values()
                .find(|row| row.event_id == event_id && row.username == username)
                .cloned())
        })
    }

    fn users_for_event(&self, event_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<UserEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            Ok(tables
                .users
                .values()
                .filter(|row| row.event_id == event_id)
                .cloned()
                .collect())
        })
    }

    fn upsert_guess(&self, guess: GuessEntity) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.write().await;
            tables.guesses.insert((guess.user_id, guess.box_id), guess);
            Ok(())
        })
    }

    fn guesses_for_event(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<Vec<GuessEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            let event_users: Vec<Uuid> = tables
                .users
                .values()
                .filter(|row| row.event_id == event_id)
                .map(|row| row.id)
                .collect();
            Ok(tables
                .guesses
                .values()
                .filter(|row| event_users.contains(&row.user_id))
                .cloned()
                .collect())
        })
    }

    fn guesses_for_user(&self, user_id: Uuid) -> BoxFuture<'static, StoreResult<Vec<GuessEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            Ok(tables
                .guesses
                .values()
                .filter(|row| row.user_id == user_id)
                .cloned()
                .collect())
        })
    }

    fn upsert_rankings(
        &self,
        entries: Vec<RankingEntity>,
    ) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let mut tables = inner.write().await;
            for entry in entries {
                tables.rankings.insert((entry.user_id, entry.rank), entry);
            }
            Ok(())
        })
    }

    fn rankings_for_event(
        &self,
        event_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<Vec<RankingEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            let event_users: Vec<Uuid> = tables
                .users
                .values()
                .filter(|row| row.event_id == event_id)
                .map(|row| row.id)
                .collect();
            Ok(tables
                .rankings
                .values()
                .filter(|row| event_users.contains(&row.user_id))
                .cloned()
                .collect())
        })
    }

    fn rankings_for_user(
        &self,
        user_id: Uuid,
    ) -> BoxFuture<'static, StoreResult<Vec<RankingEntity>>> {
        let inner = self.inner.clone();
        Box::pin(async move {
            let tables = inner.read().await;
            let mut entries: Vec<RankingEntity> = tables
                .rankings
                .values()
                .filter(|row| row.user_id == user_id)
                .cloned()
                .collect();
            entries.sort_by_key(|row| row.rank);
            Ok(entries)
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StoreResult<()>> {
        Box::pin(async { Ok(()) })
    }
}
