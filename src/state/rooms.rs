//! Per-event broadcast rooms.
//!
//! One room per event holds the outbound channels of every live WebSocket
//! subscribed to that event. Delivery is best-effort: a member whose writer
//! channel is gone is pruned on the spot, and a failure in one room never
//! affects another.

use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
/// Handle used to push messages to one connected viewer.
pub struct RoomMember {
    /// Connection identifier, unique per socket.
    pub id: Uuid,
    /// Writer channel feeding the connection's send task.
    pub tx: mpsc::UnboundedSender<Message>,
}

/// Process-wide registry mapping event ids to their live room members.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<Uuid, DashMap<Uuid, RoomMember>>,
}

impl RoomRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a connection to an event's room.
    pub fn join(&self, event_id: Uuid, member: RoomMember) {
        let room = self.rooms.entry(event_id).or_default();
        room.insert(member.id, member);
    }

    /// Drop a connection from an event's room, removing the room once empty.
    pub fn leave(&self, event_id: Uuid, connection_id: Uuid) {
        let mut drop_room = false;
        if let Some(room) = self.rooms.get(&event_id) {
            room.remove(&connection_id);
            drop_room = room.is_empty();
        }
        if drop_room {
            self.rooms.remove_if(&event_id, |_, room| room.is_empty());
        }
    }

    /// Fan a serialized payload out to every member of an event's room,
    /// pruning members whose writer channel has closed.
    pub fn broadcast(&self, event_id: Uuid, payload: &str) {
        let Some(room) = self.rooms.get(&event_id) else {
            return;
        };

        let mut dead = Vec::new();
        for member in room.iter() {
            if member
                .tx
                .send(Message::Text(payload.to_string().into()))
                .is_err()
            {
                dead.push(member.id);
            }
        }
        for connection_id in dead {
            debug!(%event_id, %connection_id, "pruning closed room member");
            room.remove(&connection_id);
        }
    }

    /// Number of live members in an event's room.
    pub fn member_count(&self, event_id: Uuid) -> usize {
        self.rooms
            .get(&event_id)
            .map(|room| room.len())
            .unwrap_or(0)
    }
}
