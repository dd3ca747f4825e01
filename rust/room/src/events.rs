use felt_engine::logger::Street;
use felt_engine::player::PlayerAction;
use felt_engine::snapshot::TableSnapshot;
use felt_engine::table::Payout;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::mpsc;

pub type RoomId = String;

// Bounded so a stalled subscriber cannot grow memory; it is dropped instead.
const EVENT_CHANNEL_BUFFER: usize = 1000;

pub type EventSender = mpsc::Sender<RoomEvent>;
pub type EventReceiver = mpsc::Receiver<RoomEvent>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    HandStarted {
        hand_number: u64,
        dealer: Option<usize>,
        seats: Vec<String>,
    },
    /// Viewer-specific table picture sent after every mutation
    State(TableSnapshot),
    ActionTaken {
        seat: usize,
        seat_id: String,
        street: Street,
        action: PlayerAction,
        automated: bool,
    },
    HandFinished {
        hand_number: u64,
        winners: Vec<Payout>,
        description: String,
        pot: u32,
    },
    RoomClosed {
        reason: String,
    },
}

impl RoomEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            RoomEvent::HandStarted { .. } => "hand_started",
            RoomEvent::State(_) => "state",
            RoomEvent::ActionTaken { .. } => "action_taken",
            RoomEvent::HandFinished { .. } => "hand_finished",
            RoomEvent::RoomClosed { .. } => "room_closed",
        }
    }
}

/// Receiving end for one viewer of one room. Dropping it unsubscribes.
pub struct EventSubscription {
    bus: EventBus,
    room_id: RoomId,
    subscriber_id: usize,
    pub receiver: EventReceiver,
}

impl EventSubscription {
    pub fn receiver(&mut self) -> &mut EventReceiver {
        &mut self.receiver
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.bus.unsubscribe(&self.room_id, self.subscriber_id);
    }
}

#[derive(Debug)]
struct Subscriber {
    id: usize,
    /// Seat id whose hole cards this subscriber may see; `None` for spectators
    viewer: Option<String>,
    sender: EventSender,
}

#[derive(Debug, Clone, Default)]
pub struct EventBus {
    inner: Arc<EventBusInner>,
}

#[derive(Debug, Default)]
struct EventBusInner {
    subscribers: RwLock<HashMap<RoomId, Vec<Subscriber>>>,
    next_id: AtomicUsize,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, room_id: RoomId, viewer: Option<String>) -> EventSubscription {
        let (subscriber_id, receiver) = self.subscribe_raw(room_id.clone(), viewer);
        EventSubscription {
            bus: self.clone(),
            room_id,
            subscriber_id,
            receiver,
        }
    }

    fn subscribe_raw(&self, room_id: RoomId, viewer: Option<String>) -> (usize, EventReceiver) {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        let id = self.inner.next_id.fetch_add(1, Ordering::AcqRel);

        tracing::info!(
            room_id = %room_id,
            subscriber_id = id,
            viewer = viewer.as_deref().unwrap_or("spectator"),
            "client subscribed to room events"
        );

        self.write().entry(room_id).or_default().push(Subscriber {
            id,
            viewer,
            sender: tx,
        });
        (id, rx)
    }

    /// Sends the same event to every subscriber of the room.
    pub fn broadcast(&self, room_id: &RoomId, event: RoomEvent) {
        self.broadcast_with(room_id, |_| event.clone());
    }

    /// Builds one event per subscriber from its viewer identity.
    pub fn broadcast_with<F>(&self, room_id: &RoomId, build: F)
    where
        F: Fn(Option<&str>) -> RoomEvent,
    {
        let mut failed = Vec::new();
        {
            let guard = self.read();
            let Some(list) = guard.get(room_id) else {
                tracing::trace!(room_id = %room_id, "no subscribers for room");
                return;
            };
            for sub in list {
                let event = build(sub.viewer.as_deref());
                tracing::trace!(
                    room_id = %room_id,
                    subscriber_id = sub.id,
                    event = event.kind(),
                    "sending event"
                );
                // try_send so one slow client never blocks the room
                if let Err(e) = sub.sender.try_send(event) {
                    tracing::warn!(
                        room_id = %room_id,
                        subscriber_id = sub.id,
                        error = %e,
                        "failed to send event to subscriber"
                    );
                    failed.push(sub.id);
                }
            }
        }
        if !failed.is_empty() {
            self.remove_subscribers(room_id, &failed);
        }
    }

    pub fn unsubscribe(&self, room_id: &RoomId, subscriber_id: usize) {
        self.remove_subscribers(room_id, &[subscriber_id]);
    }

    pub fn drop_room(&self, room_id: &RoomId) {
        self.write().remove(room_id);
    }

    pub fn subscriber_count(&self) -> usize {
        self.read().values().map(Vec::len).sum()
    }

    pub fn room_subscriber_count(&self, room_id: &RoomId) -> usize {
        self.read().get(room_id).map_or(0, Vec::len)
    }

    fn remove_subscribers(&self, room_id: &RoomId, ids: &[usize]) {
        let mut guard = self.write();
        if let Some(list) = guard.get_mut(room_id) {
            list.retain(|sub| !ids.contains(&sub.id));
            if list.is_empty() {
                guard.remove(room_id);
            }
        }
    }

    // A panic while holding the lock leaves the map itself intact.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<RoomId, Vec<Subscriber>>> {
        self.inner
            .subscribers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<RoomId, Vec<Subscriber>>> {
        self.inner
            .subscribers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
