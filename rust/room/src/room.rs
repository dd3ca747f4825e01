//! Rooms: a table, its roster and the timers that drive automated seats.
//!
//! Every mutation of a room runs under that room's mutex and ends by
//! broadcasting a fresh snapshot to each subscriber. Automated turns and
//! auto-deals are tokio tasks that sleep and then re-enter the room; each one
//! carries the hand number it was scheduled for and does nothing if the room
//! has moved on.

use crate::errors::RoomError;
use crate::events::{EventBus, EventSubscription, RoomEvent, RoomId};
use crate::settings::RoomSettings;
use felt_ai::{create_ai, AIOpponent, AggressionTracker};
use felt_engine::errors::GameError;
use felt_engine::logger::HandLogger;
use felt_engine::player::{PlayerAction, SeatConfig};
use felt_engine::snapshot::TableSnapshot;
use felt_engine::table::{AppliedAction, Table};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::time::Duration;
use tokio::task::AbortHandle;
use uuid::Uuid;

/// Work a room schedules for later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Job {
    /// Let the automated seat at this table index act in this hand
    AiTurn { hand: u64, seat: usize },
    /// Deal the hand after this one
    Deal { after: u64 },
}

/// Owns every open room and the shared event bus.
pub struct RoomManager {
    rooms: RwLock<HashMap<RoomId, Arc<RoomHandle>>>,
    event_bus: EventBus,
    settings: RoomSettings,
    history: Option<Arc<Mutex<HandLogger>>>,
}

impl std::fmt::Debug for RoomManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoomManager")
            .field("settings", &self.settings)
            .field("rooms", &self.room_ids().len())
            .finish()
    }
}

impl RoomManager {
    /// Validates `settings` and opens the history file when one is configured.
    pub fn new(settings: RoomSettings) -> Result<Self, RoomError> {
        Self::with_event_bus(settings, EventBus::new())
    }

    pub fn with_event_bus(settings: RoomSettings, event_bus: EventBus) -> Result<Self, RoomError> {
        settings.validate()?;
        let history = match &settings.history_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "appending hand history");
                Some(Arc::new(Mutex::new(HandLogger::create(path)?)))
            }
            None => None,
        };
        Ok(Self {
            rooms: RwLock::new(HashMap::new()),
            event_bus,
            settings,
            history,
        })
    }

    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Seats a roster in a new room. No hand is dealt until [`RoomManager::start_hand`].
    pub fn open_room(&self, roster: Vec<SeatConfig>) -> Result<RoomId, RoomError> {
        let id = Uuid::new_v4().to_string();
        if roster.len() > self.settings.max_seats {
            return Err(RoomError::RoomFull {
                room_id: id,
                max_seats: self.settings.max_seats,
            });
        }
        let mut seen = HashSet::new();
        if let Some(dup) = roster.iter().find(|s| !seen.insert(s.id.as_str())) {
            return Err(RoomError::Game(GameError::illegal(format!(
                "seat id {} appears twice",
                dup.id
            ))));
        }

        let handle = Arc::new(RoomHandle::new(
            id.clone(),
            roster,
            self.settings.clone(),
            self.event_bus.clone(),
            self.history.clone(),
        ));
        self.rooms
            .write()
            .map_err(|_| RoomError::StoragePoisoned)?
            .insert(id.clone(), handle);

        tracing::info!(room_id = %id, "room opened");
        Ok(id)
    }

    pub fn room(&self, room_id: &RoomId) -> Result<Arc<RoomHandle>, RoomError> {
        self.rooms
            .read()
            .map_err(|_| RoomError::StoragePoisoned)?
            .get(room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))
    }

    pub fn room_ids(&self) -> Vec<RoomId> {
        match self.rooms.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn start_hand(&self, room_id: &RoomId) -> Result<TableSnapshot, RoomError> {
        self.room(room_id)?.start_hand()
    }

    pub fn submit_action(
        &self,
        room_id: &RoomId,
        seat_id: &str,
        action: PlayerAction,
    ) -> Result<AppliedAction, RoomError> {
        self.room(room_id)?.submit_action(seat_id, action)
    }

    pub fn snapshot(
        &self,
        room_id: &RoomId,
        viewer: Option<&str>,
    ) -> Result<TableSnapshot, RoomError> {
        self.room(room_id)?.snapshot(viewer)
    }

    pub fn subscribe(
        &self,
        room_id: &RoomId,
        viewer: Option<String>,
    ) -> Result<EventSubscription, RoomError> {
        self.room(room_id)?;
        Ok(self.event_bus.subscribe(room_id.clone(), viewer))
    }

    /// Cancels pending timers, tells subscribers and forgets the room.
    pub fn close_room(&self, room_id: &RoomId) -> Result<(), RoomError> {
        let removed = self
            .rooms
            .write()
            .map_err(|_| RoomError::StoragePoisoned)?
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        removed.close()?;
        self.event_bus.broadcast(
            room_id,
            RoomEvent::RoomClosed {
                reason: "closed_by_request".into(),
            },
        );
        self.event_bus.drop_room(room_id);
        tracing::info!(room_id = %room_id, "room closed");
        Ok(())
    }
}

/// One room. All state sits behind a single mutex that is never held
/// across an await.
pub struct RoomHandle {
    id: RoomId,
    settings: RoomSettings,
    bus: EventBus,
    history: Option<Arc<Mutex<HandLogger>>>,
    state: Mutex<RoomState>,
}

struct RoomState {
    table: Table,
    roster: Vec<SeatConfig>,
    /// Styled opponents by roster position
    opponents: Vec<Box<dyn AIOpponent>>,
    tracker: AggressionTracker,
    rng: ChaCha20Rng,
    pending: Option<(Job, AbortHandle)>,
    /// Last hand whose result was written back to the roster
    settled: u64,
    closed: bool,
}

impl RoomHandle {
    fn new(
        id: RoomId,
        roster: Vec<SeatConfig>,
        settings: RoomSettings,
        bus: EventBus,
        history: Option<Arc<Mutex<HandLogger>>>,
    ) -> Self {
        let table = Table::new(settings.table_config(None));
        let rng = match settings.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed.wrapping_add(1)),
            None => ChaCha20Rng::seed_from_u64(rand::random()),
        };
        let opponents = (0..roster.len()).map(create_ai).collect();
        Self {
            id,
            settings,
            bus,
            history,
            state: Mutex::new(RoomState {
                table,
                roster,
                opponents,
                tracker: AggressionTracker::new(),
                rng,
                pending: None,
                settled: 0,
                closed: false,
            }),
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    fn lock(&self) -> Result<MutexGuard<'_, RoomState>, RoomError> {
        self.state.lock().map_err(|_| RoomError::StoragePoisoned)
    }

    pub fn roster(&self) -> Result<Vec<SeatConfig>, RoomError> {
        Ok(self.lock()?.roster.clone())
    }

    /// Current opponent-aggression estimate fed by the human seats.
    pub fn aggression(&self) -> Result<f64, RoomError> {
        Ok(self.lock()?.tracker.estimate())
    }

    pub fn snapshot(&self, viewer: Option<&str>) -> Result<TableSnapshot, RoomError> {
        Ok(self.lock()?.table.snapshot_for(viewer))
    }

    pub fn start_hand(self: &Arc<Self>) -> Result<TableSnapshot, RoomError> {
        let mut state = self.lock()?;
        self.deal(&mut state)?;
        Ok(state.table.snapshot_for(None))
    }

    /// Applies a human seat's action.
    pub fn submit_action(
        self: &Arc<Self>,
        seat_id: &str,
        action: PlayerAction,
    ) -> Result<AppliedAction, RoomError> {
        let mut state = self.lock()?;
        if !state.table.phase().is_betting() {
            return Err(RoomError::Game(GameError::NoHandInProgress));
        }
        let seat = state
            .table
            .seat_index_of(seat_id)
            .ok_or_else(|| RoomError::SeatNotFound {
                room_id: self.id.clone(),
                seat_id: seat_id.to_string(),
            })?;
        if state.table.seat(seat).is_some_and(|s| s.is_automated()) {
            return Err(RoomError::Game(GameError::illegal(
                "seat is played automatically",
            )));
        }

        let applied = state.table.apply_action(seat, action)?;
        state.tracker.record(&applied.effective);
        tracing::debug!(
            room_id = %self.id,
            seat_id,
            action = ?applied.effective,
            aggression = state.tracker.estimate(),
            "human action applied"
        );
        self.announce_action(&applied, seat_id, false);
        self.after_mutation(&mut state);
        Ok(applied)
    }

    fn close(&self) -> Result<(), RoomError> {
        let mut state = self.lock()?;
        state.closed = true;
        if let Some((_, task)) = state.pending.take() {
            task.abort();
        }
        Ok(())
    }

    fn deal(self: &Arc<Self>, state: &mut RoomState) -> Result<(), RoomError> {
        if state.closed {
            return Err(RoomError::NotFound(self.id.clone()));
        }
        state.table.start_hand(&state.roster)?;
        if let Some((_, task)) = state.pending.take() {
            task.abort();
        }
        state.tracker.reset();

        let seats = state
            .table
            .seats()
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        self.bus.broadcast(
            &self.id,
            RoomEvent::HandStarted {
                hand_number: state.table.hand_number(),
                dealer: state.table.dealer(),
                seats,
            },
        );
        self.after_mutation(state);
        Ok(())
    }

    fn announce_action(&self, applied: &AppliedAction, seat_id: &str, automated: bool) {
        if applied.was_clamped() {
            tracing::debug!(
                room_id = %self.id,
                requested = ?applied.requested,
                effective = ?applied.effective,
                "action adjusted to a legal amount"
            );
        }
        self.bus.broadcast(
            &self.id,
            RoomEvent::ActionTaken {
                seat: applied.seat,
                seat_id: seat_id.to_string(),
                street: applied.street,
                action: applied.effective,
                automated,
            },
        );
    }

    /// Broadcast, then settle a finished hand or hand the turn to a bot.
    fn after_mutation(self: &Arc<Self>, state: &mut RoomState) {
        let table = &state.table;
        self.bus
            .broadcast_with(&self.id, |viewer| RoomEvent::State(table.snapshot_for(viewer)));

        if state.table.phase().is_over() {
            if state.settled != state.table.hand_number() {
                self.settle(state);
            }
            return;
        }

        if let Some(seat) = state.table.turn() {
            if state.table.seat(seat).is_some_and(|s| s.is_automated()) {
                let delay = Duration::from_millis(self.settings.ai_think_time_ms);
                let hand = state.table.hand_number();
                self.schedule(state, Job::AiTurn { hand, seat }, delay);
            }
        }
    }

    fn settle(self: &Arc<Self>, state: &mut RoomState) {
        let hand_number = state.table.hand_number();
        state.settled = hand_number;

        for (id, stack) in state.table.final_stacks() {
            if let Some(entry) = state.roster.iter_mut().find(|s| s.id == id) {
                entry.chips = stack;
            }
        }

        if let Some(result) = state.table.result() {
            tracing::info!(
                room_id = %self.id,
                hand = hand_number,
                pot = result.pot,
                description = %result.description,
                "hand finished"
            );
            self.bus.broadcast(
                &self.id,
                RoomEvent::HandFinished {
                    hand_number,
                    winners: result.winners.clone(),
                    description: result.description.clone(),
                    pot: result.pot,
                },
            );
        }

        if let Some(history) = &self.history {
            match history.lock() {
                Ok(mut logger) => {
                    let hand_id = logger.next_id();
                    if let Err(e) = logger.write(&state.table.hand_record(hand_id)) {
                        let err = RoomError::History(e);
                        tracing::error!(room_id = %self.id, error = %err, "history write failed");
                    }
                }
                Err(_) => {
                    tracing::error!(room_id = %self.id, "history logger poisoned");
                }
            }
        }

        let funded = state.roster.iter().filter(|s| s.chips > 0).count();
        if self.settings.auto_deal && funded >= 2 {
            let delay = Duration::from_millis(self.settings.hand_pause_ms);
            self.schedule(state, Job::Deal { after: hand_number }, delay);
        } else if funded < 2 {
            tracing::info!(room_id = %self.id, "fewer than two seats hold chips");
        }
    }

    fn schedule(self: &Arc<Self>, state: &mut RoomState, job: Job, delay: Duration) {
        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(rt) => rt,
            Err(_) => {
                tracing::warn!(room_id = %self.id, ?job, "no runtime, job not scheduled");
                return;
            }
        };
        if let Some((_, previous)) = state.pending.take() {
            previous.abort();
        }
        let room = Arc::clone(self);
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            room.run(job);
        });
        tracing::trace!(room_id = %self.id, ?job, delay_ms = delay.as_millis() as u64, "scheduled");
        state.pending = Some((job, task.abort_handle()));
    }

    fn run(self: &Arc<Self>, job: Job) {
        let mut state = match self.lock() {
            Ok(state) => state,
            Err(err) => {
                tracing::error!(room_id = %self.id, error = %err, "room unusable");
                return;
            }
        };
        if state.pending.as_ref().is_some_and(|(j, _)| *j == job) {
            state.pending = None;
        }
        if state.closed {
            return;
        }

        match job {
            Job::AiTurn { hand, seat } => {
                let table = &state.table;
                if table.hand_number() != hand || table.turn() != Some(seat) {
                    tracing::debug!(room_id = %self.id, ?job, "stale automated turn skipped");
                    return;
                }
                self.play_automated(&mut state, seat);
            }
            Job::Deal { after } => {
                if state.table.hand_number() != after {
                    return;
                }
                if let Err(err) = self.deal(&mut state) {
                    tracing::warn!(room_id = %self.id, error = %err, "auto-deal failed");
                }
            }
        }
    }

    fn play_automated(self: &Arc<Self>, state: &mut RoomState, seat: usize) {
        let Some(seat_id) = state.table.seat(seat).map(|s| s.id().to_string()) else {
            return;
        };
        let position = state
            .roster
            .iter()
            .position(|s| s.id == seat_id)
            .unwrap_or(seat);
        let aggression = state.tracker.estimate();
        let RoomState {
            table,
            opponents,
            rng,
            ..
        } = &mut *state;
        let Some(ai) = opponents.get(position) else {
            return;
        };
        let Some(action) = ai.act(table, seat, aggression, rng) else {
            return;
        };

        let applied = match table.apply_action(seat, action) {
            Ok(applied) => applied,
            Err(err) => {
                tracing::warn!(
                    room_id = %self.id,
                    seat_id = %seat_id,
                    ?action,
                    error = %err,
                    "automated action rejected, folding"
                );
                match table.apply_action(seat, PlayerAction::Fold) {
                    Ok(applied) => applied,
                    Err(err) => {
                        tracing::error!(room_id = %self.id, error = %err, "fold rejected");
                        return;
                    }
                }
            }
        };
        tracing::debug!(
            room_id = %self.id,
            seat_id = %seat_id,
            style = ai.name(),
            action = ?applied.effective,
            "automated action applied"
        );
        self.announce_action(&applied, &seat_id, true);
        self.after_mutation(state);
    }
}
