/// Room lifecycle: dealing, human and automated turns, settlement, closing.
/// Timers run on paused tokio time, so think delays cost nothing.
use felt_engine::errors::GameError;
use felt_engine::player::{PlayerAction, SeatConfig};
use felt_engine::snapshot::CardView;
use felt_engine::table::Phase;
use felt_room::{EventSubscription, RoomError, RoomEvent, RoomManager, RoomSettings};
use std::time::Duration;
use tokio::time::{timeout, Instant};

fn settings() -> RoomSettings {
    RoomSettings {
        seed: Some(11),
        ..RoomSettings::default()
    }
}

fn heads_up_humans() -> Vec<SeatConfig> {
    vec![
        SeatConfig::human("alice", "Alice", 1000),
        SeatConfig::human("bob", "Bob", 1000),
    ]
}

/// Receives until `pred` matches; panics after ten virtual minutes.
async fn next_matching<F>(sub: &mut EventSubscription, pred: F) -> RoomEvent
where
    F: Fn(&RoomEvent) -> bool,
{
    timeout(Duration::from_secs(600), async {
        loop {
            let event = sub.receiver().recv().await.expect("bus open");
            if pred(&event) {
                return event;
            }
        }
    })
    .await
    .expect("event within timeout")
}

fn drain(sub: &mut EventSubscription) -> Vec<RoomEvent> {
    let mut events = Vec::new();
    while let Ok(event) = sub.receiver().try_recv() {
        events.push(event);
    }
    events
}

#[tokio::test(start_paused = true)]
async fn start_hand_broadcasts_hand_started_and_state() {
    let manager = RoomManager::new(settings()).expect("manager");
    let room = manager.open_room(heads_up_humans()).expect("open");
    let mut sub = manager.subscribe(&room, None).expect("subscribe");

    let snap = manager.start_hand(&room).expect("start");
    assert_eq!(snap.phase, Phase::Preflop);
    assert_eq!(snap.pot, 15);

    let events = drain(&mut sub);
    assert!(matches!(
        events.first(),
        Some(RoomEvent::HandStarted { hand_number: 1, .. })
    ));
    assert!(matches!(events.get(1), Some(RoomEvent::State(s)) if s.pot == 15));
}

#[tokio::test(start_paused = true)]
async fn hole_cards_follow_the_viewer() {
    let manager = RoomManager::new(settings()).expect("manager");
    let room = manager.open_room(heads_up_humans()).expect("open");
    let mut alice = manager
        .subscribe(&room, Some("alice".into()))
        .expect("subscribe");
    let mut spectator = manager.subscribe(&room, None).expect("subscribe");
    manager.start_hand(&room).expect("start");

    let RoomEvent::State(seen_by_alice) =
        next_matching(&mut alice, |e| matches!(e, RoomEvent::State(_))).await
    else {
        unreachable!()
    };
    let own = seen_by_alice.seat("alice").expect("alice seat");
    let other = seen_by_alice.seat("bob").expect("bob seat");
    assert!(own.hole.iter().all(|c| matches!(c, CardView::Shown(_))));
    assert!(other.hole.iter().all(|c| *c == CardView::Hidden));

    let RoomEvent::State(seen_by_spectator) =
        next_matching(&mut spectator, |e| matches!(e, RoomEvent::State(_))).await
    else {
        unreachable!()
    };
    assert!(seen_by_spectator
        .seats
        .iter()
        .flat_map(|s| &s.hole)
        .all(|c| *c == CardView::Hidden));
}

#[tokio::test(start_paused = true)]
async fn fold_out_settles_the_roster() {
    let manager = RoomManager::new(settings()).expect("manager");
    let room = manager.open_room(heads_up_humans()).expect("open");
    let mut sub = manager.subscribe(&room, None).expect("subscribe");
    manager.start_hand(&room).expect("start");

    // heads-up the dealer posts the small blind and acts first
    manager
        .submit_action(&room, "alice", PlayerAction::Fold)
        .expect("fold");

    let finished = next_matching(&mut sub, |e| matches!(e, RoomEvent::HandFinished { .. })).await;
    let RoomEvent::HandFinished {
        winners,
        description,
        pot,
        ..
    } = finished
    else {
        unreachable!()
    };
    assert_eq!(pot, 15);
    assert_eq!(description, "Uncontested");
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].seat_id, "bob");
    assert_eq!(winners[0].amount, 15);

    let roster = manager.room(&room).expect("room").roster().expect("roster");
    assert_eq!(roster[0].chips, 995);
    assert_eq!(roster[1].chips, 1005);

    // the next hand deals from the written-back stacks
    let snap = manager.start_hand(&room).expect("second hand");
    assert_eq!(snap.hand_number, 2);
    assert_eq!(snap.pot, 15);
    assert_eq!(
        snap.seats.iter().map(|s| s.stack + s.bet).sum::<u32>(),
        2000
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_actions_leave_the_room_unchanged() {
    let manager = RoomManager::new(settings()).expect("manager");
    let room = manager.open_room(heads_up_humans()).expect("open");

    let err = manager
        .submit_action(&room, "alice", PlayerAction::Call)
        .expect_err("no hand yet");
    assert!(matches!(err, RoomError::Game(GameError::NoHandInProgress)));

    manager.start_hand(&room).expect("start");
    let before = manager.snapshot(&room, None).expect("snapshot");

    let err = manager
        .submit_action(&room, "bob", PlayerAction::Call)
        .expect_err("not bob's turn");
    assert_eq!(err.error_code(), "not_your_turn");

    let err = manager
        .submit_action(&room, "mallory", PlayerAction::Fold)
        .expect_err("unknown seat");
    assert!(matches!(err, RoomError::SeatNotFound { .. }));

    let err = manager
        .submit_action(&room, "alice", PlayerAction::Check)
        .expect_err("owes the small blind difference");
    assert_eq!(err.error_code(), "illegal_action");

    let err = manager.start_hand(&room).expect_err("hand in progress");
    assert!(matches!(err, RoomError::Game(GameError::IllegalAction { .. })));

    assert_eq!(manager.snapshot(&room, None).expect("snapshot"), before);
}

#[tokio::test(start_paused = true)]
async fn automated_seat_acts_after_think_time() {
    let manager = RoomManager::new(settings()).expect("manager");
    let room = manager
        .open_room(vec![
            SeatConfig::human("alice", "Alice", 1000),
            SeatConfig::bot("bot", "Bot", 1000),
        ])
        .expect("open");
    let mut sub = manager.subscribe(&room, None).expect("subscribe");
    manager.start_hand(&room).expect("start");

    let err = manager
        .submit_action(&room, "bot", PlayerAction::Fold)
        .expect_err("automated seats are not driven by clients");
    assert_eq!(err.error_code(), "illegal_action");

    manager
        .submit_action(&room, "alice", PlayerAction::Call)
        .expect("call");
    let acted_at = Instant::now();
    assert_eq!(manager.snapshot(&room, None).expect("snapshot").turn, Some(1));

    tokio::time::sleep(Duration::from_millis(799)).await;
    assert_eq!(manager.snapshot(&room, None).expect("snapshot").turn, Some(1));

    let event = next_matching(&mut sub, |e| {
        matches!(e, RoomEvent::ActionTaken { automated: true, .. })
    })
    .await;
    assert!(acted_at.elapsed() >= Duration::from_millis(800));
    let RoomEvent::ActionTaken { seat_id, action, .. } = event else {
        unreachable!()
    };
    assert_eq!(seat_id, "bot");
    // the big blind closes preflop by checking or raising, never by folding
    assert!(matches!(action, PlayerAction::Check | PlayerAction::Raise(_)));
}

#[tokio::test(start_paused = true)]
async fn closing_cancels_the_pending_automated_turn() {
    let manager = RoomManager::new(settings()).expect("manager");
    let room = manager
        .open_room(vec![
            SeatConfig::human("alice", "Alice", 1000),
            SeatConfig::bot("bot", "Bot", 1000),
        ])
        .expect("open");
    let mut sub = manager.subscribe(&room, None).expect("subscribe");
    manager.start_hand(&room).expect("start");
    manager
        .submit_action(&room, "alice", PlayerAction::Call)
        .expect("call");

    manager.close_room(&room).expect("close");
    tokio::time::sleep(Duration::from_secs(5)).await;

    let events = drain(&mut sub);
    assert!(matches!(events.last(), Some(RoomEvent::RoomClosed { .. })));
    assert!(!events
        .iter()
        .any(|e| matches!(e, RoomEvent::ActionTaken { automated: true, .. })));
    assert!(matches!(
        manager.snapshot(&room, None),
        Err(RoomError::NotFound(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn aggression_tracks_humans_and_resets_each_hand() {
    let manager = RoomManager::new(settings()).expect("manager");
    let room = manager.open_room(heads_up_humans()).expect("open");
    let handle = manager.room(&room).expect("room");
    manager.start_hand(&room).expect("start");

    manager
        .submit_action(&room, "alice", PlayerAction::Raise(40))
        .expect("raise");
    assert!((handle.aggression().expect("estimate") - 0.4).abs() < 1e-9);

    manager
        .submit_action(&room, "bob", PlayerAction::Fold)
        .expect("fold");
    assert!((handle.aggression().expect("estimate") - 0.35).abs() < 1e-9);

    manager.start_hand(&room).expect("next hand");
    assert!((handle.aggression().expect("estimate") - 0.3).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn bots_play_on_with_auto_deal() {
    let manager = RoomManager::new(RoomSettings {
        auto_deal: true,
        starting_chips: 500,
        ..settings()
    })
    .expect("manager");
    let roster = (0..3)
        .map(|i| SeatConfig::bot(format!("bot-{i}"), format!("Bot {i}"), 500))
        .collect();
    let room = manager.open_room(roster).expect("open");
    let handle = manager.room(&room).expect("room");
    let mut sub = manager.subscribe(&room, None).expect("subscribe");
    manager.start_hand(&room).expect("start");

    let mut finished = Vec::new();
    while finished.len() < 3 {
        let event = next_matching(&mut sub, |e| matches!(e, RoomEvent::HandFinished { .. })).await;
        let RoomEvent::HandFinished { hand_number, .. } = event else {
            unreachable!()
        };
        finished.push(hand_number);

        let roster = handle.roster().expect("roster");
        assert_eq!(roster.iter().map(|s| s.chips).sum::<u32>(), 1500);
        if roster.iter().filter(|s| s.chips > 0).count() < 2 {
            break;
        }
    }
    assert_eq!(finished[0], 1);
    assert!(finished.windows(2).all(|w| w[1] == w[0] + 1));
}
