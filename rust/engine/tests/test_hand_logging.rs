use std::fs;

use felt_engine::cards::{Card, Rank as R, Suit as S};
use felt_engine::logger::{format_hand_id, ActionRecord, HandLogger, HandRecord, Street};
use felt_engine::player::{PlayerAction, SeatConfig};
use felt_engine::table::{Table, TableConfig};

fn record(hand_id: &str) -> HandRecord {
    HandRecord {
        hand_id: hand_id.to_string(),
        seed: Some(1),
        actions: vec![ActionRecord {
            seat: 0,
            seat_id: "p0".to_string(),
            street: Street::Preflop,
            action: PlayerAction::Check,
            chips: 0,
        }],
        board: vec![Card {
            suit: S::Clubs,
            rank: R::Ace,
        }],
        result: Some("p0".to_string()),
        ts: None,
        showdown: None,
    }
}

#[test]
fn writes_jsonl_with_lf_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands.jsonl");
    let mut logger = HandLogger::create(&path).expect("create logger");
    logger.write(&record("20250102-000001")).expect("write");
    logger.write(&record("20250102-000002")).expect("write");
    let bytes = fs::read(&path).expect("read file");
    assert!(bytes.ends_with(b"\n"));
    assert!(!bytes.contains(&b'\r'));
    assert_eq!(bytes.iter().filter(|&&b| b == b'\n').count(), 2);
}

#[test]
fn creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("hands.jsonl");
    let mut logger = HandLogger::create(&path).expect("create logger");
    logger.write(&record("20250102-000001")).expect("write");
    assert!(path.exists());
}

#[test]
fn sequential_ids_increment() {
    let mut logger = HandLogger::detached("20251231");
    assert_eq!(logger.next_id(), "20251231-000001");
    assert_eq!(logger.next_id(), "20251231-000002");
    assert_eq!(format_hand_id("20250101", 42), "20250101-000042");
}

#[test]
fn ts_is_generated_when_missing_and_preserved_when_present() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hands_ts.jsonl");
    let mut logger = HandLogger::create(&path).expect("create logger");
    let rec = record("20250102-000010");
    logger.write(&rec).expect("write");
    let line = fs::read_to_string(&path).unwrap();
    assert!(line.contains("\"ts\":\""), "ts should be injected");

    let preset = "2030-01-01T00:00:00Z".to_string();
    let rec2 = HandRecord {
        ts: Some(preset.clone()),
        ..rec
    };
    logger.write(&rec2).expect("write2");
    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains(&preset), "preset ts must be kept");
}

#[test]
fn table_hand_record_captures_actions_and_showdown() {
    let mut t = Table::new(TableConfig {
        seed: Some(5),
        ..TableConfig::default()
    });
    t.start_hand(&[
        SeatConfig::human("alice", "Alice", 1000),
        SeatConfig::bot("bot-1", "Bot 1", 1000),
    ])
    .unwrap();
    while let Some(seat) = t.turn() {
        let action = if t.to_call(seat) > 0 {
            PlayerAction::Call
        } else {
            PlayerAction::Check
        };
        t.apply_action(seat, action).unwrap();
    }

    let rec = t.hand_record("20250102-000003");
    assert_eq!(rec.seed, t.hand_seed());
    assert_eq!(rec.board.len(), 5);
    assert_eq!(rec.actions[0].seat_id, "alice");
    assert_eq!(rec.actions[0].action, PlayerAction::Call);
    assert_eq!(rec.actions[0].chips, 5);
    assert!(rec.actions.iter().any(|a| a.street == Street::River));
    let showdown = rec.showdown.as_ref().expect("went to showdown");
    assert_eq!(showdown.hands.len(), 2);
    assert!(!showdown.winners.is_empty());
    assert!(rec.result.is_some());

    let json = serde_json::to_string(&rec).unwrap();
    let back: HandRecord = serde_json::from_str(&json).unwrap();
    assert_eq!(back, rec);
}
