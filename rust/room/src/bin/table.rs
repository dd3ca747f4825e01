//! Self-playing demo table: seats automated players and deals until one
//! seat holds every chip or the hand limit is reached.
//!
//! Usage: cargo run -p felt_room --bin felt-table -- --seats 4 --hands 50

use clap::Parser;
use felt_ai::create_ai;
use felt_engine::player::SeatConfig;
use felt_room::{RoomEvent, RoomManager};

#[derive(Debug, Parser)]
#[command(name = "felt-table", about = "Watch styled bots play a table")]
struct Args {
    /// Number of automated seats
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=10))]
    seats: u8,
    /// Stop after this many hands
    #[arg(long, default_value_t = 20)]
    hands: u32,
    /// Starting chips per seat (overrides configuration)
    #[arg(long)]
    chips: Option<u32>,
    /// Delay before each automated action, in milliseconds
    #[arg(long)]
    think_ms: Option<u64>,
    /// Pause between hands, in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,
    #[arg(long)]
    seed: Option<u64>,
    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.json_logs {
        felt_room::init_json_logging()?;
    } else {
        felt_room::init_logging()?;
    }

    let resolved = felt_room::settings::load_with_sources()?;
    tracing::debug!(sources = ?resolved.sources, "settings resolved");
    let mut settings = resolved.settings;
    settings.auto_deal = true;
    settings.max_seats = settings.max_seats.max(usize::from(args.seats));
    if let Some(chips) = args.chips {
        settings.starting_chips = chips;
    }
    if let Some(ms) = args.think_ms {
        settings.ai_think_time_ms = ms;
    }
    if let Some(ms) = args.pause_ms {
        settings.hand_pause_ms = ms;
    }
    if args.seed.is_some() {
        settings.seed = args.seed;
    }

    let chips = settings.starting_chips;
    let manager = RoomManager::new(settings)?;
    let roster = (0..usize::from(args.seats))
        .map(|i| {
            let style = create_ai(i);
            SeatConfig::bot(format!("bot-{}", i + 1), format!("{} {}", style.name(), i + 1), chips)
        })
        .collect();
    let room_id = manager.open_room(roster)?;
    let mut events = manager.subscribe(&room_id, None)?;
    manager.start_hand(&room_id)?;

    tracing::info!(room_id = %room_id, seats = args.seats, hands = args.hands, "table running");

    let mut played = 0u32;
    loop {
        tokio::select! {
            event = events.receiver().recv() => {
                let Some(event) = event else { break };
                match event {
                    RoomEvent::ActionTaken { seat_id, street, action, .. } => {
                        tracing::debug!(%seat_id, ?street, ?action, "action");
                    }
                    RoomEvent::HandFinished { hand_number, winners, description, pot } => {
                        played += 1;
                        let names: Vec<String> = winners
                            .iter()
                            .map(|w| format!("{} +{}", w.name, w.amount))
                            .collect();
                        println!("hand {hand_number}: {} ({description}, pot {pot})", names.join(", "));

                        let funded = manager
                            .room(&room_id)?
                            .roster()?
                            .iter()
                            .filter(|s| s.chips > 0)
                            .count();
                        if played >= args.hands || funded < 2 {
                            break;
                        }
                    }
                    RoomEvent::RoomClosed { .. } => break,
                    RoomEvent::HandStarted { .. } | RoomEvent::State(_) => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
        }
    }

    let roster = manager.room(&room_id)?.roster()?;
    manager.close_room(&room_id)?;

    println!("\nafter {played} hands:");
    for seat in roster {
        println!("  {:<12} {:>8}", seat.name, seat.chips);
    }
    Ok(())
}
